//! File-backed key-value store.
//!
//! Each key is stored in its own file under a base directory. Keys are
//! escaped into file names (`@GoMarketplace:cart` becomes
//! `%40GoMarketplace%3Acart.json`), so any key maps to exactly one file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use super::{KeyValueStore, StorageError, StorageFuture};

const FILE_EXTENSION: &str = "json";

/// [`KeyValueStore`] that keeps one file per key in a directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so readers see either the old blob or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Base directory of this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{FILE_EXTENSION}", escape_key(key)))
    }

    #[instrument(skip(self))]
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::NotUtf8(key.to_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored value");
                Ok(None)
            }
            Err(source) => Err(io_error(key, source)),
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let path = self.path_for(key);
        let tmp = path.with_extension(format!("{FILE_EXTENSION}.tmp"));

        let written = match tokio::fs::write(&tmp, value.as_bytes()).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(source) = written {
            // Don't leave a half-written blob next to the real one.
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(key, source));
        }

        debug!(path = %path.display(), "Stored value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(io_error(key, source)),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
        Box::pin(self.read(key))
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
        Box::pin(self.write(key, value))
    }

    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(self.delete(key))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_owned(),
        source,
    }
}

/// Escape a key into a portable file name.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes
/// `%XX`. `%` itself is escaped, so the mapping is injective.
fn escape_key(key: &str) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> FileStore {
        FileStore::new(std::env::temp_dir().join(format!("gm-cart-{}", uuid::Uuid::new_v4())))
    }

    #[test]
    fn test_escape_key() {
        assert_eq!(escape_key("@GoMarketplace:cart"), "%40GoMarketplace%3Acart");
        assert_eq!(escape_key("plain_key-1"), "plain_key-1");
        assert_eq!(escape_key("../etc"), "%2E%2E%2Fetc");
    }

    #[test]
    fn test_escape_key_is_injective() {
        assert_ne!(escape_key("a:b"), escape_key("a_b"));
        assert_ne!(escape_key("%3A"), escape_key(":"));
    }

    #[test]
    fn test_path_for_stays_in_dir() {
        let store = FileStore::new("/tmp/base");
        let path = store.path_for("../../outside");
        assert_eq!(path.parent().unwrap(), Path::new("/tmp/base"));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = temp_store();
        assert_eq!(store.get("cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = temp_store();

        store.set("@GoMarketplace:cart", "[]".to_string()).await.unwrap();
        assert_eq!(
            store.get("@GoMarketplace:cart").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(store.path_for("@GoMarketplace:cart").exists());

        store.set("@GoMarketplace:cart", "[1]".to_string()).await.unwrap();
        assert_eq!(
            store.get("@GoMarketplace:cart").await.unwrap().as_deref(),
            Some("[1]")
        );

        store.remove("@GoMarketplace:cart").await.unwrap();
        assert_eq!(store.get("@GoMarketplace:cart").await.unwrap(), None);
        store.remove("@GoMarketplace:cart").await.unwrap();

        tokio::fs::remove_dir_all(store.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let store = temp_store();
        let path = store.path_for("k");
        // A non-empty directory where the blob should go makes the rename fail.
        tokio::fs::create_dir_all(path.join("occupied")).await.unwrap();

        let result = store.set("k", "[]".to_string()).await;

        assert!(matches!(result, Err(StorageError::Io { ref key, .. }) if key == "k"));
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.is_dir());

        tokio::fs::remove_dir_all(store.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let store = temp_store();
        tokio::fs::create_dir_all(store.dir()).await.unwrap();
        tokio::fs::write(store.path_for("k"), [0xff, 0xfe]).await.unwrap();

        assert!(matches!(
            store.get("k").await,
            Err(StorageError::NotUtf8(key)) if key == "k"
        ));

        tokio::fs::remove_dir_all(store.dir()).await.unwrap();
    }
}
