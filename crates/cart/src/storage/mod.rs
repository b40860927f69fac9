//! Key-value persistence service.
//!
//! The cart persists itself as one UTF-8 blob under one key, the same shape
//! as a mobile async-storage API: `get`, `set`, `remove`.
//!
//! # Backends
//!
//! - [`MemoryStore`] - In-process map, for tests and ephemeral sessions
//! - [`FileStore`] - One file per key under a directory

mod file;
mod memory;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors returned by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation on a key failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored bytes are not valid UTF-8.
    #[error("Value for key {0} is not valid UTF-8")]
    NotUtf8(String),

    /// The backend refused the operation (e.g., storage full or offline).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Boxed future returned by [`KeyValueStore`] operations.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Async key-value storage holding serialized blobs.
///
/// Object safe so the cart can hold any backend behind an `Arc<dyn _>`.
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` if nothing is stored.
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()>;

    /// Delete whatever is stored under `key`. Removing a missing key is not
    /// an error.
    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;
}
