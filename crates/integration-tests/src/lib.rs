//! Integration tests for Go Marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_lifecycle` - Mutations persisted through the file store and
//!   restored by a fresh provider
//! - `provider_scope` - Access through `use_cart` and explicit handles
//! - `persistence_faults` - Storage failures and malformed persisted data

use std::path::{Path, PathBuf};

use go_marketplace_cart::storage::FileStore;
use go_marketplace_core::CartItem;

/// A cart blob as written by earlier clients.
pub const LEGACY_BLOB: &str =
    r#"[{"id":"x","title":"T","image_url":"u","price":5,"quantity":3}]"#;

/// Temporary directory removed on drop.
#[derive(Debug)]
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    /// Create a unique, not yet existing directory path under the system
    /// temp dir.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: std::env::temp_dir().join(format!("gm-cart-it-{}", uuid::Uuid::new_v4())),
        }
    }

    /// Path of the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A file store rooted at this directory.
    #[must_use]
    pub fn file_store(&self) -> FileStore {
        FileStore::new(self.path.clone())
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// A catalog product with the given ID.
#[must_use]
pub fn product(id: &str) -> CartItem {
    CartItem::new(id, format!("Product {id}"), format!("https://img.example/{id}.png"), 10)
}
