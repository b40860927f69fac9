//! Provider scope for the cart.
//!
//! A [`CartProvider`] owns the one [`CartStore`] of the application. The rest
//! of the application reaches the cart through a [`CartHandle`], obtained in
//! one of two ways:
//!
//! - explicitly, from [`CartProvider::handle`], and passed down to whoever
//!   needs it;
//! - implicitly, by running code inside [`CartProvider::scope`] and calling
//!   [`use_cart`] from within.
//!
//! Calling [`use_cart`] outside a provider scope returns
//! [`CartError::OutsideProvider`] instead of an empty cart.
//!
//! ```rust,no_run
//! use go_marketplace_cart::{CartProvider, use_cart, storage::MemoryStore};
//!
//! # async fn demo() -> go_marketplace_cart::Result<()> {
//! let provider = CartProvider::restore(MemoryStore::new(), "cart").await?;
//!
//! provider
//!     .scope(async {
//!         let cart = use_cart()?;
//!         cart.increment(&"sku-1".into()).await
//!     })
//!     .await?;
//!
//! assert!(use_cart().is_err());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use go_marketplace_core::{CartItem, ProductId};

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::storage::{FileStore, KeyValueStore};
use crate::store::{CartStore, Snapshot};

tokio::task_local! {
    static CURRENT_CART: CartHandle;
}

/// Shared access to the application's cart.
///
/// Cheaply cloneable via `Arc`. Reads return snapshots; all changes go
/// through the three mutators.
#[derive(Clone, Debug)]
pub struct CartHandle {
    store: Arc<CartStore>,
}

impl CartHandle {
    /// Current cart contents.
    #[must_use]
    pub fn products(&self) -> Snapshot {
        self.store.products()
    }

    /// Receiver notified with a new snapshot after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.store.subscribe()
    }

    /// See [`CartStore::add_to_cart`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written to storage.
    pub async fn add_to_cart(&self, item: CartItem) -> Result<()> {
        self.store.add_to_cart(item).await
    }

    /// See [`CartStore::increment`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written to storage.
    pub async fn increment(&self, id: &ProductId) -> Result<()> {
        self.store.increment(id).await
    }

    /// See [`CartStore::decrement`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written to storage.
    pub async fn decrement(&self, id: &ProductId) -> Result<()> {
        self.store.decrement(id).await
    }
}

/// Handle on a background cart restore started by [`CartProvider::mount`].
#[derive(Debug)]
pub struct LoadHandle {
    task: JoinHandle<Result<usize>>,
}

impl LoadHandle {
    /// Whether the restore has finished, successfully or not.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the restore and return the number of lines loaded.
    ///
    /// # Errors
    ///
    /// Returns the restore error ([`CartError::Storage`] or
    /// [`CartError::Corrupt`]), or [`CartError::LoadTask`] if the task died.
    pub async fn wait(self) -> Result<usize> {
        self.task.await?
    }
}

/// Owner of the application's cart.
///
/// Create one at startup, hand out [`CartHandle`]s, and call
/// [`CartProvider::close`] at shutdown.
#[derive(Debug)]
pub struct CartProvider {
    handle: CartHandle,
}

impl CartProvider {
    /// Create a provider, loading the persisted cart before returning.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the read fails and
    /// [`CartError::Corrupt`] if the stored blob is not a cart.
    pub async fn restore(
        storage: impl KeyValueStore + 'static,
        key: impl Into<String>,
    ) -> Result<Self> {
        let store = CartStore::open(Arc::new(storage), key).await?;
        Ok(Self::from_store(store))
    }

    /// Create a provider immediately and restore the persisted cart in a
    /// background task.
    ///
    /// The cart reads as empty until the restore lands. Mutations issued
    /// in the meantime wait for the restore and then apply on top of the
    /// restored cart. Must be called from within a tokio runtime.
    #[must_use]
    pub fn mount(storage: impl KeyValueStore + 'static, key: impl Into<String>) -> (Self, LoadHandle) {
        let provider = Self::from_store(CartStore::new(Arc::new(storage), key));
        let store = Arc::clone(&provider.handle.store);

        // Take the writer lock before spawning so no mutation can get ahead
        // of the restore.
        let writer = store.try_lock_writer();

        info!(key = store.key(), "Spawning background cart restore");
        let task = tokio::spawn(async move {
            let writer = match writer {
                Some(writer) => writer,
                None => store.lock_writer().await,
            };
            let result = store.restore_locked(writer).await;
            if let Err(e) = &result {
                error!(error = %e, "Failed to restore cart");
            }
            result
        });

        (provider, LoadHandle { task })
    }

    /// Create a provider backed by the file store described by `config`,
    /// loading the persisted cart before returning.
    ///
    /// # Errors
    ///
    /// See [`CartProvider::restore`].
    pub async fn from_config(config: &CartConfig) -> Result<Self> {
        Self::restore(FileStore::new(config.storage_dir.clone()), config.storage_key.clone()).await
    }

    /// Wrap an existing store.
    #[must_use]
    pub fn from_store(store: CartStore) -> Self {
        Self {
            handle: CartHandle {
                store: Arc::new(store),
            },
        }
    }

    /// A handle on the cart.
    #[must_use]
    pub fn handle(&self) -> CartHandle {
        self.handle.clone()
    }

    /// Run `fut` with this provider's cart reachable through [`use_cart`].
    ///
    /// The scope covers `fut` only; tasks spawned from inside it do not
    /// inherit the cart and must be given a handle explicitly.
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        CURRENT_CART.scope(self.handle(), fut).await
    }

    /// Synchronous counterpart of [`CartProvider::scope`].
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT_CART.sync_scope(self.handle(), f)
    }

    /// Shut the provider down once in-flight mutations have finished
    /// writing.
    pub async fn close(self) {
        self.handle.store.quiesce().await;
        info!(
            key = self.handle.store.key(),
            items = self.handle.products().len(),
            "Cart provider closed"
        );
    }
}

/// The cart of the enclosing [`CartProvider::scope`].
///
/// # Errors
///
/// Returns [`CartError::OutsideProvider`] when called outside a provider
/// scope.
pub fn use_cart() -> Result<CartHandle> {
    CURRENT_CART
        .try_with(CartHandle::clone)
        .map_err(|_| CartError::OutsideProvider)
}
