//! The cart store.
//!
//! Holds the authoritative, ordered list of cart lines and writes the whole
//! list to a [`KeyValueStore`] after every mutation.
//!
//! # Ordering
//!
//! Mutations go through a single writer lock: take the lock, derive the next
//! list from the current one, publish it, persist it, release. A later
//! mutation never starts before an earlier one has finished writing, so the
//! stored blob always matches the last completed mutation.
//!
//! A failed write does not roll back: the new list stays published and the
//! error is returned. Memory and storage disagree until the next successful
//! write.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, watch};
use tracing::{debug, info, instrument, warn};

use go_marketplace_core::{CartItem, ProductId, Quantity};

use crate::error::{CartError, Result};
use crate::storage::KeyValueStore;

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:cart";

/// Read-only view of the cart at one point in time.
pub type Snapshot = Arc<Vec<CartItem>>;

/// Persisted, ordered collection of cart lines.
///
/// The persisted cart is loaded once, when the store is opened; it cannot
/// be reloaded over a live cart:
///
/// ```compile_fail
/// # async fn demo(store: go_marketplace_cart::CartStore) {
/// let _ = store.restore().await;
/// # }
/// ```
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    products: watch::Sender<Snapshot>,
    writer: Arc<Mutex<()>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("items", &self.products.borrow().len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty store. Nothing is read from storage; use
    /// [`CartStore::open`] to load a persisted cart.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (products, _) = watch::channel(Snapshot::default());
        Self {
            storage,
            key: key.into(),
            products,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Create a store and load the persisted cart before returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the read fails and
    /// [`CartError::Corrupt`] if the stored blob is not a cart.
    pub async fn open(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let store = Self::new(storage, key);
        store.restore().await?;
        Ok(store)
    }

    /// Storage key this cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current cart contents.
    #[must_use]
    pub fn products(&self) -> Snapshot {
        Arc::clone(&self.products.borrow())
    }

    /// Receiver notified with a new snapshot after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.products.subscribe()
    }

    /// Replace the in-memory cart with the persisted one. Runs once per
    /// store, from [`CartStore::open`] or the provider's background restore.
    ///
    /// Leaves the cart untouched when nothing is stored. Returns the number
    /// of lines restored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the read fails and
    /// [`CartError::Corrupt`] if the stored blob is not a cart.
    pub(crate) async fn restore(&self) -> Result<usize> {
        let writer = self.lock_writer().await;
        self.restore_locked(writer).await
    }

    /// Restore while already holding the writer lock.
    #[instrument(skip(self, _writer), fields(key = %self.key))]
    pub(crate) async fn restore_locked(&self, _writer: OwnedMutexGuard<()>) -> Result<usize> {
        let Some(blob) = self.storage.get(&self.key).await? else {
            debug!("No persisted cart");
            return Ok(0);
        };

        let items: Vec<CartItem> =
            serde_json::from_str(&blob).map_err(|source| CartError::Corrupt {
                key: self.key.clone(),
                source,
            })?;

        let count = items.len();
        self.products.send_replace(Arc::new(items));
        info!(items = count, "Restored persisted cart");
        Ok(count)
    }

    /// Take the writer lock, waiting for any mutation in flight.
    pub(crate) async fn lock_writer(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.writer).lock_owned().await
    }

    /// Try to take the writer lock without waiting.
    pub(crate) fn try_lock_writer(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.writer).try_lock_owned().ok()
    }

    /// Wait until no mutation or restore is in flight.
    pub(crate) async fn quiesce(&self) {
        drop(self.writer.lock().await);
    }

    /// Append `item` as a new line with quantity 1.
    ///
    /// The incoming quantity is ignored. Lines are never merged: adding an
    /// ID that is already in the cart appends a second line for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written to storage. The line
    /// stays in the in-memory cart.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub async fn add_to_cart(&self, item: CartItem) -> Result<()> {
        let line = item.with_quantity(Quantity::ONE);
        self.commit(move |products| {
            let mut next = Vec::with_capacity(products.len() + 1);
            next.extend_from_slice(products);
            next.push(line);
            next
        })
        .await
    }

    /// Add one unit to every line for `id`.
    ///
    /// An unknown ID changes nothing but the cart is still written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written to storage.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn increment(&self, id: &ProductId) -> Result<()> {
        self.commit(|products| update_matching(products, id, Quantity::incremented))
            .await
    }

    /// Remove one unit from every line for `id`, never going below 1.
    ///
    /// Lines are never removed. An unknown ID changes nothing but the cart
    /// is still written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written to storage.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn decrement(&self, id: &ProductId) -> Result<()> {
        self.commit(|products| update_matching(products, id, Quantity::decremented))
            .await
    }

    /// Apply `transform` under the writer lock, publish and persist.
    async fn commit<F>(&self, transform: F) -> Result<()>
    where
        F: FnOnce(&[CartItem]) -> Vec<CartItem>,
    {
        let _writer = self.writer.lock().await;

        let next = Arc::new(transform(&self.products.borrow()));
        self.products.send_replace(Arc::clone(&next));

        if let Err(e) = self.persist(&next).await {
            warn!(error = %e, "Cart changed in memory but was not saved");
            return Err(e);
        }
        Ok(())
    }

    /// Write the full cart under the storage key.
    async fn persist(&self, products: &[CartItem]) -> Result<()> {
        let blob = serde_json::to_string(products).map_err(CartError::Serialize)?;
        self.storage.set(&self.key, blob).await?;
        debug!(items = products.len(), "Saved cart");
        Ok(())
    }
}

/// Copy `products`, replacing the quantity of every line for `id`.
fn update_matching(
    products: &[CartItem],
    id: &ProductId,
    update: impl Fn(Quantity) -> Quantity,
) -> Vec<CartItem> {
    products
        .iter()
        .map(|item| {
            if item.is(id) {
                let quantity = update(item.quantity);
                item.clone().with_quantity(quantity)
            } else {
                item.clone()
            }
        })
        .collect()
}
