//! Go Marketplace Cart - Persisted shopping-cart store.
//!
//! The cart is an ordered list of [`CartItem`]s held in memory and written
//! in full to a key-value store after every change.
//!
//! # Architecture
//!
//! - [`storage`] - The key-value persistence service and its backends
//! - [`store`] - The cart itself: restore, snapshot, add/increment/decrement
//! - [`provider`] - Owns one store for the application lifetime and hands
//!   out [`CartHandle`]s
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use go_marketplace_cart::{CartProvider, storage::MemoryStore};
//! use go_marketplace_core::CartItem;
//!
//! # async fn demo() -> go_marketplace_cart::Result<()> {
//! let provider = CartProvider::restore(MemoryStore::new(), "@GoMarketplace:cart").await?;
//! let cart = provider.handle();
//!
//! cart.add_to_cart(CartItem::new("sku-1", "Coffee", "https://img/1.png", 10)).await?;
//! cart.increment(&"sku-1".into()).await?;
//! assert_eq!(cart.products()[0].quantity.get(), 2);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod provider;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError, LogFormat};
pub use error::{CartError, Result};
pub use provider::{CartHandle, CartProvider, LoadHandle, use_cart};
pub use store::{CartStore, DEFAULT_STORAGE_KEY, Snapshot};

pub use go_marketplace_core::{CartItem, Price, ProductId, Quantity};
