//! Core types for Go Marketplace.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart_item;
pub mod id;
pub mod price;
pub mod quantity;

pub use cart_item::CartItem;
pub use id::{ProductId, ProductIdError};
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
