//! CLI subcommands.

pub mod cart;

use thiserror::Error;

/// Errors a subcommand can fail with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Cart(#[from] go_marketplace_cart::CartError),

    #[error("Storage error: {0}")]
    Storage(#[from] go_marketplace_cart::storage::StorageError),

    #[error("Invalid product id: {0}")]
    ProductId(#[from] go_marketplace_core::ProductIdError),

    #[error("Invalid price: {0}")]
    Price(#[from] go_marketplace_core::PriceError),

    #[error("Failed to render cart: {0}")]
    Render(#[from] serde_json::Error),
}
