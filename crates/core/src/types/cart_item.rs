//! Cart line items.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Quantity};

/// One product line in the cart.
///
/// The field names are the persisted JSON keys (`id`, `title`, `image_url`,
/// `price`, `quantity`) and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product this line refers to. Join key for every cart mutation.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Units of this product on the line.
    pub quantity: Quantity,
}

impl CartItem {
    /// Create a line holding a single unit.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: impl Into<Price>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price: price.into(),
            quantity: Quantity::ONE,
        }
    }

    /// Returns this line with its quantity replaced.
    #[must_use]
    pub fn with_quantity(self, quantity: Quantity) -> Self {
        Self { quantity, ..self }
    }

    /// Whether this line belongs to `id`.
    #[must_use]
    pub fn is(&self, id: &ProductId) -> bool {
        self.id == *id
    }
}
