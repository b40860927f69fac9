//! Cart error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by the cart store and its provider.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was reached outside of a [`CartProvider`](crate::CartProvider) scope.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    /// The persistence service rejected a read or write.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The persisted blob is not a valid cart.
    #[error("Corrupt cart data under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory cart could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The background restore task panicked or was cancelled.
    #[error("Cart load task failed: {0}")]
    LoadTask(#[from] tokio::task::JoinError),
}

impl CartError {
    /// Whether this error comes from misuse of the API rather than from
    /// storage or data.
    #[must_use]
    pub const fn is_usage_fault(&self) -> bool {
        matches!(self, Self::OutsideProvider)
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        assert_eq!(
            CartError::OutsideProvider.to_string(),
            "use_cart must be used within a CartProvider"
        );

        let err = CartError::from(StorageError::Unavailable("quota exceeded".to_string()));
        assert_eq!(
            err.to_string(),
            "Storage unavailable: quota exceeded"
        );
    }

    #[test]
    fn test_usage_fault_classification() {
        assert!(CartError::OutsideProvider.is_usage_fault());
        assert!(
            !CartError::from(StorageError::Unavailable(String::new())).is_usage_fault()
        );
    }
}
