//! Unit price of a cart line.
//!
//! The cart never computes with prices; it only carries them through to
//! storage and back. A price is whatever JSON number the catalog sent, held
//! as an `f64` so that every stored number reloads bit-for-bit.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a number.
    #[error("price must be a number")]
    Invalid,
    /// The input is NaN or infinite, which JSON cannot represent.
    #[error("price must be finite")]
    NotFinite,
}

/// A unit price in the store's currency.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: f64) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of the smallest currency unit
    /// (e.g., cents).
    #[must_use]
    pub fn from_cents(cents: i32) -> Self {
        Self(f64::from(cents) / 100.0)
    }

    /// Returns the underlying amount.
    #[must_use]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    /// Parse a price from user input, accepting an optional leading `$`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] if the input is not a number and
    /// [`PriceError::NotFinite`] for NaN or infinity.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = s
            .trim()
            .trim_start_matches('$')
            .parse::<f64>()
            .map_err(|_| PriceError::Invalid)?;
        if !amount.is_finite() {
            return Err(PriceError::NotFinite);
        }
        Ok(Self(amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<f64> for Price {
    fn from(amount: f64) -> Self {
        Self(amount)
    }
}

impl From<i32> for Price {
    fn from(amount: i32) -> Self {
        Self(f64::from(amount))
    }
}

impl From<u32> for Price {
    fn from(amount: u32) -> Self {
        Self(f64::from(amount))
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
