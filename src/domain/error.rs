//! Domain validation errors for core domain types.
//!
//! Returned by `try_new` constructors when a feed row would violate a
//! domain invariant. Callers treat these as a malformed entry, not as a
//! reason to stop processing.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Liquidation price must be positive.
    #[error("price must be positive, got {price}")]
    NonPositivePrice {
        /// The invalid price that was provided.
        price: Decimal,
    },

    /// Remaining quantity must be at least one contract.
    #[error("quantity must be positive")]
    ZeroQuantity,

    /// Price times quantity must fit in a decimal.
    #[error("notional of {quantity} @ {price} overflows")]
    NotionalOverflow {
        /// The price that was provided.
        price: Decimal,
        /// The quantity that was provided.
        quantity: u64,
    },

    /// Order ids must be non-empty.
    #[error("order id cannot be empty")]
    EmptyOrderId,

    /// Symbols must be non-empty.
    #[error("symbol cannot be empty")]
    EmptySymbol,
}
