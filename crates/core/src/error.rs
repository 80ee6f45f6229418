//! Ledger error model.

use thiserror::Error;

use crate::id::LocationId;

/// Result type used across the ledger.
pub type StockResult<T> = Result<T, StockError>;

/// Ledger-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// insufficient stock, conflicts). Storage-backend concerns belong in the
/// store layer and are mapped into this taxonomy at the engine boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// A value failed validation (e.g. non-positive quantity, malformed id).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced product, location, or inventory record does not exist.
    #[error("not found")]
    NotFound,

    /// A removal or transfer exceeds the on-hand quantity at the source.
    #[error("insufficient stock at location {location_id}: requested {requested}, on hand {on_hand}")]
    InsufficientStock {
        location_id: LocationId,
        requested: i64,
        on_hand: i64,
    },

    /// A computed quantity would go below zero outside the normal
    /// insufficient-stock path. Data-integrity fault, not a business outcome.
    #[error("negative stock: {0}")]
    NegativeStock(String),

    /// Same source and destination location, or otherwise malformed transfer.
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    /// Optimistic-version mismatch that survived the bounded internal retry.
    /// The whole operation is safe to retry by the caller.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage-backend failure surfaced through an operation.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl StockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient(location_id: LocationId, requested: i64, on_hand: i64) -> Self {
        Self::InsufficientStock {
            location_id,
            requested,
            on_hand,
        }
    }

    pub fn negative_stock(msg: impl Into<String>) -> Self {
        Self::NegativeStock(msg.into())
    }

    pub fn invalid_transfer(msg: impl Into<String>) -> Self {
        Self::InvalidTransfer(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
