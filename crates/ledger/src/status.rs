//! Stock-status evaluation: pure reads, no side effects.

use serde::{Deserialize, Serialize};

use crate::record::InventoryRecord;

/// Availability breakdown for one inventory record, as listings and exports
/// present it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub quantity: i64,
    pub reserved: i64,
    /// On-hand minus reserved; negative values are surfaced, not clamped.
    pub available: i64,
}

impl Availability {
    pub fn of(record: &InventoryRecord) -> Self {
        Self {
            quantity: record.quantity,
            reserved: record.reserved_quantity,
            available: record.available(),
        }
    }
}

/// Whether available stock sits below the product's reorder point.
///
/// A missing or zero threshold means the product is never low, regardless of
/// how little is available.
pub fn is_low_stock(available: i64, reorder_point: Option<i64>) -> bool {
    match reorder_point {
        Some(threshold) if threshold > 0 => available < threshold,
        _ => false,
    }
}
