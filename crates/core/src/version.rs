//! Optimistic concurrency primitive for inventory records.

use crate::error::{StockError, StockResult};

/// Version expectation for a record write.
///
/// Every inventory record carries a monotonically increasing version. A write
/// states what version it expects the record to be at; the store rejects the
/// write if the record moved in the meantime. This serializes read-modify-write
/// sequences per (product, location) key without holding locks across reads.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// The record must not exist yet (guards the creation race).
    NoRecord,
    /// Require the record to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    /// `current` is the record's version, or `None` if no record exists.
    pub fn matches(self, current: Option<u64>) -> bool {
        match (self, current) {
            (ExpectedVersion::NoRecord, None) => true,
            (ExpectedVersion::Exact(v), Some(actual)) => v == actual,
            _ => false,
        }
    }

    pub fn check(self, current: Option<u64>) -> StockResult<()> {
        if self.matches(current) {
            Ok(())
        } else {
            Err(StockError::conflict(format!(
                "stale record version (expected: {self:?}, actual: {current:?})"
            )))
        }
    }
}
