//! Movement-log query interface.
//!
//! Read-only, tenant-scoped, paginated by default. There is deliberately no
//! update or delete surface: the movement log is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocktrail_core::{LocationId, ProductId};
use stocktrail_ledger::{MovementEntry, MovementKind};

/// Pagination parameters for movement queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of entries to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50, // What the recent-movements listing shows.
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(50).min(1000), // Cap at 1000 for safety
            offset: offset.unwrap_or(0),
        }
    }
}

/// Filter criteria for movement queries. All fields optional; empty filter
/// matches everything for the tenant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<ProductId>,
    pub location_id: Option<LocationId>,
    pub kind: Option<MovementKind>,
    /// Entries created at or after this time.
    pub created_after: Option<DateTime<Utc>>,
    /// Entries created at or before this time.
    pub created_before: Option<DateTime<Utc>>,
}

impl MovementFilter {
    pub fn matches(&self, entry: &MovementEntry) -> bool {
        if let Some(product_id) = self.product_id {
            if entry.product_id != product_id {
                return false;
            }
        }
        if let Some(location_id) = self.location_id {
            if entry.location_id != location_id {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if entry.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if entry.created_at > before {
                return false;
            }
        }
        true
    }
}

/// Paginated movement query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementQueryResult {
    /// Matching entries, newest first.
    pub entries: Vec<MovementEntry>,
    /// Total number of entries matching the filter (across all pages).
    pub total: u64,
    /// Pagination parameters used.
    pub pagination: Pagination,
    /// Whether there are more entries available.
    pub has_more: bool,
}
