//! The per-(product, location) inventory record and its mutation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocktrail_core::{LocationId, ProductId, StockError, StockResult, TenantId};

/// Direction of a manual stock adjustment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustDirection {
    Add,
    Remove,
}

impl AdjustDirection {
    /// Signed delta this direction applies for a positive `quantity`.
    pub fn signed(self, quantity: i64) -> i64 {
        match self {
            AdjustDirection::Add => quantity,
            AdjustDirection::Remove => -quantity,
        }
    }
}

/// Current stock of one product at one location.
///
/// `quantity` is the total number of units physically present and never goes
/// below zero. `reserved_quantity` is earmarked-but-not-removed stock; no
/// ledger operation sets it today (reservation slot for a future order-hold
/// feature), so `quantity >= reserved_quantity` is deliberately NOT enforced.
/// `version` increases by one per committed write and backs the optimistic
/// concurrency check in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl InventoryRecord {
    /// Create a fresh record, as the first ADD or transfer-in does for a
    /// (product, location) pair with no record yet.
    pub fn new(
        tenant_id: TenantId,
        product_id: ProductId,
        location_id: LocationId,
        quantity: i64,
        at: DateTime<Utc>,
    ) -> StockResult<Self> {
        if quantity < 0 {
            return Err(StockError::negative_stock(format!(
                "cannot create record with quantity {quantity}"
            )));
        }
        Ok(Self {
            tenant_id,
            product_id,
            location_id,
            quantity,
            reserved_quantity: 0,
            updated_at: at,
            version: 0,
        })
    }

    /// Units available for new demand: on-hand minus reserved.
    ///
    /// May be negative when reserved exceeds on-hand; surfaced as-is.
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved_quantity
    }

    /// The record after applying a signed delta.
    ///
    /// Fails with `NegativeStock` if the delta would take the quantity below
    /// zero; callers that can attribute the failure to caller demand translate
    /// this into `InsufficientStock` before it surfaces. The returned record
    /// keeps its version; the store assigns the committed version.
    pub fn applying(&self, delta: i64, at: DateTime<Utc>) -> StockResult<Self> {
        let new_quantity = self.quantity + delta;
        if new_quantity < 0 {
            return Err(StockError::negative_stock(format!(
                "delta {delta} would take quantity {} below zero",
                self.quantity
            )));
        }
        Ok(Self {
            quantity: new_quantity,
            updated_at: at,
            ..self.clone()
        })
    }
}
