//! Immutable movement-ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stocktrail_core::{LocationId, MovementId, ProductId, StockError, StockResult, TenantId};

/// Kind of stock movement.
///
/// Transfer legs are first-class kinds (not plain IN/OUT with magic notes) so
/// the pairing stays reconstructable; the wire names keep the vocabulary the
/// surrounding application already reports on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    In,
    Out,
    TransferIn,
    TransferOut,
}

impl MovementKind {
    /// Whether this movement adds stock at its location.
    pub fn is_inbound(self) -> bool {
        matches!(self, MovementKind::In | MovementKind::TransferIn)
    }
}

/// One append-only audit record of a stock-changing event.
///
/// Created once, never mutated or deleted by the ledger. The two legs of a
/// transfer carry the same `transfer_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEntry {
    pub id: MovementId,
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub kind: MovementKind,
    /// Magnitude of the change; always positive, direction comes from `kind`.
    pub quantity: i64,
    pub notes: String,
    pub transfer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl MovementEntry {
    pub fn new(
        tenant_id: TenantId,
        product_id: ProductId,
        location_id: LocationId,
        kind: MovementKind,
        quantity: i64,
        notes: impl Into<String>,
        at: DateTime<Utc>,
    ) -> StockResult<Self> {
        if quantity <= 0 {
            return Err(StockError::validation(format!(
                "movement quantity must be positive, got {quantity}"
            )));
        }
        Ok(Self {
            id: MovementId::new(),
            tenant_id,
            product_id,
            location_id,
            kind,
            quantity,
            notes: notes.into(),
            transfer_id: None,
            created_at: at,
        })
    }

    /// Tag this entry as one leg of a transfer.
    pub fn with_transfer_id(mut self, transfer_id: Uuid) -> Self {
        self.transfer_id = Some(transfer_id);
        self
    }
}
