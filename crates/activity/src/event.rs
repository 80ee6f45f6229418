//! The audit event emitted per committed ledger operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stocktrail_core::{TenantId, UserId};

/// Action vocabulary of the activity log.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    StockAdjusted,
    StockTransferred,
    SaleCreated,
}

/// What kind of entity the event is about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Inventory,
    Sale,
}

/// One audit record handed to the activity-log collaborator.
///
/// `details` is the human-readable line the log UI shows; the structured
/// fields exist so sinks can index without parsing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub tenant_id: TenantId,
    pub actor: UserId,
    pub action: ActivityAction,
    pub entity_kind: EntityKind,
    pub entity_id: Uuid,
    pub details: String,
    pub occurred_at: DateTime<Utc>,
}
