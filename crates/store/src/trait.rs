use std::sync::Arc;

use thiserror::Error;

use stocktrail_core::{ExpectedVersion, LocationId, ProductId, TenantId};
use stocktrail_ledger::{InventoryRecord, MovementEntry};

use crate::query::{MovementFilter, MovementQueryResult, Pagination};

/// One versioned record write inside a commit.
///
/// `record` is the desired post-image; its `version` field is ignored — the
/// store assigns the committed version (`expected + 1`, or 1 on creation).
/// `expected` states what the writer read, which is how read-modify-write
/// sequences on the same key detect each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordWrite {
    pub record: InventoryRecord,
    pub expected: ExpectedVersion,
}

impl RecordWrite {
    pub fn new(record: InventoryRecord, expected: ExpectedVersion) -> Self {
        Self { record, expected }
    }
}

/// Ledger store operation error.
///
/// These are storage-layer failures (stale versions, isolation violations,
/// malformed commits) as opposed to the business failures in `StockError`.
/// The engine maps them at its boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An expected version did not match; nothing in the commit was applied.
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// A write or movement in the batch belongs to a different tenant.
    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    /// A write would persist a negative quantity. The engine validates this
    /// first; the store rejects it again as a data-integrity backstop.
    #[error("negative quantity rejected: {0}")]
    NegativeQuantity(String),

    /// Malformed commit batch (duplicate keys, non-positive movement, ...).
    #[error("invalid commit: {0}")]
    InvalidCommit(String),

    /// Backend failure (lock poisoning, connection loss, ...).
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Tenant-scoped store for inventory records plus the append-only movement log.
///
/// ## Commit semantics
///
/// `commit` is the only writer and is atomic all-or-nothing:
/// - every `RecordWrite` is version-checked against current state; one stale
///   expectation rejects the whole batch with `Conflict`
/// - movement entries are appended only with the record writes that produced
///   them, so a ledger entry can never exist without its inventory write
/// - committed records come back with their assigned versions, in the order
///   the writes were given
///
/// Within one (tenant, product, location) key, movement-log order matches the
/// order record writes became visible. Cross-key ordering is not guaranteed.
///
/// ## Read semantics
///
/// Reads never block writers and carry no locks out of the store. Movement
/// queries are newest-first and restartable via offset.
pub trait LedgerStore: Send + Sync {
    fn get(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        location_id: LocationId,
    ) -> Result<Option<InventoryRecord>, StoreError>;

    /// All records for a tenant, most recently updated first.
    fn list_records(&self, tenant_id: TenantId) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Atomically apply record writes and append their movement entries.
    fn commit(
        &self,
        tenant_id: TenantId,
        writes: Vec<RecordWrite>,
        movements: Vec<MovementEntry>,
    ) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Query the movement log, newest first.
    fn movements(
        &self,
        tenant_id: TenantId,
        filter: &MovementFilter,
        pagination: Pagination,
    ) -> Result<MovementQueryResult, StoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn get(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        location_id: LocationId,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).get(tenant_id, product_id, location_id)
    }

    fn list_records(&self, tenant_id: TenantId) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).list_records(tenant_id)
    }

    fn commit(
        &self,
        tenant_id: TenantId,
        writes: Vec<RecordWrite>,
        movements: Vec<MovementEntry>,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).commit(tenant_id, writes, movements)
    }

    fn movements(
        &self,
        tenant_id: TenantId,
        filter: &MovementFilter,
        pagination: Pagination,
    ) -> Result<MovementQueryResult, StoreError> {
        (**self).movements(tenant_id, filter, pagination)
    }
}
