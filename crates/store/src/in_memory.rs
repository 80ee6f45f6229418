use std::collections::HashMap;
use std::sync::RwLock;

use stocktrail_core::{LocationId, ProductId, TenantId};
use stocktrail_ledger::{InventoryRecord, MovementEntry};

use crate::query::{MovementFilter, MovementQueryResult, Pagination};
use crate::r#trait::{LedgerStore, RecordWrite, StoreError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    tenant_id: TenantId,
    product_id: ProductId,
    location_id: LocationId,
}

/// A committed movement plus its position in the tenant's log.
///
/// `created_at` comes from the caller's clock, so the per-tenant `sequence`
/// is what makes newest-first ordering match commit order even when
/// timestamps collide.
#[derive(Debug, Clone)]
struct StoredMovement {
    sequence: u64,
    entry: MovementEntry,
}

#[derive(Debug, Default)]
struct State {
    records: HashMap<RecordKey, InventoryRecord>,
    movements: HashMap<TenantId, Vec<StoredMovement>>,
    next_sequence: HashMap<TenantId, u64>,
}

/// In-memory ledger store.
///
/// Intended for tests/dev. All state sits behind one `RwLock`; a commit
/// validates every expected version and applies every effect under a single
/// write guard, which yields both per-key serialization and multi-record
/// atomicity. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_batch(
        tenant_id: TenantId,
        writes: &[RecordWrite],
        movements: &[MovementEntry],
    ) -> Result<(), StoreError> {
        let mut seen = Vec::with_capacity(writes.len());
        for (idx, w) in writes.iter().enumerate() {
            if w.record.tenant_id != tenant_id {
                return Err(StoreError::TenantIsolation(format!(
                    "write batch contains a foreign tenant_id (index {idx})"
                )));
            }
            if w.record.quantity < 0 {
                return Err(StoreError::NegativeQuantity(format!(
                    "write for product {} at location {} carries quantity {}",
                    w.record.product_id, w.record.location_id, w.record.quantity
                )));
            }
            let key = (w.record.product_id, w.record.location_id);
            if seen.contains(&key) {
                return Err(StoreError::InvalidCommit(format!(
                    "duplicate (product, location) key in write batch (index {idx})"
                )));
            }
            seen.push(key);
        }
        for (idx, m) in movements.iter().enumerate() {
            if m.tenant_id != tenant_id {
                return Err(StoreError::TenantIsolation(format!(
                    "movement batch contains a foreign tenant_id (index {idx})"
                )));
            }
            if m.quantity <= 0 {
                return Err(StoreError::InvalidCommit(format!(
                    "movement quantity must be positive (index {idx})"
                )));
            }
        }
        Ok(())
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn get(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        location_id: LocationId,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(state
            .records
            .get(&RecordKey {
                tenant_id,
                product_id,
                location_id,
            })
            .cloned())
    }

    fn list_records(&self, tenant_id: TenantId) -> Result<Vec<InventoryRecord>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        let mut records: Vec<InventoryRecord> = state
            .records
            .iter()
            .filter_map(|(k, v)| (k.tenant_id == tenant_id).then(|| v.clone()))
            .collect();
        // Most recently touched first, as the stock-levels listing expects.
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    fn commit(
        &self,
        tenant_id: TenantId,
        writes: Vec<RecordWrite>,
        movements: Vec<MovementEntry>,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        if writes.is_empty() && movements.is_empty() {
            return Ok(vec![]);
        }
        Self::validate_batch(tenant_id, &writes, &movements)?;

        let mut guard = self
            .state
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        let state = &mut *guard;

        // Check every expectation before applying anything: one stale version
        // rejects the whole batch.
        for w in &writes {
            let key = RecordKey {
                tenant_id,
                product_id: w.record.product_id,
                location_id: w.record.location_id,
            };
            let current = state.records.get(&key).map(|r| r.version);
            if !w.expected.matches(current) {
                return Err(StoreError::Conflict(format!(
                    "record for product {} at location {}: expected {:?}, found {current:?}",
                    w.record.product_id, w.record.location_id, w.expected
                )));
            }
        }

        let mut committed = Vec::with_capacity(writes.len());
        for w in writes {
            let key = RecordKey {
                tenant_id,
                product_id: w.record.product_id,
                location_id: w.record.location_id,
            };
            let next_version = state.records.get(&key).map(|r| r.version + 1).unwrap_or(1);
            let mut record = w.record;
            record.version = next_version;
            state.records.insert(key, record.clone());
            committed.push(record);
        }

        if !movements.is_empty() {
            let sequence = state.next_sequence.entry(tenant_id).or_insert(0);
            let log = state.movements.entry(tenant_id).or_default();
            for entry in movements {
                *sequence += 1;
                log.push(StoredMovement {
                    sequence: *sequence,
                    entry,
                });
            }
        }

        Ok(committed)
    }

    fn movements(
        &self,
        tenant_id: TenantId,
        filter: &MovementFilter,
        pagination: Pagination,
    ) -> Result<MovementQueryResult, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let mut matching: Vec<&StoredMovement> = state
            .movements
            .get(&tenant_id)
            .map(|log| log.iter().filter(|m| filter.matches(&m.entry)).collect())
            .unwrap_or_default();

        // Newest first; the append sequence breaks created_at ties.
        matching.sort_by(|a, b| b.sequence.cmp(&a.sequence));

        let total = matching.len() as u64;
        let entries: Vec<MovementEntry> = matching
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .map(|m| m.entry.clone())
            .collect();
        let has_more = (pagination.offset as u64 + entries.len() as u64) < total;

        Ok(MovementQueryResult {
            entries,
            total,
            pagination,
            has_more,
        })
    }
}
