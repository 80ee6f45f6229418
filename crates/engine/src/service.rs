//! Ledger operations (application-level orchestration).
//!
//! Every mutating operation follows the same pipeline: validate input before
//! any read, check collaborator existence, read current records, decide the
//! new state with pure domain logic, then hand the record writes and the
//! movement entries they produced to the store as one atomic commit. A
//! version conflict restarts the pipeline from the read step, a bounded
//! number of times, before surfacing to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stocktrail_activity::{ActivityAction, ActivityEvent, ActivitySink, EntityKind};
use stocktrail_catalog::{LocationRegistry, ProductCatalog};
use stocktrail_core::{
    ExpectedVersion, LocationId, ProductId, SaleId, StockError, StockResult, TenantId, UserId,
};
use stocktrail_ledger::{
    is_low_stock, AdjustDirection, Availability, InventoryRecord, MovementEntry, MovementKind,
};
use stocktrail_store::{
    LedgerStore, MovementFilter, MovementQueryResult, Pagination, RecordWrite, StoreError,
};

/// Conflict retries before the error surfaces. Each retry re-reads fresh
/// state, so a retried operation can still fail on business grounds.
const MAX_CONFLICT_RETRIES: u32 = 3;

/// Command: manual stock adjustment at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub tenant_id: TenantId,
    pub actor: UserId,
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub direction: AdjustDirection,
    pub quantity: i64,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: move stock between two locations of the same product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStock {
    pub tenant_id: TenantId,
    pub actor: UserId,
    pub product_id: ProductId,
    pub source_location_id: LocationId,
    pub destination_location_id: LocationId,
    pub quantity: i64,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: deduct stock consumed by a sale.
///
/// The sale collaborator calls this before persisting its own record and must
/// not persist the sale if the deduction fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeForSale {
    pub tenant_id: TenantId,
    pub actor: UserId,
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub quantity: i64,
    pub sale_id: SaleId,
    pub customer_name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Result of a successful adjustment or sale consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustOutcome {
    pub record: InventoryRecord,
    pub movement: MovementEntry,
}

/// Result of a successful transfer: both post-images and both ledger legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub source: InventoryRecord,
    pub destination: InventoryRecord,
    pub outbound: MovementEntry,
    pub inbound: MovementEntry,
}

/// The stock-movement engine.
///
/// Generic over the storage backend, the read-only catalog collaborators, and
/// the activity-log sink, so tests run fully in memory and real deployments
/// swap the seams without touching operation logic.
#[derive(Debug)]
pub struct StockLedger<S, C, L, A> {
    store: S,
    catalog: C,
    locations: L,
    activity: A,
}

impl<S, C, L, A> StockLedger<S, C, L, A>
where
    S: LedgerStore,
    C: ProductCatalog,
    L: LocationRegistry,
    A: ActivitySink,
{
    pub fn new(store: S, catalog: C, locations: L, activity: A) -> Self {
        Self {
            store,
            catalog,
            locations,
            activity,
        }
    }

    /// Apply a single add/remove delta and append the matching ledger entry.
    pub fn adjust_stock(&self, cmd: AdjustStock) -> StockResult<AdjustOutcome> {
        if cmd.quantity <= 0 {
            return Err(StockError::validation(format!(
                "adjustment quantity must be positive, got {}",
                cmd.quantity
            )));
        }
        self.ensure_product(cmd.tenant_id, cmd.product_id)?;
        self.ensure_location(cmd.tenant_id, cmd.location_id)?;

        let outcome = self.with_conflict_retry("adjust_stock", || self.try_adjust(&cmd))?;

        tracing::info!(
            tenant_id = %cmd.tenant_id,
            product_id = %cmd.product_id,
            location_id = %cmd.location_id,
            quantity = outcome.record.quantity,
            "stock adjusted"
        );
        let verb = match cmd.direction {
            AdjustDirection::Add => "Added",
            AdjustDirection::Remove => "Removed",
        };
        self.emit(ActivityEvent {
            tenant_id: cmd.tenant_id,
            actor: cmd.actor,
            action: ActivityAction::StockAdjusted,
            entity_kind: EntityKind::Inventory,
            entity_id: *cmd.product_id.as_uuid(),
            details: format!(
                "{verb} {} units of product {} at location {}",
                cmd.quantity, cmd.product_id, cmd.location_id
            ),
            occurred_at: cmd.occurred_at,
        });

        Ok(outcome)
    }

    fn try_adjust(&self, cmd: &AdjustStock) -> StockResult<AdjustOutcome> {
        let current = self
            .store
            .get(cmd.tenant_id, cmd.product_id, cmd.location_id)
            .map_err(map_store_error)?;

        let write = match (&current, cmd.direction) {
            (None, AdjustDirection::Add) => RecordWrite::new(
                InventoryRecord::new(
                    cmd.tenant_id,
                    cmd.product_id,
                    cmd.location_id,
                    cmd.quantity,
                    cmd.occurred_at,
                )?,
                ExpectedVersion::NoRecord,
            ),
            (None, AdjustDirection::Remove) => return Err(StockError::not_found()),
            (Some(record), direction) => {
                let updated = record
                    .applying(direction.signed(cmd.quantity), cmd.occurred_at)
                    .map_err(|err| match err {
                        StockError::NegativeStock(_) => StockError::insufficient(
                            cmd.location_id,
                            cmd.quantity,
                            record.quantity,
                        ),
                        other => other,
                    })?;
                RecordWrite::new(updated, ExpectedVersion::Exact(record.version))
            }
        };

        let (kind, default_notes) = match cmd.direction {
            AdjustDirection::Add => (MovementKind::In, "Stock added via adjustment"),
            AdjustDirection::Remove => (MovementKind::Out, "Stock removed via adjustment"),
        };
        let notes = cmd
            .notes
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_notes.to_string());
        let movement = MovementEntry::new(
            cmd.tenant_id,
            cmd.product_id,
            cmd.location_id,
            kind,
            cmd.quantity,
            notes,
            cmd.occurred_at,
        )?;

        let committed = self
            .store
            .commit(cmd.tenant_id, vec![write], vec![movement.clone()])
            .map_err(map_store_error)?;

        Ok(AdjustOutcome {
            record: committed.into_iter().next().ok_or_else(|| {
                StockError::storage("commit returned no record for adjustment write")
            })?,
            movement,
        })
    }

    /// Move stock between two locations, atomically: two record writes plus
    /// the paired TRANSFER_OUT/TRANSFER_IN ledger legs land together or not
    /// at all.
    pub fn transfer_stock(&self, cmd: TransferStock) -> StockResult<TransferOutcome> {
        if cmd.source_location_id == cmd.destination_location_id {
            return Err(StockError::invalid_transfer(
                "source and destination location are the same",
            ));
        }
        if cmd.quantity <= 0 {
            return Err(StockError::invalid_transfer(format!(
                "transfer quantity must be positive, got {}",
                cmd.quantity
            )));
        }
        self.ensure_product(cmd.tenant_id, cmd.product_id)?;
        self.ensure_location(cmd.tenant_id, cmd.source_location_id)?;
        self.ensure_location(cmd.tenant_id, cmd.destination_location_id)?;

        let outcome = self.with_conflict_retry("transfer_stock", || self.try_transfer(&cmd))?;

        tracing::info!(
            tenant_id = %cmd.tenant_id,
            product_id = %cmd.product_id,
            source = %cmd.source_location_id,
            destination = %cmd.destination_location_id,
            quantity = cmd.quantity,
            "stock transferred"
        );
        self.emit(ActivityEvent {
            tenant_id: cmd.tenant_id,
            actor: cmd.actor,
            action: ActivityAction::StockTransferred,
            entity_kind: EntityKind::Inventory,
            entity_id: *cmd.product_id.as_uuid(),
            details: format!(
                "Transferred {} units of product {} from location {} to location {}",
                cmd.quantity, cmd.product_id, cmd.source_location_id, cmd.destination_location_id
            ),
            occurred_at: cmd.occurred_at,
        });

        Ok(outcome)
    }

    fn try_transfer(&self, cmd: &TransferStock) -> StockResult<TransferOutcome> {
        let source = self
            .store
            .get(cmd.tenant_id, cmd.product_id, cmd.source_location_id)
            .map_err(map_store_error)?;
        let on_hand = source.as_ref().map(|r| r.quantity).unwrap_or(0);
        let source = match source {
            Some(record) if record.quantity >= cmd.quantity => record,
            _ => {
                return Err(StockError::insufficient(
                    cmd.source_location_id,
                    cmd.quantity,
                    on_hand,
                ));
            }
        };

        let destination = self
            .store
            .get(cmd.tenant_id, cmd.product_id, cmd.destination_location_id)
            .map_err(map_store_error)?;

        let source_write = RecordWrite::new(
            source.applying(-cmd.quantity, cmd.occurred_at)?,
            ExpectedVersion::Exact(source.version),
        );
        let destination_write = match destination {
            Some(record) => RecordWrite::new(
                record.applying(cmd.quantity, cmd.occurred_at)?,
                ExpectedVersion::Exact(record.version),
            ),
            None => RecordWrite::new(
                InventoryRecord::new(
                    cmd.tenant_id,
                    cmd.product_id,
                    cmd.destination_location_id,
                    cmd.quantity,
                    cmd.occurred_at,
                )?,
                ExpectedVersion::NoRecord,
            ),
        };

        let transfer_id = Uuid::now_v7();
        let suffix = cmd
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| format!(": {n}"))
            .unwrap_or_default();
        let outbound = MovementEntry::new(
            cmd.tenant_id,
            cmd.product_id,
            cmd.source_location_id,
            MovementKind::TransferOut,
            cmd.quantity,
            format!("Transfer to another location{suffix}"),
            cmd.occurred_at,
        )?
        .with_transfer_id(transfer_id);
        let inbound = MovementEntry::new(
            cmd.tenant_id,
            cmd.product_id,
            cmd.destination_location_id,
            MovementKind::TransferIn,
            cmd.quantity,
            format!("Transfer from another location{suffix}"),
            cmd.occurred_at,
        )?
        .with_transfer_id(transfer_id);

        let mut committed = self
            .store
            .commit(
                cmd.tenant_id,
                vec![source_write, destination_write],
                vec![outbound.clone(), inbound.clone()],
            )
            .map_err(map_store_error)?
            .into_iter();
        let (source, destination) = match (committed.next(), committed.next()) {
            (Some(source), Some(destination)) => (source, destination),
            _ => {
                return Err(StockError::storage(
                    "commit returned fewer records than transfer writes",
                ));
            }
        };

        Ok(TransferOutcome {
            source,
            destination,
            outbound,
            inbound,
        })
    }

    /// Deduct stock as the side effect of recording a sale.
    pub fn consume_for_sale(&self, cmd: ConsumeForSale) -> StockResult<AdjustOutcome> {
        if cmd.quantity <= 0 {
            return Err(StockError::validation(format!(
                "sale quantity must be positive, got {}",
                cmd.quantity
            )));
        }
        self.ensure_product(cmd.tenant_id, cmd.product_id)?;
        self.ensure_location(cmd.tenant_id, cmd.location_id)?;

        let outcome = self.with_conflict_retry("consume_for_sale", || self.try_consume(&cmd))?;

        tracing::info!(
            tenant_id = %cmd.tenant_id,
            product_id = %cmd.product_id,
            location_id = %cmd.location_id,
            sale_id = %cmd.sale_id,
            quantity = cmd.quantity,
            "stock consumed by sale"
        );
        self.emit(ActivityEvent {
            tenant_id: cmd.tenant_id,
            actor: cmd.actor,
            action: ActivityAction::SaleCreated,
            entity_kind: EntityKind::Sale,
            entity_id: *cmd.sale_id.as_uuid(),
            details: format!(
                "Sale: {}x product {} at location {}",
                cmd.quantity, cmd.product_id, cmd.location_id
            ),
            occurred_at: cmd.occurred_at,
        });

        Ok(outcome)
    }

    fn try_consume(&self, cmd: &ConsumeForSale) -> StockResult<AdjustOutcome> {
        let record = self
            .store
            .get(cmd.tenant_id, cmd.product_id, cmd.location_id)
            .map_err(map_store_error)?
            .ok_or_else(|| {
                StockError::insufficient(cmd.location_id, cmd.quantity, 0)
            })?;
        if record.quantity < cmd.quantity {
            return Err(StockError::insufficient(
                cmd.location_id,
                cmd.quantity,
                record.quantity,
            ));
        }

        let write = RecordWrite::new(
            record.applying(-cmd.quantity, cmd.occurred_at)?,
            ExpectedVersion::Exact(record.version),
        );
        let customer = cmd
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("customer");
        let movement = MovementEntry::new(
            cmd.tenant_id,
            cmd.product_id,
            cmd.location_id,
            MovementKind::Out,
            cmd.quantity,
            format!("Sale to {customer}"),
            cmd.occurred_at,
        )?;

        let committed = self
            .store
            .commit(cmd.tenant_id, vec![write], vec![movement.clone()])
            .map_err(map_store_error)?;

        Ok(AdjustOutcome {
            record: committed.into_iter().next().ok_or_else(|| {
                StockError::storage("commit returned no record for sale deduction")
            })?,
            movement,
        })
    }

    /// Availability breakdown for one (product, location) pair.
    pub fn availability(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        location_id: LocationId,
    ) -> StockResult<Availability> {
        let record = self
            .store
            .get(tenant_id, product_id, location_id)
            .map_err(map_store_error)?
            .ok_or_else(StockError::not_found)?;
        Ok(Availability::of(&record))
    }

    /// All inventory records for the tenant, most recently updated first.
    pub fn list_inventory(&self, tenant_id: TenantId) -> StockResult<Vec<InventoryRecord>> {
        self.store.list_records(tenant_id).map_err(map_store_error)
    }

    /// Movement-ledger page, newest first.
    pub fn list_movements(
        &self,
        tenant_id: TenantId,
        filter: &MovementFilter,
        pagination: Pagination,
    ) -> StockResult<MovementQueryResult> {
        self.store
            .movements(tenant_id, filter, pagination)
            .map_err(map_store_error)
    }

    /// Whether available stock sits below the product's reorder point.
    ///
    /// A pair with no record evaluates at quantity 0; a product without a
    /// threshold is never low.
    pub fn is_low_stock(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        location_id: LocationId,
    ) -> StockResult<bool> {
        self.ensure_product(tenant_id, product_id)?;
        let available = self
            .store
            .get(tenant_id, product_id, location_id)
            .map_err(map_store_error)?
            .map(|record| record.available())
            .unwrap_or(0);
        let reorder_point = self.catalog.reorder_point(tenant_id, product_id);
        Ok(is_low_stock(available, reorder_point))
    }

    fn ensure_product(&self, tenant_id: TenantId, product_id: ProductId) -> StockResult<()> {
        if self.catalog.contains(tenant_id, product_id) {
            Ok(())
        } else {
            Err(StockError::not_found())
        }
    }

    fn ensure_location(&self, tenant_id: TenantId, location_id: LocationId) -> StockResult<()> {
        if self.locations.contains(tenant_id, location_id) {
            Ok(())
        } else {
            Err(StockError::not_found())
        }
    }

    /// Run `attempt` until it succeeds, fails on business grounds, or has
    /// conflicted `MAX_CONFLICT_RETRIES` times. Each run re-reads fresh
    /// state, so retrying is safe at the business level.
    fn with_conflict_retry<T>(
        &self,
        operation: &str,
        mut attempt: impl FnMut() -> StockResult<T>,
    ) -> StockResult<T> {
        let mut conflicts = 0;
        loop {
            match attempt() {
                Err(StockError::Conflict(msg)) if conflicts < MAX_CONFLICT_RETRIES => {
                    conflicts += 1;
                    tracing::warn!(
                        operation,
                        conflicts,
                        "retrying after version conflict: {msg}"
                    );
                }
                other => return other,
            }
        }
    }

    /// Hand an audit event to the activity-log collaborator.
    ///
    /// The ledger commit is already durable at this point; a sink failure is
    /// logged, not propagated, because the sink does not participate in the
    /// operation's atomicity.
    fn emit(&self, event: ActivityEvent) {
        if let Err(err) = self.activity.record(event) {
            tracing::warn!("activity sink rejected event: {err:?}");
        }
    }
}

fn map_store_error(err: StoreError) -> StockError {
    match err {
        StoreError::Conflict(msg) => StockError::conflict(msg),
        StoreError::NegativeQuantity(msg) => StockError::negative_stock(msg),
        StoreError::TenantIsolation(msg) | StoreError::InvalidCommit(msg) => {
            StockError::validation(msg)
        }
        StoreError::Storage(msg) => StockError::storage(msg),
    }
}
