//! Integration tests for the full ledger pipeline.
//!
//! Tests: Command → StockLedger → LedgerStore → movement log / activity sink
//!
//! Verifies:
//! - Adjust/transfer/sale semantics, including the failure paths
//! - Atomicity: failed operations leave zero partial effects
//! - Concurrent adjustments do not lose updates
//! - Tenant isolation and audit emission

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use stocktrail_activity::{ActivityAction, InMemoryActivitySink};
    use stocktrail_catalog::{
        InMemoryLocationRegistry, InMemoryProductCatalog, ProductSummary,
    };
    use stocktrail_core::{LocationId, ProductId, SaleId, StockError, TenantId, UserId};
    use stocktrail_ledger::{AdjustDirection, MovementKind};
    use stocktrail_store::{InMemoryLedgerStore, LedgerStore, MovementFilter, Pagination};

    use crate::service::{AdjustStock, ConsumeForSale, StockLedger, TransferStock};

    type TestLedger = StockLedger<
        Arc<InMemoryLedgerStore>,
        Arc<InMemoryProductCatalog>,
        Arc<InMemoryLocationRegistry>,
        Arc<InMemoryActivitySink>,
    >;

    struct Fixture {
        ledger: TestLedger,
        store: Arc<InMemoryLedgerStore>,
        catalog: Arc<InMemoryProductCatalog>,
        locations: Arc<InMemoryLocationRegistry>,
        activity: Arc<InMemoryActivitySink>,
        tenant_id: TenantId,
        actor: UserId,
    }

    fn setup() -> Fixture {
        let store = Arc::new(InMemoryLedgerStore::new());
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let locations = Arc::new(InMemoryLocationRegistry::new());
        let activity = Arc::new(InMemoryActivitySink::new());
        let ledger = StockLedger::new(
            store.clone(),
            catalog.clone(),
            locations.clone(),
            activity.clone(),
        );
        Fixture {
            ledger,
            store,
            catalog,
            locations,
            activity,
            tenant_id: TenantId::new(),
            actor: UserId::new(),
        }
    }

    impl Fixture {
        fn register_product(&self, reorder_point: Option<i64>) -> ProductId {
            let product_id = ProductId::new();
            self.catalog.insert(
                self.tenant_id,
                ProductSummary {
                    product_id,
                    sku: "SKU-001".to_string(),
                    name: "Test Product".to_string(),
                    reorder_point,
                },
            );
            product_id
        }

        fn register_location(&self) -> LocationId {
            let location_id = LocationId::new();
            self.locations.insert(self.tenant_id, location_id);
            location_id
        }

        fn add_stock(&self, product_id: ProductId, location_id: LocationId, quantity: i64) {
            self.ledger
                .adjust_stock(AdjustStock {
                    tenant_id: self.tenant_id,
                    actor: self.actor,
                    product_id,
                    location_id,
                    direction: AdjustDirection::Add,
                    quantity,
                    notes: None,
                    occurred_at: Utc::now(),
                })
                .unwrap();
        }

        fn movement_count(&self) -> u64 {
            self.store
                .movements(self.tenant_id, &MovementFilter::default(), Pagination::default())
                .unwrap()
                .total
        }
    }

    #[test]
    fn add_adjustment_updates_record_and_appends_one_in_entry() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();
        fx.add_stock(product_id, location_id, 10);

        let outcome = fx
            .ledger
            .adjust_stock(AdjustStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                location_id,
                direction: AdjustDirection::Add,
                quantity: 5,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(outcome.record.quantity, 15);
        assert_eq!(outcome.movement.kind, MovementKind::In);
        assert_eq!(outcome.movement.quantity, 5);
        assert_eq!(outcome.movement.notes, "Stock added via adjustment");
        assert_eq!(fx.movement_count(), 2);
    }

    #[test]
    fn remove_adjustment_beyond_stock_fails_with_zero_effects() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();
        fx.add_stock(product_id, location_id, 3);
        let movements_before = fx.movement_count();

        let err = fx
            .ledger
            .adjust_stock(AdjustStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                location_id,
                direction: AdjustDirection::Remove,
                quantity: 5,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();

        match err {
            StockError::InsufficientStock {
                location_id: at,
                requested,
                on_hand,
            } => {
                assert_eq!(at, location_id);
                assert_eq!(requested, 5);
                assert_eq!(on_hand, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let record = fx.store.get(fx.tenant_id, product_id, location_id).unwrap().unwrap();
        assert_eq!(record.quantity, 3);
        assert_eq!(fx.movement_count(), movements_before);
    }

    #[test]
    fn remove_adjustment_on_absent_record_is_not_found() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();

        let err = fx
            .ledger
            .adjust_stock(AdjustStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                location_id,
                direction: AdjustDirection::Remove,
                quantity: 1,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert_eq!(err, StockError::NotFound);
    }

    #[test]
    fn adjustment_rejects_unknown_product_or_location_before_writing() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();

        let unknown_product = fx
            .ledger
            .adjust_stock(AdjustStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id: ProductId::new(),
                location_id,
                direction: AdjustDirection::Add,
                quantity: 1,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert_eq!(unknown_product, StockError::NotFound);

        let unknown_location = fx
            .ledger
            .adjust_stock(AdjustStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                location_id: LocationId::new(),
                direction: AdjustDirection::Add,
                quantity: 1,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        assert_eq!(unknown_location, StockError::NotFound);
        assert_eq!(fx.movement_count(), 0);
    }

    #[test]
    fn transfer_moves_stock_and_appends_paired_entries() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let source = fx.register_location();
        let destination = fx.register_location();
        fx.add_stock(product_id, source, 20);

        let outcome = fx
            .ledger
            .transfer_stock(TransferStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                source_location_id: source,
                destination_location_id: destination,
                quantity: 8,
                notes: Some("restock front store".to_string()),
                occurred_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(outcome.source.quantity, 12);
        assert_eq!(outcome.destination.quantity, 8);
        assert_eq!(outcome.outbound.kind, MovementKind::TransferOut);
        assert_eq!(outcome.inbound.kind, MovementKind::TransferIn);
        assert_eq!(outcome.outbound.location_id, source);
        assert_eq!(outcome.inbound.location_id, destination);
        assert!(outcome.outbound.transfer_id.is_some());
        assert_eq!(outcome.outbound.transfer_id, outcome.inbound.transfer_id);
        assert_eq!(
            outcome.outbound.notes,
            "Transfer to another location: restock front store"
        );
        assert_eq!(
            outcome.inbound.notes,
            "Transfer from another location: restock front store"
        );

        // Units conserved across the pair of records.
        assert_eq!(outcome.source.quantity + outcome.destination.quantity, 20);
    }

    #[test]
    fn transfer_with_insufficient_source_changes_nothing_anywhere() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let source = fx.register_location();
        let destination = fx.register_location();
        fx.add_stock(product_id, source, 5);
        let movements_before = fx.movement_count();

        let err = fx
            .ledger
            .transfer_stock(TransferStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                source_location_id: source,
                destination_location_id: destination,
                quantity: 8,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        match err {
            StockError::InsufficientStock { requested, on_hand, .. } => {
                assert_eq!(requested, 8);
                assert_eq!(on_hand, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let source_record = fx.store.get(fx.tenant_id, product_id, source).unwrap().unwrap();
        assert_eq!(source_record.quantity, 5);
        assert!(fx.store.get(fx.tenant_id, product_id, destination).unwrap().is_none());
        assert_eq!(fx.movement_count(), movements_before);
    }

    #[test]
    fn transfer_to_same_location_is_rejected_before_any_read() {
        let fx = setup();
        let product_id = ProductId::new(); // Deliberately unregistered: validation runs first.
        let location_id = LocationId::new();

        let err = fx
            .ledger
            .transfer_stock(TransferStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                source_location_id: location_id,
                destination_location_id: location_id,
                quantity: 1,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        match err {
            StockError::InvalidTransfer(_) => {}
            other => panic!("expected InvalidTransfer, got {other:?}"),
        }
    }

    #[test]
    fn transfer_creates_the_destination_record_when_absent() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let source = fx.register_location();
        let destination = fx.register_location();
        fx.add_stock(product_id, source, 20);

        fx.ledger
            .transfer_stock(TransferStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                source_location_id: source,
                destination_location_id: destination,
                quantity: 8,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap();

        let source_record = fx.store.get(fx.tenant_id, product_id, source).unwrap().unwrap();
        let destination_record = fx
            .store
            .get(fx.tenant_id, product_id, destination)
            .unwrap()
            .unwrap();
        assert_eq!(source_record.quantity, 12);
        assert_eq!(destination_record.quantity, 8);
        assert_eq!(destination_record.version, 1);
    }

    #[test]
    fn sale_consumption_deducts_stock_and_records_the_sale_note() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();
        fx.add_stock(product_id, location_id, 10);

        let outcome = fx
            .ledger
            .consume_for_sale(ConsumeForSale {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                location_id,
                quantity: 4,
                sale_id: SaleId::new(),
                customer_name: Some("Ada".to_string()),
                occurred_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(outcome.record.quantity, 6);
        assert_eq!(outcome.movement.kind, MovementKind::Out);
        assert_eq!(outcome.movement.notes, "Sale to Ada");
    }

    #[test]
    fn sale_consumption_fails_before_the_sale_when_stock_is_short() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();
        fx.add_stock(product_id, location_id, 2);
        let movements_before = fx.movement_count();

        let err = fx
            .ledger
            .consume_for_sale(ConsumeForSale {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                location_id,
                quantity: 3,
                sale_id: SaleId::new(),
                customer_name: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        match err {
            StockError::InsufficientStock { .. } => {}
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(fx.movement_count(), movements_before);
    }

    #[test]
    fn availability_reports_the_unclamped_breakdown() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();
        fx.add_stock(product_id, location_id, 5);

        let availability = fx
            .ledger
            .availability(fx.tenant_id, product_id, location_id)
            .unwrap();
        assert_eq!(availability.quantity, 5);
        assert_eq!(availability.reserved, 0);
        assert_eq!(availability.available, 5);

        let missing = fx
            .ledger
            .availability(fx.tenant_id, product_id, fx.register_location())
            .unwrap_err();
        assert_eq!(missing, StockError::NotFound);
    }

    #[test]
    fn low_stock_follows_the_reorder_point() {
        let fx = setup();
        let thresholded = fx.register_product(Some(5));
        let unthresholded = fx.register_product(None);
        let location_id = fx.register_location();
        fx.add_stock(thresholded, location_id, 4);
        fx.add_stock(unthresholded, location_id, 1); // threshold absent, never low

        assert!(fx.ledger.is_low_stock(fx.tenant_id, thresholded, location_id).unwrap());
        assert!(!fx
            .ledger
            .is_low_stock(fx.tenant_id, unthresholded, location_id)
            .unwrap());

        // A pair with no record evaluates at zero available.
        let empty_location = fx.register_location();
        assert!(fx
            .ledger
            .is_low_stock(fx.tenant_id, thresholded, empty_location)
            .unwrap());
    }

    #[test]
    fn movement_listing_is_newest_first_with_default_page_of_50() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();
        for _ in 0..60 {
            fx.add_stock(product_id, location_id, 1);
        }

        let page = fx
            .ledger
            .list_movements(fx.tenant_id, &MovementFilter::default(), Pagination::default())
            .unwrap();
        assert_eq!(page.entries.len(), 50);
        assert_eq!(page.total, 60);
        assert!(page.has_more);
    }

    #[test]
    fn inventory_listing_orders_by_most_recently_updated() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let first = fx.register_location();
        let second = fx.register_location();
        fx.add_stock(product_id, first, 1);
        std::thread::sleep(std::time::Duration::from_millis(2));
        fx.add_stock(product_id, second, 1);

        let records = fx.ledger.list_inventory(fx.tenant_id).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location_id, second);
        assert_eq!(records[1].location_id, first);
    }

    #[test]
    fn operations_emit_one_activity_event_each_and_none_on_failure() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let source = fx.register_location();
        let destination = fx.register_location();

        fx.add_stock(product_id, source, 10);
        fx.ledger
            .transfer_stock(TransferStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                source_location_id: source,
                destination_location_id: destination,
                quantity: 3,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap();
        fx.ledger
            .consume_for_sale(ConsumeForSale {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                location_id: source,
                quantity: 1,
                sale_id: SaleId::new(),
                customer_name: None,
                occurred_at: Utc::now(),
            })
            .unwrap();
        // Failed removal emits nothing.
        let _ = fx
            .ledger
            .adjust_stock(AdjustStock {
                tenant_id: fx.tenant_id,
                actor: fx.actor,
                product_id,
                location_id: source,
                direction: AdjustDirection::Remove,
                quantity: 999,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();

        let actions: Vec<_> = fx.activity.events().iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                ActivityAction::StockAdjusted,
                ActivityAction::StockTransferred,
                ActivityAction::SaleCreated,
            ]
        );
    }

    #[test]
    fn tenants_are_isolated_end_to_end() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();
        fx.add_stock(product_id, location_id, 10);

        let other_tenant = TenantId::new();
        let err = fx
            .ledger
            .adjust_stock(AdjustStock {
                tenant_id: other_tenant,
                actor: fx.actor,
                product_id,
                location_id,
                direction: AdjustDirection::Add,
                quantity: 1,
                notes: None,
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        // The product is not registered for the other tenant.
        assert_eq!(err, StockError::NotFound);
        assert!(fx.ledger.list_inventory(other_tenant).unwrap().is_empty());
    }

    #[test]
    fn concurrent_adds_on_a_fresh_record_do_not_lose_updates() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();
        let ledger = Arc::new(fx.ledger);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ledger = ledger.clone();
                let tenant_id = fx.tenant_id;
                let actor = fx.actor;
                std::thread::spawn(move || {
                    ledger.adjust_stock(AdjustStock {
                        tenant_id,
                        actor,
                        product_id,
                        location_id,
                        direction: AdjustDirection::Add,
                        quantity: 1,
                        notes: None,
                        occurred_at: Utc::now(),
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let record = fx.store.get(fx.tenant_id, product_id, location_id).unwrap().unwrap();
        assert_eq!(record.quantity, 2);
    }

    #[test]
    fn sequential_deltas_sum_to_the_final_quantity() {
        let fx = setup();
        let product_id = fx.register_product(None);
        let location_id = fx.register_location();

        let deltas = [
            (AdjustDirection::Add, 10),
            (AdjustDirection::Remove, 4),
            (AdjustDirection::Add, 7),
            (AdjustDirection::Remove, 13),
        ];
        for (direction, quantity) in deltas {
            fx.ledger
                .adjust_stock(AdjustStock {
                    tenant_id: fx.tenant_id,
                    actor: fx.actor,
                    product_id,
                    location_id,
                    direction,
                    quantity,
                    notes: None,
                    occurred_at: Utc::now(),
                })
                .unwrap();
        }

        let record = fx.store.get(fx.tenant_id, product_id, location_id).unwrap().unwrap();
        assert_eq!(record.quantity, 0);
        assert_eq!(fx.movement_count(), 4);
    }
}
