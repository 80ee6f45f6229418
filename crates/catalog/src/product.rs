//! Product existence and reorder-point lookups.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use stocktrail_core::{ProductId, TenantId};

/// The slice of catalog data the ledger is allowed to see.
///
/// `reorder_point` is the per-product low-stock threshold; `None` means no
/// threshold is configured and the product is never considered low.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub reorder_point: Option<i64>,
}

/// Tenant-scoped, read-only product lookups.
pub trait ProductCatalog: Send + Sync {
    fn contains(&self, tenant_id: TenantId, product_id: ProductId) -> bool;

    /// Reorder point for a product, or `None` when the product has no
    /// threshold configured (or does not exist — callers check `contains`
    /// first where existence matters).
    fn reorder_point(&self, tenant_id: TenantId, product_id: ProductId) -> Option<i64>;
}

impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    fn contains(&self, tenant_id: TenantId, product_id: ProductId) -> bool {
        (**self).contains(tenant_id, product_id)
    }

    fn reorder_point(&self, tenant_id: TenantId, product_id: ProductId) -> Option<i64> {
        (**self).reorder_point(tenant_id, product_id)
    }
}

/// In-memory catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    inner: RwLock<HashMap<(TenantId, ProductId), ProductSummary>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tenant_id: TenantId, product: ProductSummary) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((tenant_id, product.product_id), product);
        }
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn contains(&self, tenant_id: TenantId, product_id: ProductId) -> bool {
        self.inner
            .read()
            .map(|map| map.contains_key(&(tenant_id, product_id)))
            .unwrap_or(false)
    }

    fn reorder_point(&self, tenant_id: TenantId, product_id: ProductId) -> Option<i64> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id, product_id))
            .and_then(|p| p.reorder_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(product_id: ProductId, reorder_point: Option<i64>) -> ProductSummary {
        ProductSummary {
            product_id,
            sku: "SKU-001".to_string(),
            name: "Test Product".to_string(),
            reorder_point,
        }
    }

    #[test]
    fn lookups_are_tenant_scoped() {
        let catalog = InMemoryProductCatalog::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let product_id = ProductId::new();

        catalog.insert(tenant_a, summary(product_id, Some(5)));

        assert!(catalog.contains(tenant_a, product_id));
        assert!(!catalog.contains(tenant_b, product_id));
        assert_eq!(catalog.reorder_point(tenant_a, product_id), Some(5));
        assert_eq!(catalog.reorder_point(tenant_b, product_id), None);
    }

    #[test]
    fn missing_reorder_point_reads_as_none() {
        let catalog = InMemoryProductCatalog::new();
        let tenant_id = TenantId::new();
        let product_id = ProductId::new();

        catalog.insert(tenant_id, summary(product_id, None));

        assert!(catalog.contains(tenant_id, product_id));
        assert_eq!(catalog.reorder_point(tenant_id, product_id), None);
    }
}
