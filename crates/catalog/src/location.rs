//! Location existence lookups.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use stocktrail_core::{LocationId, TenantId};

/// Tenant-scoped, read-only location lookups.
///
/// The ledger never needs location attributes, only whether a referenced id
/// exists for the tenant.
pub trait LocationRegistry: Send + Sync {
    fn contains(&self, tenant_id: TenantId, location_id: LocationId) -> bool;
}

impl<R> LocationRegistry for Arc<R>
where
    R: LocationRegistry + ?Sized,
{
    fn contains(&self, tenant_id: TenantId, location_id: LocationId) -> bool {
        (**self).contains(tenant_id, location_id)
    }
}

/// In-memory registry for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLocationRegistry {
    inner: RwLock<HashSet<(TenantId, LocationId)>>,
}

impl InMemoryLocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tenant_id: TenantId, location_id: LocationId) {
        if let Ok(mut set) = self.inner.write() {
            set.insert((tenant_id, location_id));
        }
    }
}

impl LocationRegistry for InMemoryLocationRegistry {
    fn contains(&self, tenant_id: TenantId, location_id: LocationId) -> bool {
        self.inner
            .read()
            .map(|set| set.contains(&(tenant_id, location_id)))
            .unwrap_or(false)
    }
}
