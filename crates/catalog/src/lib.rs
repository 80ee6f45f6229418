//! Read-only contracts for the catalog collaborators.
//!
//! Products and locations are owned elsewhere; the ledger only needs to know
//! whether a referenced id exists and what a product's reorder point is. These
//! traits are that boundary. The in-memory implementations back tests and dev
//! setups.

pub mod location;
pub mod product;

pub use location::{InMemoryLocationRegistry, LocationRegistry};
pub use product::{InMemoryProductCatalog, ProductCatalog, ProductSummary};
