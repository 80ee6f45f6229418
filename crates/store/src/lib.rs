//! Ledger storage boundary.
//!
//! This crate defines the storage-facing abstraction for inventory records and
//! the append-only movement log without making any backend assumptions. The
//! one non-negotiable contract is `commit`: record writes and the movement
//! entries they produced land together or not at all.

pub mod in_memory;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use query::{MovementFilter, MovementQueryResult, Pagination};
pub use r#trait::{LedgerStore, RecordWrite, StoreError};
