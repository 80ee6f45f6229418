//! Stock-movement engine: the consumer-facing surface of the ledger.
//!
//! `StockLedger` composes the storage boundary with the read-only catalog
//! collaborators and the activity-log sink, and implements the mutating
//! operations (adjust, transfer, sale consumption) plus the read surface
//! (availability, listings, low-stock evaluation). All multi-tenancy is
//! explicit: every operation takes the tenant id as a parameter.

pub mod service;

#[cfg(test)]
mod integration_tests;

pub use service::{
    AdjustOutcome, AdjustStock, ConsumeForSale, StockLedger, TransferOutcome, TransferStock,
};
