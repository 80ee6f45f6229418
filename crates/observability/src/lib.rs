//! Process-wide tracing/logging setup for ledger hosts.

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
