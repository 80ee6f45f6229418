//! Structured audit events for the external activity-log collaborator.
//!
//! The ledger emits one `ActivityEvent` per committed mutating operation. It
//! does not own the activity log's storage or presentation; the `ActivitySink`
//! trait is the hand-off point, and the in-memory/null implementations back
//! tests and setups without a log.

pub mod event;
pub mod sink;

pub use event::{ActivityAction, ActivityEvent, EntityKind};
pub use sink::{ActivitySink, InMemoryActivitySink, NullActivitySink};
