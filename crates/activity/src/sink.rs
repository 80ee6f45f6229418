//! Hand-off boundary to the external activity log.

use std::sync::{Arc, Mutex};

use crate::event::ActivityEvent;

/// Destination for audit events.
///
/// Sinks run after the ledger commit; a sink failure must not undo committed
/// inventory state, so implementations report errors for the caller to log
/// rather than to roll back.
pub trait ActivitySink: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn record(&self, event: ActivityEvent) -> Result<(), Self::Error>;
}

impl<S> ActivitySink for Arc<S>
where
    S: ActivitySink + ?Sized,
{
    type Error = S::Error;

    fn record(&self, event: ActivityEvent) -> Result<(), Self::Error> {
        (**self).record(event)
    }
}

#[derive(Debug)]
pub enum InMemorySinkError {
    /// Recording failed due to internal lock poisoning.
    Poisoned,
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryActivitySink {
    inner: Mutex<Vec<ActivityEvent>>,
}

impl InMemoryActivitySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl ActivitySink for InMemoryActivitySink {
    type Error = InMemorySinkError;

    fn record(&self, event: ActivityEvent) -> Result<(), Self::Error> {
        let mut events = self.inner.lock().map_err(|_| InMemorySinkError::Poisoned)?;
        events.push(event);
        Ok(())
    }
}

/// Sink that drops every event, for setups without an activity log.
#[derive(Debug, Default)]
pub struct NullActivitySink;

impl NullActivitySink {
    pub fn new() -> Self {
        Self
    }
}

impl ActivitySink for NullActivitySink {
    type Error = core::convert::Infallible;

    fn record(&self, _event: ActivityEvent) -> Result<(), Self::Error> {
        Ok(())
    }
}
