//! Event sinks: where the ledger publishes [`SwapEvent`]s.
//!
//! A sink is called while the ledger still holds the lock for the swap being
//! transitioned, so events for one swap arrive in transition order. Sinks
//! must not call back into the ledger.

use std::sync::Arc;

use parking_lot::Mutex;
use swapledger_types::{SwapEvent, SwapEventKind};
use tokio::sync::mpsc;

/// Consumer of ledger events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SwapEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &SwapEvent) {
        (**self).emit(event);
    }
}

/// Discards every event. The ledger's default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &SwapEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SwapEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<SwapEvent> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<SwapEventKind> {
        self.events.lock().iter().map(SwapEvent::kind).collect()
    }

    #[must_use]
    pub fn last(&self) -> Option<SwapEvent> {
        self.events.lock().last().cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &SwapEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Forwards events to an unbounded tokio channel for async watchers.
///
/// Sending never blocks. Once the receiver is dropped, events are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SwapEvent>,
}

impl ChannelSink {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SwapEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &SwapEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(
                swap_id = %event.swap_id(),
                event = %event.kind(),
                "Event receiver dropped; discarding"
            );
        }
    }
}
