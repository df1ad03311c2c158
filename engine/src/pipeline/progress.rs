//! Progress channel between a pipeline run and its observer
//!
//! Each run owns one bounded sender. Events are delivered in the order they
//! are emitted and the stream ends when the run drops its sender, so an
//! observer never sees an event after the run's result.
//!
//! # Requirements
//! - Bounded channel to prevent unbounded memory growth
//! - A dropped receiver never fails the run

use sdk::types::{Phase, ProgressEvent};
use tokio::sync::mpsc;

/// Default channel buffer size
pub const CHANNEL_BUFFER_SIZE: usize = 100;

/// Create a progress channel with the given capacity
pub fn channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressSender { tx }, ProgressReceiver { rx })
}

/// Sending half, owned by a single run
#[derive(Debug)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ProgressSender {
    /// Report progress within `phase`
    ///
    /// Waits for channel capacity. If the observer has gone away the event is
    /// dropped; it is still recorded in the trace log.
    pub async fn emit(&self, phase: Phase, message: impl Into<String>) {
        let event = ProgressEvent::new(phase, message);
        tracing::debug!(phase = ?event.phase, "{}", event.message);

        // Ignore send errors (observer may have dropped the receiver)
        let _ = self.tx.send(event).await;
    }
}

/// Receiving half, owned by the presentation layer
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Next event, or `None` once the run has finished
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }

    /// Drain the remaining events until the run drops its sender
    pub async fn collect(mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.rx.recv().await {
            events.push(event);
        }
        events
    }
}
