//! Bounded, lossy event channel backed by `tokio::sync::mpsc`.

use packts::event::{EmitError, EventSink, RewriteEvent};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Sending half handed to the classifier. Never waits for capacity.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<RewriteEvent>,
}

/// Creates a channel holding at most `capacity` undelivered events.
///
/// A capacity of zero is treated as one.
pub fn channel(capacity: usize) -> (ChannelSink, mpsc::Receiver<RewriteEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ChannelSink { tx }, rx)
}

impl EventSink for ChannelSink {
    fn try_emit(&self, event: &RewriteEvent) -> Result<(), EmitError> {
        self.tx.try_send(*event).map_err(|e| match e {
            TrySendError::Full(_) => EmitError::Full,
            TrySendError::Closed(_) => EmitError::Closed,
        })
    }
}
