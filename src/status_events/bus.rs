//! Broadcast channel fanning status events out to every observer
//!
//! Publishing is synchronous and never fails the caller: with no observers
//! the event is counted as dropped and discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, broadcast};

use super::StatusSink;
use super::errors::EventBusError;
use super::metrics::EventBusMetrics;
use super::types::StatusEvent;

/// Default number of buffered events per observer before it lags
pub const DEFAULT_CAPACITY: usize = 256;

/// Event bus for status events of in-flight searches
#[derive(Debug, Clone)]
pub struct StatusBroadcaster {
    sender: broadcast::Sender<StatusEvent>,
    metrics: EventBusMetrics,
    shutdown: Arc<Notify>,
    shutdown_flag: Arc<AtomicBool>,
}

impl StatusBroadcaster {
    /// Create a broadcaster buffering up to `capacity` events per observer
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            metrics: EventBusMetrics::new(),
            shutdown: Arc::new(Notify::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &EventBusMetrics {
        &self.metrics
    }

    /// Send an event to all current observers
    ///
    /// Returns the number of observers that received it.
    pub fn send(&self, event: StatusEvent) -> usize {
        self.metrics.increment_published();
        if let Ok(subscriber_count) = self.sender.send(event) {
            self.metrics.update_subscriber_count(subscriber_count);
            subscriber_count
        } else {
            self.metrics.increment_dropped();
            self.metrics.update_subscriber_count(0);
            log::debug!("Status event published but no active subscribers");
            0
        }
    }

    /// Subscribe to events published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        let receiver = self.sender.subscribe();
        self.metrics
            .update_subscriber_count(self.sender.receiver_count());
        receiver
    }

    /// Subscribe with a receiver that maps channel errors to `EventBusError`
    #[must_use]
    pub fn subscriber(&self) -> StatusSubscriber {
        StatusSubscriber {
            receiver: self.subscribe(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Signal shutdown to all observers
    ///
    /// Idempotent. All clones share the signal.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
        log::debug!("Status broadcaster shutdown signaled");
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }

    /// Resolve once `shutdown()` has been called on any clone
    pub async fn wait_for_shutdown(&self) {
        let notified = self.shutdown.notified();
        if self.is_shutdown() {
            return;
        }
        notified.await;
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl StatusSink for StatusBroadcaster {
    fn publish(&self, event: StatusEvent) {
        log::trace!("Broadcasting status '{}' for '{}'", event.status, event.query);
        self.send(event);
    }
}

/// Receiver half for one observer
pub struct StatusSubscriber {
    receiver: broadcast::Receiver<StatusEvent>,
}

impl StatusSubscriber {
    /// Wait for the next event
    ///
    /// # Errors
    ///
    /// `ReceiverLagged` if events were overwritten before being read (the
    /// receiver resumes at the oldest retained event), `Shutdown` once every
    /// broadcaster clone is gone.
    pub async fn recv(&mut self) -> Result<StatusEvent, EventBusError> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Closed) => Err(EventBusError::Shutdown),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                Err(EventBusError::ReceiverLagged(skipped))
            }
        }
    }

    /// Take the next buffered event without waiting
    ///
    /// # Errors
    ///
    /// Same conditions as `recv`.
    pub fn try_recv(&mut self) -> Result<Option<StatusEvent>, EventBusError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(EventBusError::Shutdown),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                Err(EventBusError::ReceiverLagged(skipped))
            }
        }
    }
}
