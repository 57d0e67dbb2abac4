//! Live status reporting for in-flight searches
//!
//! The pipeline publishes through the `StatusSink` seam; the HTTP layer
//! wires a shared `StatusBroadcaster` in and streams it to observers.

pub mod bus;
pub mod errors;
pub mod metrics;
pub mod types;

pub use bus::{StatusBroadcaster, StatusSubscriber};
pub use errors::EventBusError;
pub use metrics::{EventBusMetrics, MetricsSnapshot};
pub use types::{SearchStatus, StatusEvent};

/// Fire-and-forget destination for status events
///
/// Implementations must not block and must not fail the caller.
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: StatusEvent);
}
