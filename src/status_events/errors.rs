//! Error types for status broadcasting

/// Error types for broadcaster operations
///
/// Publishing never surfaces these to the pipeline; they only reach
/// subscribers and metrics.
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    /// No active subscribers when publishing
    #[error("No active subscribers")]
    NoSubscribers,

    /// Receiver couldn't keep up, missed messages
    #[error("Receiver lagged behind, missed {0} messages")]
    ReceiverLagged(u64),

    /// Broadcaster was closed
    #[error("Event bus shutdown")]
    Shutdown,
}
