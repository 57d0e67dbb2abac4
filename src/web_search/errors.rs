//! Error types for search execution
//!
//! One variant per failure class of the pipeline. The HTTP layer maps them
//! to status codes; the orchestrator uses them to decide between aborting
//! and continuing.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for search operations
pub type SearchOutcome<T> = Result<T, SearchError>;

/// Error types for search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query missing, empty or over the configured limit; never reaches the pipeline
    #[error("{0}")]
    Validation(String),

    /// Browser or session could not be provisioned
    #[error("Failed to launch browser session: {0}")]
    Launch(String),

    /// Network failure or top-level timeout while loading the results page
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Primary results marker did not appear in time (recoverable)
    #[error("Selector '{selector}' not found within {waited:?}")]
    SoftTimeout { selector: String, waited: Duration },

    /// In-page evaluation of a selector strategy failed
    #[error("Result extraction failed: {0}")]
    Evaluation(String),

    /// Session could not be closed cleanly; logged, never returned to clients
    #[error("Session teardown failed: {0}")]
    Teardown(String),
}

impl SearchError {
    /// Check if the pipeline may continue past this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SearchError::SoftTimeout { .. })
    }

    /// Check if the error was caused by the caller rather than the pipeline
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, SearchError::Validation(_))
    }
}
