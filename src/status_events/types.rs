//! Status event definitions for in-flight searches

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage reported to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// Pipeline entered the launching state
    Starting,
    /// Session acquired
    BrowserLaunched,
    /// Navigation to the results page started
    Navigating,
    /// Page loaded, waiting for the primary marker
    WaitingForResults,
    /// Marker wait expired, continuing with the fallback strategies
    FallbackSelectors,
    /// Selector strategies are being evaluated
    Extracting,
    /// Results are ready
    Completed,
    /// Session released after a successful run
    BrowserClosed,
    /// Pipeline failed with the given message
    Failed(String),
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => f.write_str("Starting search..."),
            Self::BrowserLaunched => f.write_str("Browser launched, opening new page..."),
            Self::Navigating => f.write_str("Navigating to Google search..."),
            Self::WaitingForResults => f.write_str("Waiting for search results to load..."),
            Self::FallbackSelectors => {
                f.write_str("Primary selector not found, trying fallback...")
            }
            Self::Extracting => f.write_str("Extracting search results..."),
            Self::Completed => f.write_str("Search completed!"),
            Self::BrowserClosed => f.write_str("Browser closed"),
            Self::Failed(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Message broadcast to every connected observer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Human-readable stage message
    pub status: String,
    /// Query of the run that emitted the event
    pub query: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl StatusEvent {
    #[must_use]
    pub fn new(status: &SearchStatus, query: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            query: query.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Check if this is the final event of a failed run
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status.starts_with("Error: ")
    }
}
