//! Navigation to the results page
//!
//! Both waits are bounded here rather than in the session, so a backend that
//! never answers still times out.

use tokio::time::timeout;
use tracing::{info, warn};

use super::errors::{SearchError, SearchOutcome};
use crate::config::SearchConfig;
use crate::session::SearchSession;
use crate::utils::build_search_url;

/// Outcome of the bounded wait for the primary results marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerWait {
    Found,
    /// Wait expired or the backend reported the marker absent
    TimedOut,
}

/// Load the results page for `query` and wait for network quiescence
///
/// # Errors
///
/// `SearchError::Navigation` on connection failure or when the load exceeds
/// the navigation timeout.
pub async fn navigate(
    session: &mut dyn SearchSession,
    query: &str,
    config: &SearchConfig,
) -> SearchOutcome<()> {
    let url = build_search_url(config.search_url_template(), query);
    info!("Session {}: navigating to {}", session.id(), url);

    match timeout(config.navigation_timeout(), session.goto(&url)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(SearchError::Navigation(msg))) => Err(SearchError::Navigation(msg)),
        Ok(Err(other)) => Err(SearchError::Navigation(other.to_string())),
        Err(_) => Err(SearchError::Navigation(format!(
            "Navigation timeout of {} ms exceeded",
            config.navigation_timeout().as_millis()
        ))),
    }
}

/// Wait a bounded time for the primary results marker
///
/// Never fails: expiry and session errors alike are logged and reported as
/// `MarkerWait::TimedOut`, and extraction proceeds with the fallbacks.
pub async fn wait_for_marker(session: &mut dyn SearchSession, config: &SearchConfig) -> MarkerWait {
    let selector = config.primary_marker();
    let waited = config.marker_timeout();

    let soft = match timeout(waited, session.wait_for_selector(selector)).await {
        Ok(Ok(())) => return MarkerWait::Found,
        Ok(Err(e)) => e,
        Err(_) => SearchError::SoftTimeout {
            selector: selector.to_string(),
            waited,
        },
    };

    warn!("Session {}: {}", session.id(), soft);
    MarkerWait::TimedOut
}
