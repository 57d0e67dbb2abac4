//! Search pipeline orchestration
//!
//! `Idle -> Launching -> Navigating -> Extracting -> Done`, with `Error`
//! reachable from every non-terminal state. Each run owns exactly one
//! session and releases it exactly once on every exit path.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::errors::{SearchError, SearchOutcome};
use super::extractor;
use super::navigator::{self, MarkerWait};
use super::types::{SearchResult, SearchResults};
use crate::config::SearchConfig;
use crate::session::{SessionGuard, SessionProvider};
use crate::status_events::{SearchStatus, StatusEvent, StatusSink};

/// Lifecycle state of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Launching,
    Navigating,
    Extracting,
    Done,
    Error,
}

impl PipelineState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Trim and bound a raw query
///
/// # Errors
///
/// `SearchError::Validation` if the query is empty after trimming, or longer
/// than `max_len` characters when a limit is set.
pub fn validate_query(query: &str, max_len: Option<usize>) -> SearchOutcome<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::Validation(
            "Search query is required".to_string(),
        ));
    }

    let len = trimmed.chars().count();
    if let Some(max_len) = max_len
        && len > max_len
    {
        return Err(SearchError::Validation(format!(
            "Search query is too long ({len} characters). Maximum allowed: {max_len} characters."
        )));
    }

    Ok(trimmed.to_string())
}

/// Shared, stateless entry point; every `run` is independent
#[derive(Clone)]
pub struct SearchPipeline {
    provider: Arc<dyn SessionProvider>,
    config: Arc<SearchConfig>,
}

impl SearchPipeline {
    #[must_use]
    pub fn new(provider: Arc<dyn SessionProvider>, config: Arc<SearchConfig>) -> Self {
        Self { provider, config }
    }

    /// Execute one search, reporting progress to `sink` if given
    ///
    /// Validation happens before any session is provisioned.
    ///
    /// # Errors
    ///
    /// `Validation` for a bad query, otherwise the error of the stage that
    /// failed. The session is released before any error is returned.
    pub async fn run(
        &self,
        query: &str,
        sink: Option<Arc<dyn StatusSink>>,
    ) -> SearchOutcome<SearchResults> {
        let query = validate_query(query, self.config.max_query_length())?;
        let mut run = PipelineRun::new(query, sink);

        run.enter(PipelineState::Launching);
        run.emit(&SearchStatus::Starting);

        let session = match self.provider.acquire().await {
            Ok(session) => session,
            Err(e) => return Err(run.fail(e)),
        };
        let mut guard = SessionGuard::new(session);
        info!("Session {} acquired for '{}'", guard.id(), run.query);
        run.emit(&SearchStatus::BrowserLaunched);

        match self.drive(&mut run, &mut guard).await {
            Ok(results) => {
                run.enter(PipelineState::Done);
                run.emit(&SearchStatus::Completed);
                info!("Search for '{}' returned {} results", run.query, results.len());
                self.schedule_release(guard, &run).await;
                Ok(SearchResults::new(run.query, results))
            }
            Err(e) => {
                guard.release().await;
                Err(run.fail(e))
            }
        }
    }

    async fn drive(
        &self,
        run: &mut PipelineRun,
        guard: &mut SessionGuard,
    ) -> SearchOutcome<Vec<SearchResult>> {
        let session = guard
            .session()
            .ok_or_else(|| SearchError::Navigation("Session already released".to_string()))?;

        run.enter(PipelineState::Navigating);
        run.emit(&SearchStatus::Navigating);
        navigator::navigate(session, &run.query, &self.config).await?;

        run.emit(&SearchStatus::WaitingForResults);
        if navigator::wait_for_marker(session, &self.config).await == MarkerWait::TimedOut {
            run.emit(&SearchStatus::FallbackSelectors);
        }

        run.enter(PipelineState::Extracting);
        run.emit(&SearchStatus::Extracting);
        extractor::extract(session, &self.config).await
    }

    /// Release after the configured delay so the final event reaches observers
    async fn schedule_release(&self, mut guard: SessionGuard, run: &PipelineRun) {
        let delay = self.config.close_delay();
        let sink = run.sink.clone();
        let query = run.query.clone();

        let release = async move {
            if guard.release().await
                && let Some(sink) = sink
            {
                sink.publish(StatusEvent::new(&SearchStatus::BrowserClosed, query));
            }
        };

        if delay.is_zero() {
            release.await;
        } else {
            debug!("Session release scheduled in {delay:?}");
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                release.await;
            });
        }
    }
}

/// Per-run state and event emission
struct PipelineRun {
    query: String,
    state: PipelineState,
    sink: Option<Arc<dyn StatusSink>>,
}

impl PipelineRun {
    fn new(query: String, sink: Option<Arc<dyn StatusSink>>) -> Self {
        Self {
            query,
            state: PipelineState::Idle,
            sink,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        debug!("Pipeline '{}': {:?} -> {:?}", self.query, self.state, next);
        self.state = next;
    }

    fn emit(&self, status: &SearchStatus) {
        if let Some(sink) = &self.sink {
            sink.publish(StatusEvent::new(status, self.query.clone()));
        }
    }

    fn fail(&mut self, err: SearchError) -> SearchError {
        debug_assert!(!self.state.is_terminal());
        self.enter(PipelineState::Error);
        error!("Search for '{}' failed: {}", self.query, err);
        self.emit(&SearchStatus::Failed(err.to_string()));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_are_trimmed() {
        assert_eq!(validate_query("  Learn LLMs \n", None).expect("valid"), "Learn LLMs");
    }

    #[test]
    fn whitespace_only_query_is_required_error() {
        let err = validate_query(" \t ", None).expect_err("blank");
        assert!(err.is_client_error());
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn length_is_counted_in_characters() {
        let query = "é".repeat(500);
        assert!(validate_query(&query, Some(500)).is_ok());
        assert!(validate_query(&format!("{query}é"), Some(500)).is_err());
    }

    #[test]
    fn long_queries_pass_without_a_limit() {
        let query = "rust ".repeat(200);
        assert_eq!(validate_query(&query, None).expect("valid"), query.trim());
    }
}
