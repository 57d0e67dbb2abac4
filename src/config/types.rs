//! Core configuration types for search execution
//!
//! `SearchConfig` carries every knob the pipeline reads: the target URL
//! template, selector strategies, timeouts and the stealth browser profile.
//! Values are fixed at construction and shared read-only across requests.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ordering of the result cap relative to noise filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapPolicy {
    /// Take the first `max_results` raw matches, then filter.
    ///
    /// May return fewer than `max_results` when early matches are noise.
    #[default]
    SliceThenFilter,

    /// Filter every raw match, then take the first `max_results`.
    FilterThenSlice,
}

/// Main configuration struct for search execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Destination template containing a `{query}` placeholder
    pub(crate) search_url_template: String,

    /// Links containing this substring are dropped as self-links
    pub(crate) engine_domain: String,

    /// Selector awaited (softly) after load to detect injected results
    pub(crate) primary_marker: String,

    /// Extraction strategies in priority order
    pub(crate) selectors: Vec<String>,

    pub(crate) max_results: usize,
    pub(crate) cap_policy: CapPolicy,
    /// Optional character limit on trimmed queries
    pub(crate) max_query_length: Option<usize>,

    /// Hard bound on navigation including the network-idle wait
    pub(crate) navigation_timeout: Duration,

    /// Soft bound on the primary marker wait
    pub(crate) marker_timeout: Duration,

    /// Quiet period required before the network counts as idle
    pub(crate) network_idle_settle: Duration,

    /// Requests allowed in flight while still counting as idle
    pub(crate) network_idle_max_inflight: usize,

    /// Delay between "Search completed!" and closing the session.
    ///
    /// Zero closes inline before the response is returned.
    pub(crate) close_delay: Duration,

    pub(crate) user_agent: String,
    pub(crate) accept_language: String,
    pub(crate) viewport_width: u32,
    pub(crate) viewport_height: u32,
    pub(crate) headless: bool,
}

impl SearchConfig {
    #[must_use]
    pub fn search_url_template(&self) -> &str {
        &self.search_url_template
    }

    #[must_use]
    pub fn engine_domain(&self) -> &str {
        &self.engine_domain
    }

    #[must_use]
    pub fn primary_marker(&self) -> &str {
        &self.primary_marker
    }

    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    #[must_use]
    pub fn cap_policy(&self) -> CapPolicy {
        self.cap_policy
    }

    #[must_use]
    pub fn max_query_length(&self) -> Option<usize> {
        self.max_query_length
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    #[must_use]
    pub fn marker_timeout(&self) -> Duration {
        self.marker_timeout
    }

    #[must_use]
    pub fn network_idle_settle(&self) -> Duration {
        self.network_idle_settle
    }

    #[must_use]
    pub fn network_idle_max_inflight(&self) -> usize {
        self.network_idle_max_inflight
    }

    #[must_use]
    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn accept_language(&self) -> &str {
        &self.accept_language
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        super::builder::SearchConfigBuilder::default().into_config()
    }
}
