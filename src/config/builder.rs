//! Fluent builder for `SearchConfig`
//!
//! Every field has a default, so `build()` only validates combinations that
//! would make the pipeline misbehave at runtime.

use anyhow::{Result, anyhow};
use std::time::Duration;

use super::types::{CapPolicy, SearchConfig};
use crate::utils::{
    ACCEPT_LANGUAGE, CHROME_USER_AGENT, DEFAULT_CLOSE_DELAY_MS, DEFAULT_RESULT_SELECTORS,
    ENGINE_DOMAIN, MAX_RESULTS, NAVIGATION_TIMEOUT_SECS, NETWORK_IDLE_SETTLE_MS,
    PRIMARY_RESULT_MARKER, RESULT_MARKER_TIMEOUT_SECS, SEARCH_URL_TEMPLATE, VIEWPORT_HEIGHT,
    VIEWPORT_WIDTH,
};

#[derive(Debug, Clone)]
pub struct SearchConfigBuilder {
    search_url_template: String,
    engine_domain: String,
    primary_marker: String,
    selectors: Vec<String>,
    max_results: usize,
    cap_policy: CapPolicy,
    max_query_length: Option<usize>,
    navigation_timeout: Duration,
    marker_timeout: Duration,
    network_idle_settle: Duration,
    network_idle_max_inflight: usize,
    close_delay: Duration,
    user_agent: String,
    accept_language: String,
    viewport_width: u32,
    viewport_height: u32,
    headless: bool,
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self {
            search_url_template: SEARCH_URL_TEMPLATE.to_string(),
            engine_domain: ENGINE_DOMAIN.to_string(),
            primary_marker: PRIMARY_RESULT_MARKER.to_string(),
            selectors: DEFAULT_RESULT_SELECTORS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_results: MAX_RESULTS,
            cap_policy: CapPolicy::default(),
            max_query_length: None,
            navigation_timeout: Duration::from_secs(NAVIGATION_TIMEOUT_SECS),
            marker_timeout: Duration::from_secs(RESULT_MARKER_TIMEOUT_SECS),
            network_idle_settle: Duration::from_millis(NETWORK_IDLE_SETTLE_MS),
            network_idle_max_inflight: 0,
            close_delay: Duration::from_millis(DEFAULT_CLOSE_DELAY_MS),
            user_agent: CHROME_USER_AGENT.to_string(),
            accept_language: ACCEPT_LANGUAGE.to_string(),
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            headless: true,
        }
    }
}

impl SearchConfig {
    /// Start a builder populated with defaults
    #[must_use]
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

impl SearchConfigBuilder {
    #[must_use]
    pub fn search_url_template(mut self, template: impl Into<String>) -> Self {
        self.search_url_template = template.into();
        self
    }

    #[must_use]
    pub fn engine_domain(mut self, domain: impl Into<String>) -> Self {
        self.engine_domain = domain.into();
        self
    }

    #[must_use]
    pub fn primary_marker(mut self, selector: impl Into<String>) -> Self {
        self.primary_marker = selector.into();
        self
    }

    #[must_use]
    pub fn selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    #[must_use]
    pub fn cap_policy(mut self, policy: CapPolicy) -> Self {
        self.cap_policy = policy;
        self
    }

    /// Reject queries longer than `max` characters; unbounded by default
    #[must_use]
    pub fn max_query_length(mut self, max: usize) -> Self {
        self.max_query_length = Some(max);
        self
    }

    #[must_use]
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn marker_timeout(mut self, timeout: Duration) -> Self {
        self.marker_timeout = timeout;
        self
    }

    #[must_use]
    pub fn network_idle(mut self, settle: Duration, max_inflight: usize) -> Self {
        self.network_idle_settle = settle;
        self.network_idle_max_inflight = max_inflight;
        self
    }

    #[must_use]
    pub fn close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.accept_language = accept_language.into();
        self
    }

    #[must_use]
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Validate and produce the final configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the template lacks a `{query}` placeholder, no
    /// selector strategies are configured, or the result cap is zero.
    pub fn build(self) -> Result<SearchConfig> {
        if !self.search_url_template.contains("{query}") {
            return Err(anyhow!(
                "Search URL template '{}' has no {{query}} placeholder",
                self.search_url_template
            ));
        }
        if self.selectors.iter().all(|s| s.trim().is_empty()) {
            return Err(anyhow!("At least one result selector is required"));
        }
        if self.max_results == 0 {
            return Err(anyhow!("max_results must be greater than zero"));
        }
        if self.navigation_timeout.is_zero() {
            return Err(anyhow!("navigation_timeout must be non-zero"));
        }
        Ok(self.into_config())
    }

    pub(crate) fn into_config(self) -> SearchConfig {
        SearchConfig {
            search_url_template: self.search_url_template,
            engine_domain: self.engine_domain,
            primary_marker: self.primary_marker,
            selectors: self
                .selectors
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect(),
            max_results: self.max_results,
            cap_policy: self.cap_policy,
            max_query_length: self.max_query_length,
            navigation_timeout: self.navigation_timeout,
            marker_timeout: self.marker_timeout,
            network_idle_settle: self.network_idle_settle,
            network_idle_max_inflight: self.network_idle_max_inflight,
            close_delay: self.close_delay,
            user_agent: self.user_agent,
            accept_language: self.accept_language,
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            headless: self.headless,
        }
    }
}
