//! Browserless sessions over fetched HTML
//!
//! Fetches the results page with `reqwest` and evaluates selectors with
//! `scraper`. No script runs, so a marker absent from the response will
//! never appear and `wait_for_selector` reports that immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::{SearchSession, SessionProvider};
use crate::config::SearchConfig;
use crate::utils::resolve_href;
use crate::web_search::{RawMatch, SearchError};

/// Hands out sessions sharing one HTTP client
pub struct HtmlSessionProvider {
    client: Client,
}

impl HtmlSessionProvider {
    /// Build a provider whose requests carry the configured browser identity
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Launch` if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        let language = HeaderValue::from_str(config.accept_language())
            .map_err(|e| SearchError::Launch(format!("Invalid Accept-Language: {e}")))?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .user_agent(config.user_agent())
            .default_headers(headers)
            .timeout(config.navigation_timeout())
            .build()
            .map_err(|e| SearchError::Launch(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl SessionProvider for HtmlSessionProvider {
    async fn acquire(&self) -> Result<Box<dyn SearchSession>, SearchError> {
        let id = format!("html-{}", uuid::Uuid::new_v4());
        debug!("Opened HTML session {id}");
        Ok(Box::new(HtmlSession {
            id,
            client: Some(self.client.clone()),
            page: None,
        }))
    }
}

/// Loaded document and the address it was served from
struct LoadedPage {
    base: Url,
    html: String,
}

/// One fetched document
pub struct HtmlSession {
    id: String,
    client: Option<Client>,
    page: Option<LoadedPage>,
}

impl HtmlSession {
    /// Session over a fixed document; `goto` is a no-op
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Navigation` if `base_url` is not absolute.
    pub fn from_document(base_url: &str, html: impl Into<String>) -> Result<Self, SearchError> {
        let base = Url::parse(base_url)
            .map_err(|e| SearchError::Navigation(format!("Invalid base URL '{base_url}': {e}")))?;
        Ok(Self {
            id: format!("fixture-{}", uuid::Uuid::new_v4()),
            client: None,
            page: Some(LoadedPage {
                base,
                html: html.into(),
            }),
        })
    }

    fn loaded(&self) -> Result<&LoadedPage, SearchError> {
        self.page
            .as_ref()
            .ok_or_else(|| SearchError::Evaluation("No document loaded".to_string()))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, SearchError> {
    Selector::parse(selector)
        .map_err(|e| SearchError::Evaluation(format!("Invalid selector '{selector}': {e:?}")))
}

/// Nearest ancestor-or-self `<a>` element, like `Element.closest('a')`
fn closest_link(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|e| e.value().name() == "a")
}

/// Evaluate `selector` against a parsed document
///
/// Kept synchronous: `Html` is not `Send` and must not live across an await.
fn select_matches(page: &LoadedPage, selector: &Selector) -> Vec<RawMatch> {
    let document = Html::parse_document(&page.html);
    document
        .select(selector)
        .map(|element| {
            let title = element.text().collect::<String>().trim().to_string();
            let url = closest_link(element)
                .and_then(|link| link.value().attr("href"))
                .and_then(|href| resolve_href(&page.base, href));
            RawMatch { title, url }
        })
        .collect()
}

#[async_trait]
impl SearchSession for HtmlSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn goto(&mut self, url: &str) -> Result<(), SearchError> {
        let Some(client) = &self.client else {
            return Ok(());
        };

        let response = client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SearchError::Navigation(e.to_string()))?;
        let base = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Navigation(format!("Failed to read body: {e}")))?;

        info!("Session {}: loaded {} bytes from {}", self.id, html.len(), base);
        self.page = Some(LoadedPage { base, html });
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), SearchError> {
        let parsed = parse_selector(selector)?;
        let page = self.loaded()?;
        let found = Html::parse_document(&page.html).select(&parsed).next().is_some();
        if found {
            Ok(())
        } else {
            Err(SearchError::SoftTimeout {
                selector: selector.to_string(),
                waited: Duration::ZERO,
            })
        }
    }

    async fn query_matches(&mut self, selector: &str) -> Result<Vec<RawMatch>, SearchError> {
        let parsed = parse_selector(selector)?;
        Ok(select_matches(self.loaded()?, &parsed))
    }

    async fn close(&mut self) -> Result<(), SearchError> {
        self.page = None;
        self.client = None;
        debug!("Closed HTML session {}", self.id);
        Ok(())
    }
}

/// Provider that serves one fixed document to every session
pub struct StaticHtmlProvider {
    base_url: String,
    html: Arc<str>,
}

impl StaticHtmlProvider {
    #[must_use]
    pub fn new(base_url: impl Into<String>, html: impl Into<Arc<str>>) -> Self {
        Self {
            base_url: base_url.into(),
            html: html.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticHtmlProvider {
    async fn acquire(&self) -> Result<Box<dyn SearchSession>, SearchError> {
        Ok(Box::new(HtmlSession::from_document(
            &self.base_url,
            self.html.as_ref(),
        )?))
    }
}
