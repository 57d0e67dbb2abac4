//! Multi-strategy result extraction
//!
//! Selector strategies are tried in priority order against the loaded page.
//! The first strategy with at least one match wins; later strategies are
//! never evaluated.

use tracing::{debug, info};

use super::errors::SearchOutcome;
use super::types::{RawMatch, SearchResult};
use crate::config::{CapPolicy, SearchConfig};
use crate::session::SearchSession;
use crate::utils::{is_engine_url, unwrap_redirect};

/// Run the configured strategies and normalize the winning matches
///
/// No strategy matching is not an error: the result is empty.
///
/// # Errors
///
/// `SearchError::Evaluation` if a strategy cannot be evaluated in the page.
pub async fn extract(
    session: &mut dyn SearchSession,
    config: &SearchConfig,
) -> SearchOutcome<Vec<SearchResult>> {
    for (index, selector) in config.selectors().iter().enumerate() {
        let matches = session.query_matches(selector).await?;
        if matches.is_empty() {
            debug!("Strategy {} ('{}') matched nothing", index + 1, selector);
            continue;
        }

        info!(
            "Strategy {} ('{}') matched {} elements",
            index + 1,
            selector,
            matches.len()
        );
        return Ok(normalize(
            matches,
            config.engine_domain(),
            config.max_results(),
            config.cap_policy(),
        ));
    }

    info!("No selector strategy matched");
    Ok(Vec::new())
}

/// Filter raw matches into results and apply the cap
///
/// Engine redirect links are unwrapped to their target first. A match is
/// kept when it has a URL that does not point at the engine itself and a
/// non-empty trimmed title.
#[must_use]
pub fn normalize(
    matches: Vec<RawMatch>,
    engine_domain: &str,
    max_results: usize,
    policy: CapPolicy,
) -> Vec<SearchResult> {
    let keep = |raw: RawMatch| -> Option<SearchResult> {
        let url = raw.url?;
        let url = unwrap_redirect(&url).unwrap_or(url);
        let title = raw.title.trim();
        if title.is_empty() || is_engine_url(&url, engine_domain) {
            return None;
        }
        Some(SearchResult {
            title: title.to_string(),
            url,
        })
    };

    match policy {
        CapPolicy::SliceThenFilter => matches
            .into_iter()
            .take(max_results)
            .filter_map(keep)
            .collect(),
        CapPolicy::FilterThenSlice => matches
            .into_iter()
            .filter_map(keep)
            .take(max_results)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, url: Option<&str>) -> RawMatch {
        RawMatch::new(title, url.map(str::to_string))
    }

    #[test]
    fn drops_self_links_missing_urls_and_blank_titles() {
        let matches = vec![
            raw("Rust", Some("https://www.rust-lang.org/")),
            raw("Images", Some("https://www.google.com/search?tbm=isch")),
            raw("Maps", Some("https://maps.google.com/")),
            raw("No link", None),
            raw("   ", Some("https://example.com/")),
            raw("  Tokio  ", Some("https://tokio.rs/")),
        ];
        let results = normalize(matches, "google.com", 10, CapPolicy::SliceThenFilter);
        assert_eq!(
            results,
            vec![
                SearchResult {
                    title: "Rust".into(),
                    url: "https://www.rust-lang.org/".into()
                },
                SearchResult {
                    title: "Tokio".into(),
                    url: "https://tokio.rs/".into()
                },
            ]
        );
    }

    #[test]
    fn redirect_links_resolve_to_their_target() {
        let matches = vec![
            raw("Coursera", Some("https://www.google.com/url?q=https://www.coursera.org/learn/llms&sa=U")),
            raw("Engine page", Some("https://www.google.com/url?q=/search%3Fq%3Dx")),
        ];
        let results = normalize(matches, "google.com", 10, CapPolicy::SliceThenFilter);
        assert_eq!(
            results,
            vec![SearchResult {
                title: "Coursera".into(),
                url: "https://www.coursera.org/learn/llms".into()
            }]
        );
    }

    #[test]
    fn slice_then_filter_may_under_fill() {
        let mut matches = vec![raw("Engine", Some("https://www.google.com/x"))];
        matches.extend((0..12).map(|i| raw(&format!("R{i}"), Some(&format!("https://r{i}.dev/")))));

        let sliced = normalize(matches.clone(), "google.com", 10, CapPolicy::SliceThenFilter);
        assert_eq!(sliced.len(), 9);
        assert_eq!(sliced[0].title, "R0");

        let filtered = normalize(matches, "google.com", 10, CapPolicy::FilterThenSlice);
        assert_eq!(filtered.len(), 10);
        assert_eq!(filtered[9].title, "R9");
    }
}
