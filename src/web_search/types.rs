//! Data structures for search execution

use serde::{Deserialize, Serialize};

/// Candidate element pulled from the page by one selector strategy
///
/// Only lives between evaluation and normalization inside the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    /// Trimmed text content of the matched element
    pub title: String,

    /// Resolved `href` of the nearest enclosing link, if any
    #[serde(default)]
    pub url: Option<String>,
}

impl RawMatch {
    #[must_use]
    pub fn new(title: impl Into<String>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            url,
        }
    }
}

/// A single search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title, never empty
    pub title: String,

    /// Destination URL, never pointing at the search engine itself
    pub url: String,
}

/// Collection of search results for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Search query that produced these results
    pub query: String,

    /// Results in document order
    pub results: Vec<SearchResult>,

    /// Always equal to `results.len()`
    pub count: usize,
}

impl SearchResults {
    #[must_use]
    pub fn new(query: String, results: Vec<SearchResult>) -> Self {
        let count = results.len();
        Self {
            query,
            results,
            count,
        }
    }
}
