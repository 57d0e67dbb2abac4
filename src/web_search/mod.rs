//! Web search execution
//!
//! Runs a query through an isolated browser session: navigate to the results
//! page, wait for it to settle, extract up to ten titles and URLs.

mod errors;
mod extractor;
mod navigator;
mod pipeline;
mod types;

pub use errors::{SearchError, SearchOutcome};
pub use extractor::{extract, normalize};
pub use navigator::{MarkerWait, navigate, wait_for_marker};
pub use pipeline::{PipelineState, SearchPipeline, validate_query};
pub use types::{RawMatch, SearchResult, SearchResults};

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::session::ChromiumSessionProvider;
use crate::status_events::StatusSink;

/// Run one search in a fresh stealth browser with the default configuration
///
/// # Example
/// ```no_run
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let results = headless_search::web_search::execute_search("rust async", None).await?;
///     println!("Found {} results", results.count);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// See [`SearchPipeline::run`].
pub async fn execute_search(
    query: &str,
    sink: Option<Arc<dyn StatusSink>>,
) -> SearchOutcome<SearchResults> {
    let config = Arc::new(SearchConfig::default());
    let provider = Arc::new(ChromiumSessionProvider::new(Arc::clone(&config)));
    SearchPipeline::new(provider, config).run(query, sink).await
}
