//! Shared configuration constants
//!
//! Default values used by `SearchConfig` and the session backends so the
//! magic numbers live in one place.

/// Search URL template; `{query}` is replaced with the percent-encoded query.
pub const SEARCH_URL_TEMPLATE: &str = "https://www.google.com/search?q={query}&hl=en";

/// Domain substring identifying links back to the search engine itself.
///
/// Matches ads, navigation chrome and "more results" links.
pub const ENGINE_DOMAIN: &str = "google.com";

/// Marker that signals result markup has been injected into the page.
pub const PRIMARY_RESULT_MARKER: &str = "div[data-ved]";

/// Extraction strategies in priority order.
///
/// The first selector producing at least one element wins.
pub const DEFAULT_RESULT_SELECTORS: &[&str] = &[
    "div[data-ved] h3",
    "h3[class]",
    r#"[role="heading"][aria-level="3"]"#,
    "div > div > div > div > div > div > div > div h3",
];

/// Hard cap on returned results per request.
pub const MAX_RESULTS: usize = 10;

/// Top-level navigation timeout: 30 seconds.
pub const NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// Bounded wait for the primary result marker: 10 seconds.
pub const RESULT_MARKER_TIMEOUT_SECS: u64 = 10;

/// Quiet period with no in-flight requests before a page counts as loaded.
pub const NETWORK_IDLE_SETTLE_MS: u64 = 500;

/// Delay before closing the browser after a successful run.
///
/// Gives observers time to receive the final "Search completed!" event.
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 2000;

/// Chrome user agent string for stealth mode
///
/// Chrome 138 on Windows 10, matching the platform reported by the
/// stealth profile. Update alongside Chrome stable releases.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

/// Viewport width applied to every new page.
pub const VIEWPORT_WIDTH: u32 = 1366;

/// Viewport height applied to every new page.
pub const VIEWPORT_HEIGHT: u32 = 768;

/// Accept-Language header sent by both backends.
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Default listen address for the HTTP server.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3002";
