pub mod browser_profile;
pub mod browser_setup;
pub mod config;
pub mod http;
pub mod session;
pub mod status_events;
pub mod stealth;
pub mod utils;
pub mod web_search;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{CapPolicy, SearchConfig, SearchConfigBuilder, ServerConfig};
pub use http::HttpServer;
pub use session::{
    ChromiumSessionProvider, HtmlSession, HtmlSessionProvider, SearchSession, SessionGuard,
    SessionProvider, StaticHtmlProvider,
};
pub use status_events::{StatusBroadcaster, StatusEvent, StatusSink};
pub use web_search::{
    SearchError, SearchOutcome, SearchPipeline, SearchResult, SearchResults, execute_search,
};
