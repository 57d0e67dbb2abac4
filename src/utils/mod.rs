pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{build_search_url, is_engine_url, resolve_href, unwrap_redirect};
