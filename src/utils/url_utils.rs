//! URL helpers for building search requests and classifying result links.

use url::Url;

/// Build the destination address for a query.
///
/// The query is percent-encoded (compatible with `encodeURIComponent`, though
/// `!'()*` are escaped too) and substituted for `{query}` in the template.
#[must_use]
pub fn build_search_url(template: &str, query: &str) -> String {
    template.replace("{query}", &urlencoding::encode(query))
}

/// Check whether a result URL points back to the search engine.
///
/// Substring match on purpose: it also catches subdomains such as
/// `maps.google.com` and redirect wrappers that embed the engine host.
#[must_use]
pub fn is_engine_url(url: &str, engine_domain: &str) -> bool {
    !engine_domain.is_empty() && url.contains(engine_domain)
}

/// Resolve an `href` attribute against the page it was found on.
///
/// Mirrors what `HTMLAnchorElement.href` returns in a live DOM.
#[must_use]
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") || href.starts_with('#') {
        return None;
    }

    base.join(href).ok().map(String::from)
}

/// Target of an engine redirect link (`/url?q=<target>`), if `url` is one.
#[must_use]
pub fn unwrap_redirect(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if parsed.path() != "/url" {
        return None;
    }

    parsed
        .query_pairs()
        .find(|(k, _)| k == "q" || k == "url")
        .map(|(_, v)| v.into_owned())
        .filter(|target| target.starts_with("http://") || target.starts_with("https://"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::SEARCH_URL_TEMPLATE;

    #[test]
    fn encodes_query_like_encode_uri_component() {
        let url = build_search_url(SEARCH_URL_TEMPLATE, "Learn LLMs & more?");
        assert_eq!(
            url,
            "https://www.google.com/search?q=Learn%20LLMs%20%26%20more%3F&hl=en"
        );
    }

    #[test]
    fn escapes_marks_that_encode_uri_component_keeps() {
        let url = build_search_url("https://e.test/?q={query}", "rust(lang)!");
        assert_eq!(url, "https://e.test/?q=rust%28lang%29%21");
    }

    #[test]
    fn engine_links_are_detected_by_substring() {
        assert!(is_engine_url("https://www.google.com/preferences", "google.com"));
        assert!(is_engine_url("https://maps.google.com/x", "google.com"));
        assert!(!is_engine_url("https://docs.rs/tokio", "google.com"));
        assert!(!is_engine_url("https://docs.rs/tokio", ""));
    }

    #[test]
    fn resolves_links_like_a_live_dom() {
        let base = Url::parse("https://www.google.com/search?q=rust").unwrap();

        assert_eq!(
            resolve_href(&base, "/preferences").as_deref(),
            Some("https://www.google.com/preferences")
        );
        assert_eq!(
            resolve_href(&base, "/url?q=https://www.rust-lang.org/&sa=U").as_deref(),
            Some("https://www.google.com/url?q=https://www.rust-lang.org/&sa=U")
        );
        assert_eq!(
            resolve_href(&base, "https://example.com/a").as_deref(),
            Some("https://example.com/a")
        );
        assert_eq!(resolve_href(&base, "javascript:void(0)"), None);
        assert_eq!(resolve_href(&base, "  "), None);
    }

    #[test]
    fn unwraps_redirect_targets_only() {
        assert_eq!(
            unwrap_redirect("https://www.google.com/url?q=https://www.rust-lang.org/&sa=U")
                .as_deref(),
            Some("https://www.rust-lang.org/")
        );
        assert_eq!(
            unwrap_redirect("https://www.google.com/url?sa=t&url=https%3A%2F%2Ftokio.rs%2F")
                .as_deref(),
            Some("https://tokio.rs/")
        );
        assert_eq!(unwrap_redirect("https://www.google.com/url?q=/search"), None);
        assert_eq!(unwrap_redirect("https://docs.rs/url?q=x"), None);
        assert_eq!(unwrap_redirect("https://www.rust-lang.org/"), None);
        assert_eq!(unwrap_redirect("not a url"), None);
    }
}
