use std::sync::Arc;
use std::time::Duration;

use headless_search::utils::CHROME_USER_AGENT;
use headless_search::{
    HtmlSessionProvider, SearchConfig, SearchError, SearchPipeline, SearchSession, SessionProvider,
};
use mockito::{Matcher, Server};

const RESULTS_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <div data-ved="1"><a href="/url?q=https://www.rust-lang.org/&amp;sa=U"><h3>Rust Programming Language</h3></a></div>
  <div data-ved="2"><a href="https://doc.rust-lang.org/book/"><h3>The Rust Book</h3></a></div>
  <div data-ved="3"><a href="/search?q=rust&amp;tbm=nws"><h3>News about rust</h3></a></div>
</body></html>"#;

fn config_for(server: &Server) -> SearchConfig {
    SearchConfig::builder()
        .search_url_template(format!("{}/search?q={{query}}&hl=en", server.url()))
        .engine_domain("google.com")
        .marker_timeout(Duration::from_millis(50))
        .close_delay(Duration::ZERO)
        .build()
        .expect("valid config")
}

#[tokio::test]
async fn test_fetches_with_browser_identity_and_extracts() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "rust lang".into()),
            Matcher::UrlEncoded("hl".into(), "en".into()),
        ]))
        .match_header("user-agent", CHROME_USER_AGENT)
        .match_header("accept-language", "en-US,en;q=0.9")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(RESULTS_PAGE)
        .create_async()
        .await;

    let config = Arc::new(config_for(&server));
    let provider = Arc::new(HtmlSessionProvider::new(&config).expect("client builds"));
    let pipeline = SearchPipeline::new(provider, config);

    let results = pipeline.run("rust lang", None).await.expect("search succeeds");
    mock.assert_async().await;

    let urls: Vec<&str> = results.results.iter().map(|r| r.url.as_str()).collect();
    // The relative news link resolves to the mock server, not the engine, so it survives.
    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], "https://www.rust-lang.org/");
    assert_eq!(urls[1], "https://doc.rust-lang.org/book/");
    assert!(urls[2].starts_with(&server.url()));
}

#[tokio::test]
async fn test_relative_engine_links_are_self_links_on_the_engine_host() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(RESULTS_PAGE)
        .create_async()
        .await;

    // Treat the mock host as the engine: relative links now point back at it.
    let host = server.host_with_port();
    let config = SearchConfig::builder()
        .search_url_template(format!("{}/search?q={{query}}", server.url()))
        .engine_domain(host)
        .marker_timeout(Duration::from_millis(50))
        .close_delay(Duration::ZERO)
        .build()
        .expect("valid config");
    let config = Arc::new(config);
    let provider = Arc::new(HtmlSessionProvider::new(&config).expect("client builds"));

    let results = SearchPipeline::new(provider, config)
        .run("rust", None)
        .await
        .expect("search succeeds");
    assert_eq!(results.count, 2);
}

#[tokio::test]
async fn test_http_error_is_navigation_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Error")
        .create_async()
        .await;

    let config = Arc::new(config_for(&server));
    let provider = Arc::new(HtmlSessionProvider::new(&config).expect("client builds"));

    let err = SearchPipeline::new(provider, config)
        .run("rust", None)
        .await
        .expect_err("503 fails navigation");
    assert!(matches!(err, SearchError::Navigation(_)));
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let config = SearchConfig::default();
    let provider = HtmlSessionProvider::new(&config).expect("client builds");
    let first = provider.acquire().await.expect("session");
    let second = provider.acquire().await.expect("session");
    assert_ne!(first.id(), second.id());
}
