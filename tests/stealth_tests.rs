//! Browser-backed tests; need a local Chrome or network access for the
//! managed download. Run with `--ignored`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use headless_search::browser_profile::create_unique_profile;
use headless_search::browser_setup::launch_browser;
use headless_search::stealth::{StealthProfile, inject};
use headless_search::{ChromiumSessionProvider, SearchConfig, SearchPipeline};
use mockito::{Matcher, Server};

async fn evaluate_json(page: &chromiumoxide::Page, expression: &str) -> Result<serde_json::Value> {
    Ok(page
        .evaluate(expression)
        .await?
        .value()
        .cloned()
        .unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
#[ignore = "launches a real browser"]
async fn test_evasions() -> Result<()> {
    let config = SearchConfig::default();
    let profile = create_unique_profile()?;
    let (mut browser, handler) = launch_browser(&config, profile.path()).await?;

    let page = browser.new_page("about:blank").await?;
    let injected = inject(&page, &StealthProfile::from_config(&config)).await?;
    assert!(injected > 0);

    // Scripts run on the next document
    page.goto("data:text/html,<html><body><img src='missing.png'></body></html>")
        .await?;

    assert_eq!(evaluate_json(&page, "navigator.webdriver === undefined").await?, true);
    assert_eq!(evaluate_json(&page, "navigator.vendor").await?, "Google Inc.");
    assert_eq!(evaluate_json(&page, "navigator.platform").await?, "Win32");
    assert_eq!(evaluate_json(&page, "navigator.languages[0]").await?, "en-US");
    assert_eq!(evaluate_json(&page, "navigator.plugins.length > 0").await?, true);
    assert_eq!(evaluate_json(&page, "!!window.chrome.runtime").await?, true);
    assert_eq!(
        evaluate_json(&page, "navigator.userAgent").await?,
        headless_search::utils::CHROME_USER_AGENT
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(
        evaluate_json(&page, "document.querySelector('img').width").await?,
        16
    );

    browser.close().await?;
    browser.wait().await?;
    handler.abort();
    Ok(())
}

#[tokio::test]
#[ignore = "launches a real browser"]
async fn test_chromium_pipeline_against_local_results_page() -> Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(
            r#"<html><body>
              <div data-ved="1"><a href="https://www.rust-lang.org/"><h3>Rust</h3></a></div>
              <div data-ved="2"><a href="https://tokio.rs/"><h3>Tokio</h3></a></div>
            </body></html>"#,
        )
        .create_async()
        .await;

    let config = Arc::new(
        SearchConfig::builder()
            .search_url_template(format!("{}/search?q={{query}}", server.url()))
            .close_delay(Duration::ZERO)
            .build()?,
    );
    let provider = Arc::new(ChromiumSessionProvider::new(Arc::clone(&config)));

    let results = SearchPipeline::new(provider, config).run("rust", None).await?;
    assert_eq!(results.count, 2);
    assert_eq!(results.results[1].url, "https://tokio.rs/");
    Ok(())
}
