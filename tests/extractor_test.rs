mod common;

use std::sync::Arc;

use common::{StubProvider, organic, test_config};
use headless_search::web_search::{RawMatch, extract, normalize};
use headless_search::{
    CapPolicy, HtmlSession, SearchPipeline, SearchSession, SessionProvider, StaticHtmlProvider,
};

const RESULTS_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <div id="search">
    <div data-ved="a1">
      <a href="https://en.wikipedia.org/wiki/Large_language_model"><h3 class="LC20lb">Large language model</h3></a>
    </div>
    <div data-ved="a2">
      <a href="/url?q=https://www.coursera.org/learn/llms&amp;sa=U"><h3 class="LC20lb">Learn LLMs on Coursera</h3></a>
    </div>
    <div data-ved="a3">
      <a href="https://github.com/mlabonne/llm-course"><h3 class="LC20lb"> LLM Course </h3></a>
    </div>
    <div data-ved="a4">
      <a href="https://www.google.com/search?q=Learn+LLMs&amp;tbm=isch"><h3>Images for Learn LLMs</h3></a>
    </div>
  </div>
</body></html>"#;

#[tokio::test]
async fn test_primary_strategy_returns_results_in_document_order() {
    let provider = Arc::new(StaticHtmlProvider::new(
        "https://www.google.com/search?q=Learn%20LLMs&hl=en",
        RESULTS_PAGE,
    ));
    let pipeline = SearchPipeline::new(provider, Arc::new(test_config()));

    let results = pipeline.run("Learn LLMs", None).await.expect("search succeeds");

    assert_eq!(results.count, 3);
    let titles: Vec<&str> = results.results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Large language model", "Learn LLMs on Coursera", "LLM Course"]
    );
    assert_eq!(results.results[1].url, "https://www.coursera.org/learn/llms");
    assert!(results.results.iter().all(|r| !r.url.contains("google.com")));
}

#[tokio::test]
async fn test_later_strategies_skipped_once_one_matches() {
    let stub = StubProvider::new()
        .with_matches("div[data-ved] h3", vec![organic("Rust", "https://rust-lang.org/")])
        .with_matches("h3[class]", vec![organic("Never", "https://never.example/")]);
    let recorder = stub.recorder();
    let provider = stub.into_provider();
    let config = test_config();

    let mut session = provider.acquire().await.expect("stub session");
    let results = extract(session.as_mut(), &config).await.expect("extracts");

    assert_eq!(results.len(), 1);
    assert_eq!(recorder.queried(), vec!["div[data-ved] h3".to_string()]);
}

#[tokio::test]
async fn test_strategies_tried_in_priority_order() {
    let stub = StubProvider::new().with_matches(
        "div > div > div > div > div > div > div > div h3",
        vec![organic("Deep", "https://deep.example/")],
    );
    let recorder = stub.recorder();
    let provider = stub.into_provider();

    let mut session = provider.acquire().await.expect("stub session");
    let results = extract(session.as_mut(), &test_config()).await.expect("extracts");

    assert_eq!(results[0].title, "Deep");
    assert_eq!(
        recorder.queried(),
        vec![
            "div[data-ved] h3",
            "h3[class]",
            r#"[role="heading"][aria-level="3"]"#,
            "div > div > div > div > div > div > div > div h3",
        ]
    );
}

#[tokio::test]
async fn test_winning_strategy_may_filter_down_to_nothing() {
    // Strategy 1 matched, so strategy 2 is not consulted even though every
    // match is noise.
    let stub = StubProvider::new()
        .with_matches(
            "div[data-ved] h3",
            vec![
                RawMatch::new("People also ask", None),
                organic("Maps", "https://maps.google.com/"),
            ],
        )
        .with_matches("h3[class]", vec![organic("Rust", "https://rust-lang.org/")]);
    let recorder = stub.recorder();
    let provider = stub.into_provider();

    let mut session = provider.acquire().await.expect("stub session");
    let results = extract(session.as_mut(), &test_config()).await.expect("extracts");

    assert!(results.is_empty());
    assert_eq!(recorder.queried().len(), 1);
}

#[tokio::test]
async fn test_cap_is_ten_results() {
    let many: String = (0..15)
        .map(|i| format!(r#"<div data-ved="{i}"><a href="https://site{i}.dev/"><h3>Result {i}</h3></a></div>"#))
        .collect();
    let mut session = HtmlSession::from_document(
        "https://www.google.com/search?q=x",
        format!("<html><body>{many}</body></html>"),
    )
    .expect("fixture session");

    let results = extract(&mut session, &test_config()).await.expect("extracts");
    assert_eq!(results.len(), 10);
    assert_eq!(results[9].title, "Result 9");
    session.close().await.expect("close");
}

#[tokio::test]
async fn test_role_heading_strategy_resolves_enclosing_link() {
    let page = r#"<html><body>
        <a href="https://docs.rs/tokio"><div role="heading" aria-level="3">tokio - Rust</div></a>
    </body></html>"#;
    let mut session =
        HtmlSession::from_document("https://www.google.com/search?q=tokio", page).expect("fixture");

    let results = extract(&mut session, &test_config()).await.expect("extracts");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "https://docs.rs/tokio");
}

#[tokio::test]
async fn test_redirect_links_agree_across_backends() {
    let page = r#"<html><body>
        <div data-ved="1"><a href="/url?q=https://www.coursera.org/learn/llms&amp;sa=U"><h3>Coursera</h3></a></div>
    </body></html>"#;
    let mut session =
        HtmlSession::from_document("https://www.google.com/search?q=llms", page).expect("fixture");
    let from_html = normalize(
        session.query_matches("div[data-ved] h3").await.expect("query succeeds"),
        "google.com",
        10,
        CapPolicy::SliceThenFilter,
    );

    // What `HTMLAnchorElement.href` reports for the same anchor in a browser
    let from_dom = normalize(
        vec![RawMatch::new(
            "Coursera",
            Some("https://www.google.com/url?q=https://www.coursera.org/learn/llms&sa=U".into()),
        )],
        "google.com",
        10,
        CapPolicy::SliceThenFilter,
    );

    assert_eq!(from_html.len(), 1);
    assert_eq!(from_html[0].url, "https://www.coursera.org/learn/llms");
    assert_eq!(from_html, from_dom);
}
