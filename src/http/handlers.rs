//! HTTP API request handlers

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use super::types::{
    ErrorResponse, GreetingQuery, GreetingResponse, HealthResponse, SearchQuery, SearchRequest,
};
use crate::status_events::{StatusBroadcaster, StatusSink};
use crate::web_search::{SearchError, SearchPipeline, SearchResults};

/// SSE event name carrying status updates
pub const STATUS_EVENT_NAME: &str = "searchStatus";

const NAME_REQUIRED: &str = "Name query parameter is required. Use: /greetings?name=<Any name>";
const QUERY_PARAM_REQUIRED: &str =
    "Search query parameter is required. Use: /search?q=your+search+term";
const QUERY_BODY_REQUIRED: &str = "Search query is required";
const SEARCH_FAILED: &str = "Failed to perform search";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SearchPipeline,
    pub broadcaster: Arc<StatusBroadcaster>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

fn search_response(outcome: Result<SearchResults, SearchError>) -> Response {
    match outcome {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(SearchError::Validation(message)) => bad_request(&message),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_details(SEARCH_FAILED, e.to_string())),
        )
            .into_response(),
    }
}

/// `GET /greetings?name=` and `GET /?name=`
pub async fn greeting(Query(params): Query<GreetingQuery>) -> Response {
    match params.name.filter(|name| !name.is_empty()) {
        Some(name) => Json(GreetingResponse {
            message: format!("Hello {name}"),
        })
        .into_response(),
        None => bad_request(NAME_REQUIRED),
    }
}

/// `GET /search?q=`; no status events are published
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchQuery>) -> Response {
    let Some(query) = params.q.filter(|q| !q.trim().is_empty()) else {
        return bad_request(QUERY_PARAM_REQUIRED);
    };
    info!("GET /search for '{}'", query.trim());
    search_response(state.pipeline.run(&query, None).await)
}

/// `POST /api/search`; progress is broadcast to every SSE observer
pub async fn search_with_events(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected search body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_details(
                    QUERY_BODY_REQUIRED,
                    rejection.body_text(),
                )),
            )
                .into_response();
        }
    };
    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return bad_request(QUERY_BODY_REQUIRED);
    };

    info!(
        "POST /api/search for '{}' ({} observers)",
        query.trim(),
        state.broadcaster.subscriber_count()
    );
    let sink: Arc<dyn StatusSink> = state.broadcaster.clone();
    search_response(state.pipeline.run(&query, Some(sink)).await)
}

/// `GET /api/events`: live status stream, no replay of earlier events
pub async fn status_events(State(state): State<AppState>) -> impl IntoResponse {
    let receiver = state.broadcaster.subscribe();
    info!(
        "Status observer connected ({} total)",
        state.broadcaster.subscriber_count()
    );

    let events = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok::<_, Infallible>(
                Event::default().event(STATUS_EVENT_NAME).data(json),
            )),
            Err(e) => {
                warn!("Status event serialization error: {e}");
                None
            }
        },
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(n)) => {
            warn!("Status observer lagged: missed {n} events");
            Some(Ok(Event::default()
                .event("lagged")
                .data(format!(r#"{{"missed":{n}}}"#))))
        }
    });

    // End the stream on shutdown so graceful shutdown is not held open
    let broadcaster = Arc::clone(&state.broadcaster);
    let stream =
        futures::StreamExt::take_until(events, async move { broadcaster.wait_for_shutdown().await });

    Sse::new(stream).keep_alive(KeepAlive::default().interval(Duration::from_secs(15)))
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
