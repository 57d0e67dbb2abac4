//! HTTP API server module
//!
//! Thin glue over the search pipeline: greeting routes, the synchronous
//! `GET /search`, the event-publishing `POST /api/search` and an SSE stream
//! of status events.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use server::HttpServer;
