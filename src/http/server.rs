//! Axum-based HTTP server for the search API

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::AppState;
use super::routes::create_router;
use crate::config::ServerConfig;
use crate::status_events::StatusBroadcaster;
use crate::web_search::SearchPipeline;

/// HTTP API server
pub struct HttpServer {
    config: ServerConfig,
    pipeline: SearchPipeline,
    broadcaster: Arc<StatusBroadcaster>,
}

impl HttpServer {
    #[must_use]
    pub fn new(config: ServerConfig, pipeline: SearchPipeline) -> Self {
        let broadcaster = Arc::new(StatusBroadcaster::new(config.event_capacity));
        Self {
            config,
            pipeline,
            broadcaster,
        }
    }

    /// Broadcaster shared with every `POST /api/search` run
    #[must_use]
    pub fn broadcaster(&self) -> &Arc<StatusBroadcaster> {
        &self.broadcaster
    }

    /// Router with CORS and request tracing applied
    #[must_use]
    pub fn router(&self) -> Router {
        let mut app = create_router(AppState {
            pipeline: self.pipeline.clone(),
            broadcaster: Arc::clone(&self.broadcaster),
        });

        if self.config.cors_enabled {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(Any);
            app = app.layer(cors);
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Serve until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address cannot be bound or the server
    /// fails while running.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.listen_addr)
            .await
            .context("Failed to bind HTTP server")?;

        info!("Search API listening on http://{}", self.config.listen_addr);

        let broadcaster = Arc::clone(&self.broadcaster);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("HTTP server shutting down");
                broadcaster.shutdown();
            })
            .await
            .context("HTTP server error")?;

        let metrics = self.broadcaster.metrics().snapshot();
        info!(
            "Status events: {} published, {} without observers, peak {} observers",
            metrics.events_published, metrics.events_dropped, metrics.peak_subscribers
        );
        Ok(())
    }
}
