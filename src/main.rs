// Search API server
//
// Serves headless web searches over HTTP with live status events.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use headless_search::{
    ChromiumSessionProvider, HtmlSessionProvider, HttpServer, SearchConfig, SearchPipeline,
    ServerConfig, SessionProvider, utils::DEFAULT_LISTEN_ADDR,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How sessions are provisioned
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// Stealth headless Chromium, one process per search
    Chromium,
    /// Plain HTTP fetch evaluated with an HTML parser
    Html,
}

#[derive(Parser)]
#[command(name = "headless-search")]
#[command(about = "Web search API backed by a stealth headless browser")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    listen: String,

    /// Session backend
    #[arg(long, value_enum, default_value_t = Backend::Chromium)]
    backend: Backend,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Delay before closing the browser after a successful search
    #[arg(long)]
    close_delay_ms: Option<u64>,

    /// Disable permissive CORS headers
    #[arg(long)]
    no_cors: bool,
}

fn init_tracing() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        .add_directive("chromiumoxide::handler=off".parse()?)
        .add_directive("chromiumoxide::conn=off".parse()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .context("Failed to initialise tracing")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let mut builder = SearchConfig::builder().headless(!cli.headed);
    if let Some(ms) = cli.close_delay_ms {
        builder = builder.close_delay(Duration::from_millis(ms));
    }
    let config = Arc::new(builder.build()?);

    let provider: Arc<dyn SessionProvider> = match cli.backend {
        Backend::Chromium => Arc::new(ChromiumSessionProvider::new(Arc::clone(&config))),
        Backend::Html => Arc::new(HtmlSessionProvider::new(&config)?),
    };
    info!("Using {:?} session backend", cli.backend);

    let mut server_config = ServerConfig::with_listen_addr(&cli.listen)?;
    server_config.cors_enabled = !cli.no_cors;

    let server = HttpServer::new(server_config, SearchPipeline::new(provider, config));
    server.run(shutdown_signal()).await
}
