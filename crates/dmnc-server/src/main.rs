//! DMN Decision Central HTTP Server
//!
//! Hosts uploaded decision services behind a REST API with generated
//! OpenAPI documents and HTML pages.

use anyhow::Result;
use clap::Parser;
use dmnc_server::api::{self, AppState};
use dmnc_server::config::{LogFormat, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Command line options; each one overrides the configuration file
#[derive(Debug, Parser)]
#[command(name = "dmnc-server", version, about = "DMN Decision Central server")]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Configuration file, without or with extension
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match args.config.as_deref() {
        Some(path) => ServerConfig::load_from(path)?,
        None => ServerConfig::load()?,
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    // Initialize tracing
    init_tracing(&config)?;
    info!("Loaded configuration: {:?}", config);

    let app = api::create_router(AppState::new(&config));

    // Start server
    let addr = config.bind_address();
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("✓ Server listening on http://{}", addr);
    info!("  Catalog: http://{}/", addr);
    info!("  Health check: http://{}/health", addr);
    info!("  Upload: POST http://{}/upload", addr);
    info!("  Upload API: http://{}/upload/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(config: &ServerConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "dmnc_server={level},dmnc_runtime={level},dmnc_parser={level},tower_http=debug",
            level = config.log_level
        )
        .into()
    });

    let format = match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
