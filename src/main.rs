//! Recipes API server
//!
//! CRUD and tag search over a single collection of recipes, served with Tokio
//! and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                   RECIPES API                    │
//!                    │                                                  │
//!   Client Request   │  ┌──────────┐    ┌────────────┐   ┌───────────┐  │
//!   ─────────────────┼─▶│  http    │───▶│  recipes   │──▶│   store   │  │
//!                    │  │  server  │    │  handlers  │   │  (trait)  │  │
//!                    │  └──────────┘    └────────────┘   └─────┬─────┘  │
//!                    │                                         │        │
//!                    │                     ┌──────────┬────────┴─┐      │
//!                    │                     ▼          ▼          ▼      │
//!                    │                  memory      file      sqlite    │
//!                    │                                                  │
//!                    │  Cross-cutting: config · lifecycle ·             │
//!                    │  observability · security                        │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use recipes_api::config::{load_config, validate_config, ConfigError, ServiceConfig, StorageBackend};
use recipes_api::http::HttpServer;
use recipes_api::lifecycle::{bind_listener, open_store, Shutdown};
use recipes_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "recipes-api")]
#[command(about = "HTTP API for creating, editing and searching recipes", version)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,

    /// Override storage.backend (memory, file, sqlite).
    #[arg(long)]
    backend: Option<StorageBackend>,

    /// Override storage.path.
    #[arg(long)]
    data_path: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut ServiceConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(backend) = self.backend {
            config.storage.backend = backend;
        }
        if let Some(path) = &self.data_path {
            config.storage.path = Some(path.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    args.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level)?;

    tracing::info!("recipes-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.storage.backend,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = open_store(&config.storage)?;
    let listener = bind_listener(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
