//! # Scanbridge Server
//!
//! Telemetry ingestion server for barcode-scanning devices.
//!
//! Devices register, heartbeat, and report scans over plain HTTP; viewers
//! subscribe to a Server-Sent Events stream and receive device snapshots
//! and scan events in real time. Persistence is optional: with
//! `DATABASE_URL` set the server keeps saved scans in PostgreSQL,
//! otherwise it runs entirely in memory.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scanbridge_core::{
    DeviceRegistry, DuplicateGuard, HttpProductAnnotator, IngestPipeline, MemoryScanRecordStore,
    PgScanRecordStore, ProductAnnotator, ScanRecordStore,
};
use scanbridge_server::infra::app_state::AppState;
use scanbridge_server::infra::config::Config;
use scanbridge_server::infra::fanout::FanoutHub;
use scanbridge_server::routes;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "scanbridge-server")]
#[command(about = "Telemetry ingestion server for barcode-scanning devices")]
struct Cli {
    /// Bind host; overrides SERVER_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port; overrides SERVER_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scanbridge_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    let config = Arc::new(config);

    let store: Arc<dyn ScanRecordStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .context("failed to connect to database")?;
            let store = PgScanRecordStore::new(pool);
            store
                .initialize_schema()
                .await
                .context("failed to initialize database schema")?;
            info!("using PostgreSQL record store");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; saved scans are kept in memory only");
            Arc::new(MemoryScanRecordStore::new())
        }
    };

    let annotator: Option<Arc<dyn ProductAnnotator>> = match &config.analyze_service_url {
        Some(url) => {
            let annotator = HttpProductAnnotator::new(url.clone(), config.analyze_timeout)
                .context("failed to build analysis client")?;
            info!(endpoint = %url, "product analysis enabled");
            Some(Arc::new(annotator))
        }
        None => {
            info!("ANALYZE_SERVICE_URL not set; analyze requests degrade");
            None
        }
    };

    let registry = Arc::new(DeviceRegistry::new());
    let hub = Arc::new(FanoutHub::new(registry.clone()));
    let pipeline = Arc::new(IngestPipeline::new(
        registry.clone(),
        store.clone(),
        hub.clone(),
        config.persist_timeout,
    ));
    let guard = Arc::new(DuplicateGuard::new(
        store.clone(),
        chrono::Duration::seconds(config.duplicate_window_secs as i64),
    ));

    let state = AppState {
        config: config.clone(),
        registry,
        hub,
        pipeline,
        guard,
        store,
        annotator,
    };

    let cors = if config.cors_allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "scanbridge server listening");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
