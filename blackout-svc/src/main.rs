//! blackout-svc - interruption resolution service
//!
//! Serves address search, interruption listing and per-building resolution
//! over a read-only registry database, with optional weather enrichment and
//! an optional external duration estimator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use blackout_common::config::{TomlConfig, CONFIG_ENV_VAR};
use blackout_svc::services::{estimator, ResolutionOrchestrator, SqliteWeatherStore};
use blackout_svc::{build_router, cors_layer, db, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for blackout-svc
///
/// Each flag overrides the matching config file value.
#[derive(Parser, Debug)]
#[command(name = "blackout-svc")]
#[command(about = "Utility interruption resolution service")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "BLACKOUT_PORT")]
    port: Option<u16>,

    /// Registry database (buildings, streets, interruptions)
    #[arg(long, env = "BLACKOUT_DATABASE")]
    database: Option<PathBuf>,

    /// Weather history database
    #[arg(long, env = "BLACKOUT_WEATHER_DATABASE")]
    weather_database: Option<PathBuf>,

    /// Duration estimator endpoint
    #[arg(long, env = "BLACKOUT_ESTIMATOR_URL")]
    estimator_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if let Some(weather_database) = args.weather_database {
        config.weather_database_path = Some(weather_database);
    }
    if let Some(url) = args.estimator_url {
        config.estimator.url = Some(url);
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting blackout-svc v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Database path: {}", config.database_path.display());
    let pool = match db::connect_readonly(&config.database_path).await {
        Ok(pool) => {
            info!("Connected to registry database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    let estimator_timeout = Duration::from_millis(config.estimator.timeout_ms);
    let estimator =
        estimator::from_config(&config.estimator).context("Failed to build estimator client")?;

    let mut orchestrator = ResolutionOrchestrator::new(
        pool.clone(),
        estimator,
        &config.resolution,
        estimator_timeout,
    );

    match &config.weather_database_path {
        Some(path) => {
            let weather_pool = db::connect_readonly(path)
                .await
                .context("Failed to open weather database")?;
            info!("Weather database: {}", path.display());
            orchestrator = orchestrator.with_weather(Arc::new(SqliteWeatherStore::new(weather_pool)));
        }
        None => info!("No weather database configured; predictions run without weather"),
    }

    let state = AppState::new(pool, Arc::new(orchestrator));
    let mut app = build_router(state);
    if let Some(origin) = &config.cors_origin {
        app = app.layer(cors_layer(origin)?);
        info!("CORS origin: {}", origin);
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("blackout-svc listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
