mod api;
mod cache;
mod config;
mod datasets;
mod db;
mod error;
mod render;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::create_cache;
use crate::config::AppConfig;
use crate::datasets::Datasets;
use crate::db::Database;

pub use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub datasets: Datasets,
    pub db: Database,
    pub config: Arc<AppConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockdash=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    println!("================================================");
    println!("      STOCK MARKET DASHBOARD - Starting Up      ");
    println!("================================================");

    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    println!("[CONFIG] Server: {}:{}", config.server.host, config.server.port);
    println!("[CONFIG] Database: {} ({})", config.database.url, config.database.database);
    println!("[CONFIG] Sector CSV: {}", config.dashboard.sector_csv);
    println!(
        "[CONFIG] Cache: {} datasets, ttl {}s",
        config.cache.max_capacity, config.cache.ttl_seconds
    );

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting Stock Market Dashboard"
    );

    let db = Database::new(&config.database);

    match db.health_check().await {
        Ok(_) => {
            println!("[DB] ClickHouse connected successfully");
            tracing::info!("Connected to ClickHouse");
        }
        Err(e) => {
            println!("[DB] WARNING: ClickHouse not available - {}", e);
            tracing::warn!(error = %e, "ClickHouse not available, running in degraded mode");
        }
    }

    let cache = create_cache(&config.cache);
    let state = AppState {
        datasets: Datasets::new(db.clone(), cache),
        db,
        config: Arc::new(config.clone()),
    };

    let app = Router::new()
        .merge(api::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("================================================");
    println!("  Dashboard: http://{}/", addr);
    println!("  API:       http://{}/api/v1/...", addr);
    println!("================================================");
    println!();

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
