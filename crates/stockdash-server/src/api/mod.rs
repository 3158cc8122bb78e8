pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Dashboard page
        .route("/", get(handlers::dashboard))
        // Health check
        .route("/health", get(handlers::health_check))
        // Dataset endpoints
        .route("/api/v1/returns/yearly", get(handlers::get_yearly_returns))
        .route("/api/v1/returns/top", get(handlers::get_top_returns))
        .route("/api/v1/returns/cumulative", get(handlers::get_cumulative_returns))
        .route("/api/v1/returns/monthly", get(handlers::get_monthly_movers))
        .route("/api/v1/market/summary", get(handlers::get_market_summary))
        .route("/api/v1/volatility", get(handlers::get_volatility))
        .route("/api/v1/sectors", get(handlers::get_sectors))
        .route("/api/v1/correlation", get(handlers::get_correlation))
        // Cache control
        .route("/api/v1/cache/invalidate", post(handlers::invalidate_cache))
}
