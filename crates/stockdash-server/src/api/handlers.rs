use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use stockdash_core::{
    matrix::{correlation, PriceMatrix},
    monthly::monthly_movers,
    returns::{market_summary, top_gainers, top_losers},
    sector::sector_performance,
    CorrelationMatrix, PricePoint,
};

use super::dto::*;
use crate::error::{AppError, AppResult};
use crate::render::{render_dashboard, DashboardView, Ranked};
use crate::AppState;

/// Pivot, pct-change, drop incomplete days, correlate. Runs on the blocking
/// pool since the price history can be large.
async fn compute_correlation(prices: Arc<Vec<PricePoint>>) -> AppResult<(CorrelationMatrix, usize)> {
    tokio::task::spawn_blocking(move || {
        let returns = PriceMatrix::from_prices(&prices)
            .pct_change()
            .drop_incomplete_rows();
        (correlation(&returns), returns.dates.len())
    })
    .await
    .map_err(|e| AppError::Internal(format!("correlation task failed: {}", e)))
}

pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let start = Instant::now();
    tracing::info!("Processing health check request");

    let db_status = match state.db.health_check().await {
        Ok(_) => {
            tracing::debug!("Database health check passed");
            "connected"
        }
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status.to_string(),
        cached_datasets: state.datasets.cache().stats().entry_count,
    };

    tracing::info!(
        duration_ms = %start.elapsed().as_millis(),
        db_status = %db_status,
        "Health check completed"
    );

    Ok(Json(response))
}

pub async fn get_yearly_returns(
    State(state): State<AppState>,
) -> AppResult<Json<YearlyReturnsResponse>> {
    let start = Instant::now();
    let returns = state.datasets.yearly_returns().await?;

    tracing::info!(
        duration_ms = %start.elapsed().as_millis(),
        ticker_count = %returns.len(),
        "Yearly returns retrieved"
    );

    Ok(Json(YearlyReturnsResponse {
        count: returns.len(),
        returns: returns.as_ref().clone(),
    }))
}

pub async fn get_top_returns(
    State(state): State<AppState>,
    Query(query): Query<TopNQuery>,
) -> AppResult<Json<TopReturnsResponse>> {
    let start = Instant::now();
    let n = query.resolve(state.config.dashboard.top_n)?;
    let returns = state.datasets.yearly_returns().await?;

    let response = TopReturnsResponse {
        n,
        gainers: top_gainers(&returns, n),
        losers: top_losers(&returns, n),
    };

    tracing::info!(
        n = %n,
        duration_ms = %start.elapsed().as_millis(),
        "Top gainers and losers retrieved"
    );

    Ok(Json(response))
}

pub async fn get_market_summary(
    State(state): State<AppState>,
) -> AppResult<Json<MarketSummaryResponse>> {
    let start = Instant::now();
    let snapshots = state.datasets.market_snapshots().await?;
    let summary = market_summary(&snapshots);

    tracing::info!(
        duration_ms = %start.elapsed().as_millis(),
        green = %summary.green_count,
        red = %summary.red_count,
        "Market summary computed"
    );

    Ok(Json(MarketSummaryResponse {
        ticker_count: summary.green_count + summary.red_count,
        summary,
    }))
}

pub async fn get_volatility(
    State(state): State<AppState>,
    Query(query): Query<TopNQuery>,
) -> AppResult<Json<VolatilityResponse>> {
    let start = Instant::now();
    let n = query.resolve(state.config.dashboard.volatile_n)?;
    let rows = state.datasets.volatility(n).await?;

    tracing::info!(
        n = %n,
        duration_ms = %start.elapsed().as_millis(),
        "Volatility ranking retrieved"
    );

    Ok(Json(VolatilityResponse {
        n,
        volatility: rows.as_ref().clone(),
    }))
}

pub async fn get_cumulative_returns(
    State(state): State<AppState>,
    Query(query): Query<TopNQuery>,
) -> AppResult<Json<CumulativeReturnsResponse>> {
    let start = Instant::now();
    let n = query.resolve(state.config.dashboard.cumulative_n)?;
    let points = state.datasets.cumulative_returns(n).await?;

    tracing::info!(
        n = %n,
        duration_ms = %start.elapsed().as_millis(),
        point_count = %points.len(),
        "Cumulative returns retrieved"
    );

    Ok(Json(CumulativeReturnsResponse {
        n,
        pivot: PriceMatrix::from_cumulative(&points),
        points: points.as_ref().clone(),
    }))
}

pub async fn get_monthly_movers(
    State(state): State<AppState>,
    Query(query): Query<TopNQuery>,
) -> AppResult<Json<MonthlyMoversResponse>> {
    let start = Instant::now();
    let n = query.resolve(state.config.dashboard.movers_n)?;
    let rows = state.datasets.monthly_returns().await?;
    let months = monthly_movers(&rows, n);

    tracing::info!(
        n = %n,
        duration_ms = %start.elapsed().as_millis(),
        month_count = %months.len(),
        "Monthly movers computed"
    );

    Ok(Json(MonthlyMoversResponse { n, months }))
}

pub async fn get_sectors(State(state): State<AppState>) -> AppResult<Json<SectorsResponse>> {
    let start = Instant::now();
    let source = state.config.dashboard.sector_csv.clone();
    let records = state.datasets.sector_records(&source).await?;
    let sectors = sector_performance(&records);

    tracing::info!(
        duration_ms = %start.elapsed().as_millis(),
        sector_count = %sectors.len(),
        "Sector performance computed"
    );

    Ok(Json(SectorsResponse { source, sectors }))
}

pub async fn get_correlation(
    State(state): State<AppState>,
) -> AppResult<Json<CorrelationResponse>> {
    let start = Instant::now();
    let prices = state.datasets.close_prices().await?;
    let (matrix, observations) = compute_correlation(prices).await?;

    tracing::info!(
        duration_ms = %start.elapsed().as_millis(),
        ticker_count = %matrix.tickers.len(),
        observations = %observations,
        "Correlation matrix computed"
    );

    Ok(Json(CorrelationResponse {
        observations,
        matrix,
    }))
}

pub async fn invalidate_cache(State(state): State<AppState>) -> Json<InvalidateResponse> {
    state.datasets.cache().invalidate_all().await;
    tracing::info!("Dataset cache invalidated");
    Json(InvalidateResponse { invalidated: true })
}

fn section<T>(result: AppResult<T>, name: &str) -> Result<T, String> {
    result.map_err(|e| {
        tracing::warn!(section = %name, error = %e, "Dashboard section unavailable");
        e.to_string()
    })
}

/// The full HTML dashboard. Datasets load concurrently and each section
/// degrades on its own.
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let start = Instant::now();
    let settings = &state.config.dashboard;
    let datasets = &state.datasets;

    let (yearly, snapshots, volatility, cumulative, monthly, prices, sector_records) = futures::join!(
        datasets.yearly_returns(),
        datasets.market_snapshots(),
        datasets.volatility(settings.volatile_n),
        datasets.cumulative_returns(settings.cumulative_n),
        datasets.monthly_returns(),
        datasets.close_prices(),
        datasets.sector_records(&settings.sector_csv),
    );

    let correlation = match prices {
        Ok(prices) => compute_correlation(prices).await.map(|(matrix, _)| matrix),
        Err(e) => Err(e),
    };

    let view = DashboardView {
        ranked: section(
            yearly.map(|r| Ranked {
                gainers: top_gainers(&r, settings.top_n),
                losers: top_losers(&r, settings.top_n),
            }),
            "yearly_returns",
        ),
        summary: section(snapshots.map(|s| market_summary(&s)), "market_summary"),
        volatility: section(volatility.map(|v| v.as_ref().clone()), "volatility"),
        cumulative: section(
            cumulative.map(|c| PriceMatrix::from_cumulative(&c)),
            "cumulative_returns",
        ),
        sectors: section(sector_records.map(|r| sector_performance(&r)), "sectors"),
        correlation: section(correlation, "correlation"),
        movers: section(
            monthly.map(|m| monthly_movers(&m, settings.movers_n)),
            "monthly_movers",
        ),
        top_n: settings.top_n,
        cumulative_n: settings.cumulative_n,
        movers_n: settings.movers_n,
    };

    let html = render_dashboard(&view);

    tracing::info!(
        duration_ms = %start.elapsed().as_millis(),
        bytes = %html.len(),
        "Dashboard rendered"
    );

    Html(html)
}
