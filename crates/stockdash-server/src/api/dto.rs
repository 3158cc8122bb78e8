use serde::{Deserialize, Serialize};
use stockdash_core::{
    CorrelationMatrix, CumulativeReturnPoint, MarketSummary, MonthlyMovers, PriceMatrix,
    SectorReturn, TickerReturn, TickerVolatility,
};

use crate::config::MAX_N;
use crate::error::{AppError, AppResult};

// ============================================================================
// GET /health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub cached_datasets: u64,
}

// ============================================================================
// Shared query parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TopNQuery {
    pub n: Option<usize>,
}

impl TopNQuery {
    /// The requested `n`, or `default` when absent. Must be in `1..=MAX_N`.
    pub fn resolve(&self, default: usize) -> AppResult<usize> {
        let n = self.n.unwrap_or(default);
        if n == 0 || n > MAX_N {
            return Err(AppError::InvalidParam(format!(
                "n must be between 1 and {}, got {}",
                MAX_N, n
            )));
        }
        Ok(n)
    }
}

// ============================================================================
// GET /api/v1/returns/yearly, /api/v1/returns/top
// ============================================================================

#[derive(Debug, Serialize)]
pub struct YearlyReturnsResponse {
    pub count: usize,
    pub returns: Vec<TickerReturn>,
}

#[derive(Debug, Serialize)]
pub struct TopReturnsResponse {
    pub n: usize,
    pub gainers: Vec<TickerReturn>,
    pub losers: Vec<TickerReturn>,
}

// ============================================================================
// GET /api/v1/market/summary
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MarketSummaryResponse {
    pub ticker_count: usize,
    #[serde(flatten)]
    pub summary: MarketSummary,
}

// ============================================================================
// GET /api/v1/volatility
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VolatilityResponse {
    pub n: usize,
    pub volatility: Vec<TickerVolatility>,
}

// ============================================================================
// GET /api/v1/returns/cumulative
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CumulativeReturnsResponse {
    pub n: usize,
    pub points: Vec<CumulativeReturnPoint>,
    /// Same data, date rows by ticker columns
    pub pivot: PriceMatrix,
}

// ============================================================================
// GET /api/v1/returns/monthly
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MonthlyMoversResponse {
    pub n: usize,
    pub months: Vec<MonthlyMovers>,
}

// ============================================================================
// GET /api/v1/sectors
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SectorsResponse {
    pub source: String,
    pub sectors: Vec<SectorReturn>,
}

// ============================================================================
// GET /api/v1/correlation
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CorrelationResponse {
    /// Trading days with a return for every ticker
    pub observations: usize,
    #[serde(flatten)]
    pub matrix: CorrelationMatrix,
}

// ============================================================================
// POST /api/v1/cache/invalidate
// ============================================================================

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub invalidated: bool,
}
