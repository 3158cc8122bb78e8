//! Data models for the dashboard datasets
//!
//! Each dataset shown on the dashboard has one type here. Returns are plain
//! `f64`: fractions unless the field name ends in `_pct` or the doc says
//! percent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, DashboardResult};

// =============================================================================
// Prices
// =============================================================================

/// A single daily close for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            close,
        }
    }
}

// =============================================================================
// Yearly return & market summary
// =============================================================================

/// Return over a ticker's full date range, as a fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerReturn {
    pub ticker: String,
    pub yearly_return: f64,
}

/// First/last snapshot of a ticker used for the market summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub first_close: f64,
    pub last_close: f64,
    pub last_volume: f64,
    pub yearly_return_pct: f64,
}

impl TickerSnapshot {
    /// Whether every numeric field is a usable number.
    pub fn is_complete(&self) -> bool {
        self.first_close.is_finite()
            && self.last_close.is_finite()
            && self.last_volume.is_finite()
            && self.yearly_return_pct.is_finite()
    }
}

/// Market-wide headline metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    /// Tickers with a positive yearly return
    pub green_count: usize,
    /// Tickers with a zero or negative yearly return
    pub red_count: usize,
    /// Mean of the latest close across tickers
    pub average_price: f64,
    /// Mean of the latest volume across tickers
    pub average_volume: f64,
}

// =============================================================================
// Volatility & cumulative return
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerVolatility {
    pub ticker: String,
    pub volatility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeReturnPoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub cumulative_return: f64,
}

// =============================================================================
// Monthly movers
// =============================================================================

/// Return of one ticker within one calendar month, in percent (2 dp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub ticker: String,
    /// First day of the month
    pub month: NaiveDate,
    pub monthly_return: f64,
}

/// Best and worst performers of a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMovers {
    pub month: NaiveDate,
    /// Human label, e.g. "October 2024"
    pub label: String,
    pub gainers: Vec<MonthlyReturn>,
    pub losers: Vec<MonthlyReturn>,
}

// =============================================================================
// Sectors
// =============================================================================

/// One parsed row of the supplementary sector CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRecord {
    pub ticker: String,
    pub date: NaiveDate,
    /// `None` for a blank cell
    pub close: Option<f64>,
    pub sector: String,
}

/// Mean yearly return (percent) of the tickers in a sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorReturn {
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "AvgYearlyReturn")]
    pub avg_yearly_return: f64,
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse a date that may carry a trailing time component.
///
/// Accepts `2024-01-31`, `2024-01-31 00:00:00` and `2024-01-31T00:00:00`.
pub fn parse_date(raw: &str) -> DashboardResult<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| DashboardError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(parse_date("2024-01-31").unwrap(), expected);
        assert_eq!(parse_date("2024-01-31 00:00:00").unwrap(), expected);
        assert_eq!(parse_date(" 2024-01-31T09:15:00 ").unwrap(), expected);
        assert!(parse_date("31/01/2024").is_err());
    }

    #[test]
    fn test_snapshot_completeness() {
        let mut snapshot = TickerSnapshot {
            ticker: "TCS".to_string(),
            first_close: 100.0,
            last_close: 110.0,
            last_volume: 5000.0,
            yearly_return_pct: 10.0,
        };
        assert!(snapshot.is_complete());

        snapshot.yearly_return_pct = f64::NAN;
        assert!(!snapshot.is_complete());
    }
}
