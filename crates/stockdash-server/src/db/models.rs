use clickhouse::Row;
use serde::{Deserialize, Serialize};
use stockdash_core::{
    models::parse_date, CumulativeReturnPoint, DashboardError, MonthlyReturn, PricePoint,
    TickerReturn, TickerSnapshot, TickerVolatility,
};

/// Dates come back as `toString(date)`, i.e. `YYYY-MM-DD`.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct YearlyReturnRow {
    pub ticker: String,
    pub yearly_return: f64,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub ticker: String,
    pub first_close: f64,
    pub last_close: f64,
    pub last_volume: u64,
    pub yearly_return_pct: f64,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct VolatilityRow {
    pub ticker: String,
    pub volatility: f64,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct CumulativeReturnRow {
    pub ticker: String,
    pub date: String,
    pub cumulative_return: f64,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct MonthlyReturnRow {
    pub ticker: String,
    pub month: String,
    pub monthly_return: f64,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct ClosePriceRow {
    pub ticker: String,
    pub date: String,
    pub close: f64,
}

impl From<YearlyReturnRow> for TickerReturn {
    fn from(row: YearlyReturnRow) -> Self {
        Self {
            ticker: row.ticker,
            yearly_return: row.yearly_return,
        }
    }
}

impl From<SnapshotRow> for TickerSnapshot {
    fn from(row: SnapshotRow) -> Self {
        Self {
            ticker: row.ticker,
            first_close: row.first_close,
            last_close: row.last_close,
            last_volume: row.last_volume as f64,
            yearly_return_pct: row.yearly_return_pct,
        }
    }
}

impl From<VolatilityRow> for TickerVolatility {
    fn from(row: VolatilityRow) -> Self {
        Self {
            ticker: row.ticker,
            volatility: row.volatility,
        }
    }
}

impl TryFrom<CumulativeReturnRow> for CumulativeReturnPoint {
    type Error = DashboardError;

    fn try_from(row: CumulativeReturnRow) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_date(&row.date)?,
            ticker: row.ticker,
            cumulative_return: row.cumulative_return,
        })
    }
}

impl TryFrom<MonthlyReturnRow> for MonthlyReturn {
    type Error = DashboardError;

    fn try_from(row: MonthlyReturnRow) -> Result<Self, Self::Error> {
        Ok(Self {
            month: parse_date(&row.month)?,
            ticker: row.ticker,
            monthly_return: row.monthly_return,
        })
    }
}

impl TryFrom<ClosePriceRow> for PricePoint {
    type Error = DashboardError;

    fn try_from(row: ClosePriceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_date(&row.date)?,
            ticker: row.ticker,
            close: row.close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_row_conversion() {
        let point = PricePoint::try_from(ClosePriceRow {
            ticker: "RELIANCE".to_string(),
            date: "2024-07-01".to_string(),
            close: 3012.5,
        })
        .unwrap();
        assert_eq!(point.date.to_string(), "2024-07-01");

        let bad = PricePoint::try_from(ClosePriceRow {
            ticker: "RELIANCE".to_string(),
            date: "not-a-date".to_string(),
            close: 1.0,
        });
        assert!(bad.is_err());
    }

    #[test]
    fn test_snapshot_volume_widens() {
        let snapshot: TickerSnapshot = SnapshotRow {
            ticker: "INFY".to_string(),
            first_close: 1500.0,
            last_close: 1800.0,
            last_volume: 7_250_000,
            yearly_return_pct: 20.0,
        }
        .into();
        assert_eq!(snapshot.last_volume, 7_250_000.0);
    }
}
