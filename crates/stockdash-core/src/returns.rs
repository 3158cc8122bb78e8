//! Return and risk calculations
//!
//! The server gets these numbers from SQL; the functions here compute the same
//! quantities in memory for CSV-sourced data and rank the rows the database
//! returns.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{
    MarketSummary, PricePoint, TickerReturn, TickerSnapshot, TickerVolatility,
};

/// `(last - first) / first`, or `None` when the ratio is undefined.
pub fn yearly_return(first_close: f64, last_close: f64) -> Option<f64> {
    if first_close == 0.0 || !first_close.is_finite() || !last_close.is_finite() {
        return None;
    }
    Some((last_close - first_close) / first_close)
}

/// Highest returns first.
pub fn top_gainers(returns: &[TickerReturn], n: usize) -> Vec<TickerReturn> {
    ranked(returns, n, |a, b| b.total_cmp(a))
}

/// Lowest returns first.
pub fn top_losers(returns: &[TickerReturn], n: usize) -> Vec<TickerReturn> {
    ranked(returns, n, |a, b| a.total_cmp(b))
}

fn ranked<F>(returns: &[TickerReturn], n: usize, order: F) -> Vec<TickerReturn>
where
    F: Fn(&f64, &f64) -> Ordering,
{
    let mut rows: Vec<TickerReturn> = returns
        .iter()
        .filter(|r| r.yearly_return.is_finite())
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        order(&a.yearly_return, &b.yearly_return).then_with(|| a.ticker.cmp(&b.ticker))
    });
    rows.truncate(n);
    rows
}

/// Headline metrics over the tickers that have complete data.
pub fn market_summary(snapshots: &[TickerSnapshot]) -> MarketSummary {
    let complete: Vec<&TickerSnapshot> = snapshots.iter().filter(|s| s.is_complete()).collect();
    if complete.is_empty() {
        return MarketSummary::default();
    }

    let green_count = complete.iter().filter(|s| s.yearly_return_pct > 0.0).count();
    let count = complete.len() as f64;

    MarketSummary {
        green_count,
        red_count: complete.len() - green_count,
        average_price: complete.iter().map(|s| s.last_close).sum::<f64>() / count,
        average_volume: complete.iter().map(|s| s.last_volume).sum::<f64>() / count,
    }
}

/// Day-over-day percentage change. Steps from a zero close are skipped.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .filter(|r| r.is_finite())
        .collect()
}

/// Population standard deviation of daily returns.
pub fn volatility(closes: &[f64]) -> Option<f64> {
    let returns = daily_returns(closes);
    if returns.is_empty() {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// Compounded return after each day, via a running sum of `ln(1 + r)`.
///
/// The output has one entry per daily return, so it is one shorter than
/// `closes`.
pub fn cumulative_returns(closes: &[f64]) -> Vec<f64> {
    let mut log_sum = 0.0;
    daily_returns(closes)
        .into_iter()
        .map(|r| {
            log_sum += (1.0 + r).ln();
            log_sum.exp() - 1.0
        })
        .collect()
}

/// Closes grouped per ticker, each series sorted by date.
pub fn closes_by_ticker(points: &[PricePoint]) -> BTreeMap<String, Vec<f64>> {
    let mut grouped: BTreeMap<String, Vec<&PricePoint>> = BTreeMap::new();
    for point in points {
        grouped.entry(point.ticker.clone()).or_default().push(point);
    }

    grouped
        .into_iter()
        .map(|(ticker, mut series)| {
            series.sort_by_key(|p| p.date);
            (ticker, series.into_iter().map(|p| p.close).collect())
        })
        .collect()
}

/// The `n` most volatile tickers, most volatile first.
pub fn most_volatile(points: &[PricePoint], n: usize) -> Vec<TickerVolatility> {
    let mut rows: Vec<TickerVolatility> = closes_by_ticker(points)
        .into_iter()
        .filter_map(|(ticker, closes)| {
            volatility(&closes).map(|volatility| TickerVolatility { ticker, volatility })
        })
        .collect();

    rows.sort_by(|a, b| b.volatility.total_cmp(&a.volatility).then_with(|| a.ticker.cmp(&b.ticker)));
    rows.truncate(n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ret(ticker: &str, value: f64) -> TickerReturn {
        TickerReturn {
            ticker: ticker.to_string(),
            yearly_return: value,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_yearly_return() {
        assert!(approx(yearly_return(100.0, 125.0).unwrap(), 0.25));
        assert!(approx(yearly_return(200.0, 150.0).unwrap(), -0.25));
        assert_eq!(yearly_return(0.0, 10.0), None);
        assert_eq!(yearly_return(f64::NAN, 10.0), None);
    }

    #[test]
    fn test_gainers_and_losers_ordering() {
        let returns = vec![
            ret("A", 0.10),
            ret("B", -0.30),
            ret("C", 0.50),
            ret("D", f64::NAN),
            ret("E", 0.0),
        ];

        let gainers = top_gainers(&returns, 2);
        assert_eq!(gainers.iter().map(|r| r.ticker.as_str()).collect::<Vec<_>>(), vec!["C", "A"]);

        let losers = top_losers(&returns, 10);
        assert_eq!(
            losers.iter().map(|r| r.ticker.as_str()).collect::<Vec<_>>(),
            vec!["B", "E", "A", "C"]
        );
    }

    #[test]
    fn test_market_summary_counts_zero_as_red() {
        let snapshot = |ticker: &str, last_close: f64, volume: f64, pct: f64| TickerSnapshot {
            ticker: ticker.to_string(),
            first_close: 100.0,
            last_close,
            last_volume: volume,
            yearly_return_pct: pct,
        };

        let summary = market_summary(&[
            snapshot("A", 110.0, 1000.0, 10.0),
            snapshot("B", 100.0, 3000.0, 0.0),
            snapshot("C", 90.0, 2000.0, -10.0),
            snapshot("D", 50.0, 10.0, f64::NAN),
        ]);

        assert_eq!(summary.green_count, 1);
        assert_eq!(summary.red_count, 2);
        assert!(approx(summary.average_price, 100.0));
        assert!(approx(summary.average_volume, 2000.0));
    }

    #[test]
    fn test_market_summary_empty() {
        assert_eq!(market_summary(&[]), MarketSummary::default());
    }

    #[test]
    fn test_volatility_is_population_std() {
        // Returns: +10%, -10%  -> mean 0, population std 0.1
        let vol = volatility(&[100.0, 110.0, 99.0]).unwrap();
        assert!(approx(vol, 0.1));
        assert_eq!(volatility(&[100.0]), None);
    }

    #[test]
    fn test_cumulative_matches_compounding() {
        let closes = [100.0, 110.0, 99.0, 120.0];
        let cumulative = cumulative_returns(&closes);
        assert_eq!(cumulative.len(), 3);
        assert!(approx(cumulative[0], 0.10));
        assert!(approx(cumulative[1], -0.01));
        assert!(approx(cumulative[2], 0.20));
    }

    #[test]
    fn test_most_volatile_orders_by_date_first() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let points = vec![
            PricePoint::new("CALM", day(2), 101.0),
            PricePoint::new("CALM", day(1), 100.0),
            PricePoint::new("CALM", day(3), 102.0),
            PricePoint::new("WILD", day(1), 100.0),
            PricePoint::new("WILD", day(2), 150.0),
            PricePoint::new("WILD", day(3), 90.0),
            PricePoint::new("ONE", day(1), 10.0),
        ];

        let ranked = most_volatile(&points, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].ticker, "WILD");
        assert_eq!(ranked[1].ticker, "CALM");
        assert!(ranked[1].volatility < 0.001);
    }
}
