//! Date x ticker matrices
//!
//! `PriceMatrix` is the pivot of long-form `(ticker, date, value)` rows into a
//! date-indexed table with one column per ticker. Missing observations stay
//! `None` rather than being filled.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{CumulativeReturnPoint, PricePoint};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceMatrix {
    /// Row index, ascending
    pub dates: Vec<NaiveDate>,
    /// Column labels, sorted
    pub tickers: Vec<String>,
    /// `values[row][col]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl PriceMatrix {
    /// Pivot long-form rows. If a (date, ticker) pair repeats, the last row wins.
    pub fn pivot<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, String, f64)>,
    {
        let mut cells: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
        let mut tickers: BTreeSet<String> = BTreeSet::new();

        for (date, ticker, value) in rows {
            tickers.insert(ticker.clone());
            cells.entry(date).or_default().insert(ticker, value);
        }

        let tickers: Vec<String> = tickers.into_iter().collect();
        let mut dates = Vec::with_capacity(cells.len());
        let mut values = Vec::with_capacity(cells.len());

        for (date, row) in cells {
            dates.push(date);
            values.push(
                tickers
                    .iter()
                    .map(|t| row.get(t).copied().filter(|v| v.is_finite()))
                    .collect(),
            );
        }

        Self {
            dates,
            tickers,
            values,
        }
    }

    pub fn from_prices(points: &[PricePoint]) -> Self {
        Self::pivot(points.iter().map(|p| (p.date, p.ticker.clone(), p.close)))
    }

    pub fn from_cumulative(points: &[CumulativeReturnPoint]) -> Self {
        Self::pivot(
            points
                .iter()
                .map(|p| (p.date, p.ticker.clone(), p.cumulative_return)),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.tickers.is_empty()
    }

    /// Column values in date order.
    pub fn column(&self, col: usize) -> Vec<Option<f64>> {
        self.values.iter().map(|row| row.get(col).copied().flatten()).collect()
    }

    /// Row-over-row percentage change per column.
    ///
    /// Gaps are padded with the column's last seen value before the change is
    /// taken, so a missing day reads as a 0 move and the next day carries the
    /// full move. The first row, leading gaps and zero previous values give
    /// `None`.
    pub fn pct_change(&self) -> Self {
        let mut last: Vec<Option<f64>> = vec![None; self.tickers.len()];
        let mut values: Vec<Vec<Option<f64>>> = Vec::with_capacity(self.values.len());

        for row in &self.values {
            let changes: Vec<Option<f64>> = row
                .iter()
                .zip(last.iter_mut())
                .map(|(cur, seen)| {
                    let prev = *seen;
                    let filled = cur.or(prev);
                    *seen = filled;
                    match (filled, prev) {
                        (Some(c), Some(p)) if p != 0.0 => Some((c - p) / p),
                        _ => None,
                    }
                })
                .collect();
            values.push(changes);
        }

        Self {
            dates: self.dates.clone(),
            tickers: self.tickers.clone(),
            values,
        }
    }

    /// Keep only rows where every column has a value.
    pub fn drop_incomplete_rows(&self) -> Self {
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for (date, row) in self.dates.iter().zip(&self.values) {
            if row.iter().all(Option::is_some) {
                dates.push(*date);
                values.push(row.clone());
            }
        }

        Self {
            dates,
            tickers: self.tickers.clone(),
            values,
        }
    }
}

/// Square, symmetric matrix of pairwise Pearson correlations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.values[i][j]
    }
}

/// Pairwise correlation of the columns of `matrix`, using rows where both
/// columns have a value.
pub fn correlation(matrix: &PriceMatrix) -> CorrelationMatrix {
    let columns: Vec<Vec<Option<f64>>> = (0..matrix.tickers.len()).map(|c| matrix.column(c)).collect();
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let pairs: Vec<(f64, f64)> = columns[i]
                .iter()
                .zip(&columns[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .collect();
            let r = pearson(&pairs);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        tickers: matrix.tickers.clone(),
        values,
    }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|v| (v - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_pivot_sorts_dates_and_tickers() {
        let m = PriceMatrix::from_prices(&[
            PricePoint::new("ZEE", day(2), 20.0),
            PricePoint::new("ABB", day(1), 10.0),
            PricePoint::new("ZEE", day(1), 19.0),
        ]);

        assert_eq!(m.dates, vec![day(1), day(2)]);
        assert_eq!(m.tickers, vec!["ABB".to_string(), "ZEE".to_string()]);
        assert_eq!(m.values[0], vec![Some(10.0), Some(19.0)]);
        assert_eq!(m.values[1], vec![None, Some(20.0)]);
    }

    #[test]
    fn test_pct_change_then_dropna() {
        let m = PriceMatrix::from_prices(&[
            PricePoint::new("A", day(1), 100.0),
            PricePoint::new("A", day(2), 110.0),
            PricePoint::new("A", day(3), 121.0),
            PricePoint::new("B", day(1), 50.0),
            PricePoint::new("B", day(3), 55.0),
        ]);

        let changes = m.pct_change();
        assert_eq!(changes.values[0], vec![None, None]);
        assert!(approx(changes.values[1][0], 0.10));
        // B has no day-2 price: padded, so day 2 is flat and day 3 takes the move
        assert!(approx(changes.values[1][1], 0.0));
        assert!(approx(changes.values[2][1], 0.10));

        let complete = changes.drop_incomplete_rows();
        assert_eq!(complete.dates, vec![day(2), day(3)]);
        assert_eq!(complete.tickers.len(), 2);
    }

    #[test]
    fn test_mid_series_gap_keeps_other_days() {
        let mut points = Vec::new();
        for (d, close) in [(1, 10.0), (2, 11.0), (3, 12.0), (4, 13.0), (5, 14.0)] {
            points.push(PricePoint::new("A", day(d), close));
        }
        for (d, close) in [(1, 20.0), (2, 22.0), (4, 24.2), (5, 26.62)] {
            points.push(PricePoint::new("B", day(d), close));
        }

        let returns = PriceMatrix::from_prices(&points)
            .pct_change()
            .drop_incomplete_rows();

        assert_eq!(returns.dates, vec![day(2), day(3), day(4), day(5)]);
        assert!(approx(returns.values[1][1], 0.0));
        assert!(approx(returns.values[2][1], 0.10));
    }

    #[test]
    fn test_leading_gap_stays_empty() {
        let m = PriceMatrix::from_prices(&[
            PricePoint::new("A", day(1), 100.0),
            PricePoint::new("A", day(2), 101.0),
            PricePoint::new("A", day(3), 102.0),
            PricePoint::new("LATE", day(2), 40.0),
            PricePoint::new("LATE", day(3), 44.0),
        ]);

        let changes = m.pct_change();
        assert_eq!(changes.values[1][1], None);
        assert!(approx(changes.values[2][1], 0.10));
        assert_eq!(changes.drop_incomplete_rows().dates, vec![day(3)]);
    }

    #[test]
    fn test_correlation_perfect_and_inverse() {
        let rows = vec![
            (day(1), "UP".to_string(), 1.0),
            (day(2), "UP".to_string(), 2.0),
            (day(3), "UP".to_string(), 3.0),
            (day(1), "DOWN".to_string(), 6.0),
            (day(2), "DOWN".to_string(), 4.0),
            (day(3), "DOWN".to_string(), 2.0),
            (day(1), "FLAT".to_string(), 5.0),
            (day(2), "FLAT".to_string(), 5.0),
            (day(3), "FLAT".to_string(), 5.0),
        ];
        let corr = correlation(&PriceMatrix::pivot(rows));

        assert!(approx(corr.get("UP", "UP"), 1.0));
        assert!(approx(corr.get("UP", "DOWN"), -1.0));
        assert!(approx(corr.get("DOWN", "UP"), -1.0));
        assert_eq!(corr.get("FLAT", "UP"), None);
        assert_eq!(corr.get("FLAT", "FLAT"), None);
    }

    #[test]
    fn test_return_correlation_of_proportional_series() {
        let mut points = Vec::new();
        let closes = [100.0, 103.0, 101.0, 106.0, 104.0];
        for (i, close) in closes.iter().enumerate() {
            points.push(PricePoint::new("A", day(i as u32 + 1), *close));
            points.push(PricePoint::new("B", day(i as u32 + 1), close * 2.0));
        }

        let returns = PriceMatrix::from_prices(&points)
            .pct_change()
            .drop_incomplete_rows();
        assert_eq!(returns.dates.len(), 4);

        let corr = correlation(&returns);
        assert!(approx(corr.get("A", "B"), 1.0));
    }
}
