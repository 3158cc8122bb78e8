//! Monthly gainers and losers

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{MonthlyMovers, MonthlyReturn};

/// Percent return over a month, rounded to two decimals.
pub fn monthly_return_pct(first_close: f64, last_close: f64) -> Option<f64> {
    if first_close == 0.0 || !first_close.is_finite() || !last_close.is_finite() {
        return None;
    }
    let pct = (last_close - first_close) / first_close * 100.0;
    Some((pct * 100.0).round() / 100.0)
}

/// "October 2024"
pub fn month_label(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}

/// Normalise any date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Top `n` gainers and losers per month, months in ascending order.
pub fn monthly_movers(rows: &[MonthlyReturn], n: usize) -> Vec<MonthlyMovers> {
    let mut by_month: BTreeMap<NaiveDate, Vec<&MonthlyReturn>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.monthly_return.is_finite()) {
        by_month.entry(month_start(row.month)).or_default().push(row);
    }

    by_month
        .into_iter()
        .map(|(month, rows)| {
            let mut gainers: Vec<MonthlyReturn> = rows.iter().map(|r| (*r).clone()).collect();
            gainers.sort_by(|a, b| {
                b.monthly_return
                    .total_cmp(&a.monthly_return)
                    .then_with(|| a.ticker.cmp(&b.ticker))
            });

            let mut losers = gainers.clone();
            losers.sort_by(|a, b| {
                a.monthly_return
                    .total_cmp(&b.monthly_return)
                    .then_with(|| a.ticker.cmp(&b.ticker))
            });

            gainers.truncate(n);
            losers.truncate(n);

            MonthlyMovers {
                month,
                label: month_label(month),
                gainers,
                losers,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ticker: &str, month: u32, value: f64) -> MonthlyReturn {
        MonthlyReturn {
            ticker: ticker.to_string(),
            month: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            monthly_return: value,
        }
    }

    #[test]
    fn test_monthly_return_rounding() {
        assert_eq!(monthly_return_pct(300.0, 301.0), Some(0.33));
        assert_eq!(monthly_return_pct(100.0, 90.0), Some(-10.0));
        assert_eq!(monthly_return_pct(0.0, 90.0), None);
    }

    #[test]
    fn test_month_label() {
        let month = NaiveDate::from_ymd_opt(2024, 10, 17).unwrap();
        assert_eq!(month_label(month_start(month)), "October 2024");
    }

    #[test]
    fn test_movers_grouped_and_ranked() {
        let rows = vec![
            row("A", 2, 5.0),
            row("B", 2, -3.0),
            row("C", 2, 12.5),
            row("A", 1, -1.0),
            row("B", 1, 2.0),
            row("X", 1, f64::NAN),
        ];

        let movers = monthly_movers(&rows, 2);
        assert_eq!(movers.len(), 2);

        assert_eq!(movers[0].label, "January 2024");
        assert_eq!(movers[0].gainers[0].ticker, "B");
        assert_eq!(movers[0].losers[0].ticker, "A");
        assert_eq!(movers[0].gainers.len(), 2);

        assert_eq!(movers[1].label, "February 2024");
        let gainers: Vec<&str> = movers[1].gainers.iter().map(|r| r.ticker.as_str()).collect();
        let losers: Vec<&str> = movers[1].losers.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(gainers, vec!["C", "A"]);
        assert_eq!(losers, vec!["B", "A"]);
    }
}
