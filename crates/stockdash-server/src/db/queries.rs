use clickhouse::Client;
use std::time::Instant;

use super::models::{
    ClosePriceRow, CumulativeReturnRow, MonthlyReturnRow, SnapshotRow, VolatilityRow,
    YearlyReturnRow,
};
use crate::error::AppResult;

/// Daily close-to-close returns per ticker. The first row of each ticker has no
/// previous close and is filtered out by `rn > 1`.
const DAILY_RETURNS_CTE: &str = r#"
    daily AS (
        SELECT
            ticker,
            date,
            (close - prev_close) / prev_close AS daily_return
        FROM (
            SELECT
                ticker,
                date,
                close,
                lagInFrame(close) OVER w AS prev_close,
                row_number() OVER w AS rn
            FROM stock_prices
            WINDOW w AS (PARTITION BY ticker ORDER BY date ASC
                         ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)
        )
        WHERE rn > 1 AND prev_close != 0
    )
"#;

fn log_completed(query: &str, start: Instant, row_count: usize) {
    tracing::debug!(
        query = %query,
        duration_ms = %start.elapsed().as_millis(),
        row_count = %row_count,
        "Database query completed"
    );
}

pub async fn get_yearly_returns(client: &Client) -> AppResult<Vec<YearlyReturnRow>> {
    let start = Instant::now();
    tracing::debug!(query = "get_yearly_returns", "Executing database query");

    let query = r#"
        SELECT
            ticker,
            (last_close - first_close) / first_close AS yearly_return
        FROM (
            SELECT
                ticker,
                argMin(close, date) AS first_close,
                argMax(close, date) AS last_close
            FROM stock_prices
            GROUP BY ticker
        )
        WHERE first_close != 0
    "#;

    let rows: Vec<YearlyReturnRow> = client.query(query).fetch_all().await?;

    log_completed("get_yearly_returns", start, rows.len());
    Ok(rows)
}

pub async fn get_market_snapshots(client: &Client) -> AppResult<Vec<SnapshotRow>> {
    let start = Instant::now();
    tracing::debug!(query = "get_market_snapshots", "Executing database query");

    let query = r#"
        SELECT
            ticker,
            first_close,
            last_close,
            last_volume,
            (last_close - first_close) / first_close * 100 AS yearly_return_pct
        FROM (
            SELECT
                ticker,
                argMin(close, date) AS first_close,
                argMax(close, date) AS last_close,
                toUInt64(argMax(volume, date)) AS last_volume
            FROM stock_prices
            GROUP BY ticker
        )
        WHERE first_close != 0
    "#;

    let rows: Vec<SnapshotRow> = client.query(query).fetch_all().await?;

    log_completed("get_market_snapshots", start, rows.len());
    Ok(rows)
}

/// Population standard deviation of daily returns, most volatile first.
pub async fn get_volatility(client: &Client, limit: usize) -> AppResult<Vec<VolatilityRow>> {
    let start = Instant::now();
    tracing::debug!(query = "get_volatility", limit = %limit, "Executing database query");

    let query = format!(
        r#"
        WITH {daily}
        SELECT
            ticker,
            stddevPop(daily_return) AS volatility
        FROM daily
        GROUP BY ticker
        ORDER BY volatility DESC, ticker ASC
        LIMIT ?
        "#,
        daily = DAILY_RETURNS_CTE
    );

    let rows: Vec<VolatilityRow> = client
        .query(&query)
        .bind(limit as u64)
        .fetch_all()
        .await?;

    log_completed("get_volatility", start, rows.len());
    Ok(rows)
}

/// Full cumulative return series of the `limit` best performers.
///
/// Compounding is a running sum of `log(1 + r)` exponentiated back, which
/// keeps long series from overflowing.
pub async fn get_cumulative_returns(
    client: &Client,
    limit: usize,
) -> AppResult<Vec<CumulativeReturnRow>> {
    let start = Instant::now();
    tracing::debug!(query = "get_cumulative_returns", limit = %limit, "Executing database query");

    let query = format!(
        r#"
        WITH {daily},
        cumulative AS (
            SELECT
                ticker,
                date,
                sum(log(1 + daily_return)) OVER (
                    PARTITION BY ticker ORDER BY date ASC
                    ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW
                ) AS log_cum_return
            FROM daily
        ),
        leaders AS (
            SELECT ticker
            FROM cumulative
            GROUP BY ticker
            ORDER BY max(exp(log_cum_return) - 1) DESC, ticker ASC
            LIMIT ?
        )
        SELECT
            ticker,
            toString(date) AS date,
            exp(log_cum_return) - 1 AS cumulative_return
        FROM cumulative
        WHERE ticker IN (SELECT ticker FROM leaders)
        ORDER BY ticker ASC, date ASC
        "#,
        daily = DAILY_RETURNS_CTE
    );

    let rows: Vec<CumulativeReturnRow> = client
        .query(&query)
        .bind(limit as u64)
        .fetch_all()
        .await?;

    log_completed("get_cumulative_returns", start, rows.len());
    Ok(rows)
}

/// First-to-last close return per ticker and calendar month, in percent.
pub async fn get_monthly_returns(client: &Client) -> AppResult<Vec<MonthlyReturnRow>> {
    let start = Instant::now();
    tracing::debug!(query = "get_monthly_returns", "Executing database query");

    let query = r#"
        SELECT
            ticker,
            toString(month_start) AS month,
            round((last_close - first_close) / first_close * 100, 2) AS monthly_return
        FROM (
            SELECT
                ticker,
                toStartOfMonth(date) AS month_start,
                argMin(close, date) AS first_close,
                argMax(close, date) AS last_close
            FROM stock_prices
            GROUP BY ticker, month_start
        )
        WHERE first_close != 0
        ORDER BY month_start ASC, ticker ASC
    "#;

    let rows: Vec<MonthlyReturnRow> = client.query(query).fetch_all().await?;

    log_completed("get_monthly_returns", start, rows.len());
    Ok(rows)
}

pub async fn get_close_prices(client: &Client) -> AppResult<Vec<ClosePriceRow>> {
    let start = Instant::now();
    tracing::debug!(query = "get_close_prices", "Executing database query");

    let query = r#"
        SELECT
            ticker,
            toString(date) AS date,
            close
        FROM stock_prices
        ORDER BY date ASC, ticker ASC
    "#;

    let rows: Vec<ClosePriceRow> = client.query(query).fetch_all().await?;

    log_completed("get_close_prices", start, rows.len());
    Ok(rows)
}
