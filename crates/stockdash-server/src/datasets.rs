//! Cached access to every dataset the dashboard shows.
//!
//! Each accessor checks the cache, falls back to the database (or the sector
//! CSV), converts rows into core models and caches the result. Errors are
//! never cached.

use std::sync::Arc;
use std::time::Instant;

use stockdash_core::{
    sector, CumulativeReturnPoint, DashboardResult, MonthlyReturn, PricePoint, SectorRecord,
    TickerReturn, TickerSnapshot, TickerVolatility,
};

use crate::cache::SharedCache;
use crate::db::{queries, Database};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct Datasets {
    db: Database,
    cache: SharedCache,
}

impl Datasets {
    pub fn new(db: Database, cache: SharedCache) -> Self {
        Self { db, cache }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub async fn yearly_returns(&self) -> AppResult<Arc<Vec<TickerReturn>>> {
        if let Some(cached) = self.cache.get_yearly_returns().await {
            tracing::debug!(dataset = "yearly_returns", "Cache hit");
            return Ok(cached);
        }

        let rows = queries::get_yearly_returns(self.db.client()).await?;
        let data: Arc<Vec<TickerReturn>> = Arc::new(rows.into_iter().map(Into::into).collect());
        self.cache.set_yearly_returns(data.clone()).await;
        Ok(data)
    }

    pub async fn market_snapshots(&self) -> AppResult<Arc<Vec<TickerSnapshot>>> {
        if let Some(cached) = self.cache.get_market_snapshots().await {
            tracing::debug!(dataset = "market_snapshots", "Cache hit");
            return Ok(cached);
        }

        let rows = queries::get_market_snapshots(self.db.client()).await?;
        let data: Arc<Vec<TickerSnapshot>> = Arc::new(rows.into_iter().map(Into::into).collect());
        self.cache.set_market_snapshots(data.clone()).await;
        Ok(data)
    }

    pub async fn volatility(&self, limit: usize) -> AppResult<Arc<Vec<TickerVolatility>>> {
        if let Some(cached) = self.cache.get_volatility(limit).await {
            tracing::debug!(dataset = "volatility", limit = %limit, "Cache hit");
            return Ok(cached);
        }

        let rows = queries::get_volatility(self.db.client(), limit).await?;
        let data: Arc<Vec<TickerVolatility>> = Arc::new(rows.into_iter().map(Into::into).collect());
        self.cache.set_volatility(limit, data.clone()).await;
        Ok(data)
    }

    pub async fn cumulative_returns(
        &self,
        limit: usize,
    ) -> AppResult<Arc<Vec<CumulativeReturnPoint>>> {
        if let Some(cached) = self.cache.get_cumulative_returns(limit).await {
            tracing::debug!(dataset = "cumulative_returns", limit = %limit, "Cache hit");
            return Ok(cached);
        }

        let rows = queries::get_cumulative_returns(self.db.client(), limit).await?;
        let points = rows
            .into_iter()
            .map(CumulativeReturnPoint::try_from)
            .collect::<DashboardResult<Vec<_>>>()?;
        let data = Arc::new(points);
        self.cache.set_cumulative_returns(limit, data.clone()).await;
        Ok(data)
    }

    pub async fn monthly_returns(&self) -> AppResult<Arc<Vec<MonthlyReturn>>> {
        if let Some(cached) = self.cache.get_monthly_returns().await {
            tracing::debug!(dataset = "monthly_returns", "Cache hit");
            return Ok(cached);
        }

        let rows = queries::get_monthly_returns(self.db.client()).await?;
        let months = rows
            .into_iter()
            .map(MonthlyReturn::try_from)
            .collect::<DashboardResult<Vec<_>>>()?;
        let data = Arc::new(months);
        self.cache.set_monthly_returns(data.clone()).await;
        Ok(data)
    }

    pub async fn close_prices(&self) -> AppResult<Arc<Vec<PricePoint>>> {
        if let Some(cached) = self.cache.get_close_prices().await {
            tracing::debug!(dataset = "close_prices", "Cache hit");
            return Ok(cached);
        }

        let rows = queries::get_close_prices(self.db.client()).await?;
        let points = rows
            .into_iter()
            .map(PricePoint::try_from)
            .collect::<DashboardResult<Vec<_>>>()?;
        let data = Arc::new(points);
        self.cache.set_close_prices(data.clone()).await;
        Ok(data)
    }

    /// Sector CSV rows. File reading and parsing run on the blocking pool.
    pub async fn sector_records(&self, path: &str) -> AppResult<Arc<Vec<SectorRecord>>> {
        if let Some(cached) = self.cache.get_sector_records(path).await {
            tracing::debug!(dataset = "sector_records", path = %path, "Cache hit");
            return Ok(cached);
        }

        let start = Instant::now();
        let owned_path = path.to_string();
        let records = tokio::task::spawn_blocking(move || sector::load_sector_csv(owned_path))
            .await
            .map_err(|e| AppError::Internal(format!("sector CSV task failed: {}", e)))??;

        tracing::debug!(
            path = %path,
            duration_ms = %start.elapsed().as_millis(),
            row_count = %records.len(),
            "Sector CSV loaded"
        );

        let data = Arc::new(records);
        self.cache.set_sector_records(path, data.clone()).await;
        Ok(data)
    }
}
