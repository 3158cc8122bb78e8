use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use stockdash_core::{
    CumulativeReturnPoint, MonthlyReturn, PricePoint, SectorRecord, TickerReturn, TickerSnapshot,
    TickerVolatility,
};

use crate::config::CacheConfig;

/// One key per dataset; parameterised datasets carry their parameter.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum CacheKey {
    YearlyReturns,
    MarketSnapshots,
    Volatility { limit: usize },
    CumulativeReturns { limit: usize },
    MonthlyReturns,
    ClosePrices,
    SectorRecords { path: String },
}

/// Cached value wrapper. Datasets are shared, never copied out of the cache.
#[derive(Debug, Clone)]
pub enum CacheValue {
    YearlyReturns(Arc<Vec<TickerReturn>>),
    MarketSnapshots(Arc<Vec<TickerSnapshot>>),
    Volatility(Arc<Vec<TickerVolatility>>),
    CumulativeReturns(Arc<Vec<CumulativeReturnPoint>>),
    MonthlyReturns(Arc<Vec<MonthlyReturn>>),
    ClosePrices(Arc<Vec<PricePoint>>),
    SectorRecords(Arc<Vec<SectorRecord>>),
}

/// Dataset cache so a page load does not re-run every aggregation.
#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_seconds))
            .build();

        Self { cache }
    }

    pub async fn get_yearly_returns(&self) -> Option<Arc<Vec<TickerReturn>>> {
        match self.cache.get(&CacheKey::YearlyReturns).await {
            Some(CacheValue::YearlyReturns(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_yearly_returns(&self, data: Arc<Vec<TickerReturn>>) {
        self.cache
            .insert(CacheKey::YearlyReturns, CacheValue::YearlyReturns(data))
            .await;
    }

    pub async fn get_market_snapshots(&self) -> Option<Arc<Vec<TickerSnapshot>>> {
        match self.cache.get(&CacheKey::MarketSnapshots).await {
            Some(CacheValue::MarketSnapshots(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_market_snapshots(&self, data: Arc<Vec<TickerSnapshot>>) {
        self.cache
            .insert(CacheKey::MarketSnapshots, CacheValue::MarketSnapshots(data))
            .await;
    }

    pub async fn get_volatility(&self, limit: usize) -> Option<Arc<Vec<TickerVolatility>>> {
        match self.cache.get(&CacheKey::Volatility { limit }).await {
            Some(CacheValue::Volatility(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_volatility(&self, limit: usize, data: Arc<Vec<TickerVolatility>>) {
        self.cache
            .insert(CacheKey::Volatility { limit }, CacheValue::Volatility(data))
            .await;
    }

    pub async fn get_cumulative_returns(
        &self,
        limit: usize,
    ) -> Option<Arc<Vec<CumulativeReturnPoint>>> {
        match self.cache.get(&CacheKey::CumulativeReturns { limit }).await {
            Some(CacheValue::CumulativeReturns(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_cumulative_returns(
        &self,
        limit: usize,
        data: Arc<Vec<CumulativeReturnPoint>>,
    ) {
        self.cache
            .insert(
                CacheKey::CumulativeReturns { limit },
                CacheValue::CumulativeReturns(data),
            )
            .await;
    }

    pub async fn get_monthly_returns(&self) -> Option<Arc<Vec<MonthlyReturn>>> {
        match self.cache.get(&CacheKey::MonthlyReturns).await {
            Some(CacheValue::MonthlyReturns(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_monthly_returns(&self, data: Arc<Vec<MonthlyReturn>>) {
        self.cache
            .insert(CacheKey::MonthlyReturns, CacheValue::MonthlyReturns(data))
            .await;
    }

    pub async fn get_close_prices(&self) -> Option<Arc<Vec<PricePoint>>> {
        match self.cache.get(&CacheKey::ClosePrices).await {
            Some(CacheValue::ClosePrices(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_close_prices(&self, data: Arc<Vec<PricePoint>>) {
        self.cache
            .insert(CacheKey::ClosePrices, CacheValue::ClosePrices(data))
            .await;
    }

    pub async fn get_sector_records(&self, path: &str) -> Option<Arc<Vec<SectorRecord>>> {
        let key = CacheKey::SectorRecords {
            path: path.to_string(),
        };
        match self.cache.get(&key).await {
            Some(CacheValue::SectorRecords(data)) => Some(data),
            _ => None,
        }
    }

    pub async fn set_sector_records(&self, path: &str, data: Arc<Vec<SectorRecord>>) {
        let key = CacheKey::SectorRecords {
            path: path.to_string(),
        };
        self.cache.insert(key, CacheValue::SectorRecords(data)).await;
    }

    /// Drop every cached dataset, e.g. after new prices were loaded.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.cache.entry_count(),
            weighted_size: self.cache.weighted_size(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub entry_count: u64,
    pub weighted_size: u64,
}

/// Shared cache instance
pub type SharedCache = Arc<QueryCache>;

pub fn create_cache(config: &CacheConfig) -> SharedCache {
    Arc::new(QueryCache::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache() -> QueryCache {
        QueryCache::new(&CacheConfig {
            max_capacity: 10,
            ttl_seconds: 60,
        })
    }

    #[test]
    fn test_round_trip_and_key_separation() {
        tokio_test::block_on(async {
            let cache = test_cache();
            let data = Arc::new(vec![TickerVolatility {
                ticker: "ADANIENT".to_string(),
                volatility: 0.031,
            }]);

            cache.set_volatility(10, data.clone()).await;

            assert_eq!(cache.get_volatility(10).await.unwrap().len(), 1);
            assert!(cache.get_volatility(5).await.is_none());
            assert!(cache.get_yearly_returns().await.is_none());
        });
    }

    #[test]
    fn test_sector_records_keyed_by_path() {
        tokio_test::block_on(async {
            let cache = test_cache();
            cache.set_sector_records("a.csv", Arc::new(Vec::new())).await;

            assert!(cache.get_sector_records("a.csv").await.is_some());
            assert!(cache.get_sector_records("b.csv").await.is_none());
        });
    }

    #[test]
    fn test_invalidate_all() {
        tokio_test::block_on(async {
            let cache = test_cache();
            cache.set_monthly_returns(Arc::new(Vec::new())).await;
            cache.set_close_prices(Arc::new(Vec::new())).await;

            cache.invalidate_all().await;

            assert!(cache.get_monthly_returns().await.is_none());
            assert!(cache.get_close_prices().await.is_none());
        });
    }
}
