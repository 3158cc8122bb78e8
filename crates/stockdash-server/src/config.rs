use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Largest row count accepted for any ranking, from config or a query string
pub const MAX_N: usize = 100;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub database: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached datasets
    pub max_capacity: u64,
    /// TTL for cached datasets in seconds
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Path to the supplementary sector CSV
    pub sector_csv: String,
    /// Rows in the green/loss tables
    pub top_n: usize,
    /// Rows in the volatility table
    pub volatile_n: usize,
    /// Series on the cumulative return chart
    pub cumulative_n: usize,
    /// Gainers/losers shown per month
    pub movers_n: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100,
            ttl_seconds: 300,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sector_csv: "data/sectorwise_data.csv".to_string(),
            top_n: 10,
            volatile_n: 10,
            cumulative_n: 5,
            movers_n: 5,
        }
    }
}

impl DashboardConfig {
    /// Every row count must be within `1..=MAX_N`, same as the `n` query parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("top_n", self.top_n),
            ("volatile_n", self.volatile_n),
            ("cumulative_n", self.cumulative_n),
            ("movers_n", self.movers_n),
        ];
        for (key, value) in counts {
            if value == 0 || value > MAX_N {
                return Err(ConfigError::Message(format!(
                    "dashboard.{} must be between 1 and {}, got {}",
                    key, MAX_N, value
                )));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "http://localhost:8123")?
            .set_default("database.database", "stock_data")?
            .set_default("cache.max_capacity", 100)?
            .set_default("cache.ttl_seconds", 300)?
            .set_default("dashboard.sector_csv", "data/sectorwise_data.csv")?
            .set_default("dashboard.top_n", 10)?
            .set_default("dashboard.volatile_n", 10)?
            .set_default("dashboard.cumulative_n", 5)?
            .set_default("dashboard.movers_n", 5)?
            // Load from config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (STOCKDASH__SERVER__PORT, STOCKDASH__DATABASE__PASSWORD, ...)
            .add_source(
                Environment::with_prefix("STOCKDASH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.dashboard.validate()?;
        Ok(config)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
            },
            database: DatabaseConfig {
                url: "http://localhost:8123".to_string(),
                database: "stock_data".to_string(),
                user: None,
                password: None,
            },
            cache: CacheConfig::default(),
            dashboard: DashboardConfig::default(),
        };

        assert_eq!(config.server_addr(), "127.0.0.1:8501");
        assert_eq!(config.dashboard.top_n, 10);
        assert_eq!(config.dashboard.movers_n, 5);
    }

    #[test]
    fn test_dashboard_counts_validated() {
        assert!(DashboardConfig::default().validate().is_ok());

        let zero = DashboardConfig {
            volatile_n: 0,
            ..DashboardConfig::default()
        };
        let err = zero.validate().unwrap_err().to_string();
        assert!(err.contains("dashboard.volatile_n"));

        let too_many = DashboardConfig {
            cumulative_n: MAX_N + 1,
            ..DashboardConfig::default()
        };
        assert!(too_many.validate().is_err());

        let edge = DashboardConfig {
            top_n: 1,
            movers_n: MAX_N,
            ..DashboardConfig::default()
        };
        assert!(edge.validate().is_ok());
    }
}
