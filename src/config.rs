//! Configuration management

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file holding `daily_report` and `time_series`
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// How many countries the map selects by default
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Either a `YYYY-MM-DD` date or `latest`
    #[serde(default = "default_vaccination_date")]
    pub vaccination_date: String,
    /// Country shown first on the time series tab
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Marker area (px²) that the largest confirmed count maps to
    #[serde(default = "default_marker_reference_area")]
    pub marker_reference_area: f64,
    /// Smallest marker diameter in px
    #[serde(default = "default_marker_min_size")]
    pub marker_min_size: f64,
    /// Number of map selections kept in the response cache
    #[serde(default = "default_map_cache_size")]
    pub map_cache_size: usize,
}

fn default_top_n() -> usize {
    30
}

fn default_vaccination_date() -> String {
    "2023-03-09".to_string()
}

fn default_country() -> String {
    "Taiwan*".to_string()
}

fn default_marker_reference_area() -> f64 {
    2500.0
}

fn default_marker_min_size() -> f64 {
    2.0
}

fn default_map_cache_size() -> usize {
    64
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            vaccination_date: default_vaccination_date(),
            default_country: default_country(),
            marker_reference_area: default_marker_reference_area(),
            marker_min_size: default_marker_min_size(),
            map_cache_size: default_map_cache_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Which date the "total doses administered" label is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaccinationDate {
    Fixed(NaiveDate),
    Latest,
}

impl DashboardConfig {
    pub fn vaccination_date(&self) -> Result<VaccinationDate> {
        let raw = self.vaccination_date.trim();
        if raw.eq_ignore_ascii_case("latest") {
            return Ok(VaccinationDate::Latest);
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid vaccination_date '{}'", raw))?;
        Ok(VaccinationDate::Fixed(date))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";

        let builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.http_port", 7860)?
            .set_default("database.url", "data/covid_19.db")?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("COVID_DASHBOARD")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder.build()?;
        let config: Config = settings.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.http_port == 0 {
            anyhow::bail!("Invalid http_port: 0 is not allowed");
        }
        if self.server.host.is_empty() {
            anyhow::bail!("Server host cannot be empty");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.dashboard.top_n == 0 {
            anyhow::bail!("dashboard.top_n must be at least 1");
        }
        if !(self.dashboard.marker_reference_area > 0.0) {
            anyhow::bail!(
                "dashboard.marker_reference_area must be positive, got {}",
                self.dashboard.marker_reference_area
            );
        }
        if self.dashboard.marker_min_size < 0.0 {
            anyhow::bail!("dashboard.marker_min_size cannot be negative");
        }
        if self.dashboard.map_cache_size == 0 {
            anyhow::bail!("dashboard.map_cache_size must be at least 1");
        }
        self.dashboard.vaccination_date()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("Invalid logging level '{}'. Must be one of: {:?}", self.logging.level, valid_levels);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                http_port: 7860,
            },
            database: DatabaseConfig {
                url: "data/covid_19.db".to_string(),
            },
            dashboard: DashboardConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_port() {
        let mut config = sample();
        config.server.http_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut config = sample();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_vaccination_date_parsing() {
        let mut dashboard = DashboardConfig::default();
        assert_eq!(
            dashboard.vaccination_date().unwrap(),
            VaccinationDate::Fixed(NaiveDate::from_ymd_opt(2023, 3, 9).unwrap())
        );

        dashboard.vaccination_date = "Latest".to_string();
        assert_eq!(dashboard.vaccination_date().unwrap(), VaccinationDate::Latest);

        dashboard.vaccination_date = "09/03/2023".to_string();
        assert!(dashboard.vaccination_date().is_err());
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        std::env::set_var("COVID_DASHBOARD__DASHBOARD__TOP_N", "7");
        std::env::set_var("COVID_DASHBOARD__SERVER__HTTP_PORT", "8123");
        let loaded = Config::load();
        std::env::remove_var("COVID_DASHBOARD__DASHBOARD__TOP_N");
        std::env::remove_var("COVID_DASHBOARD__SERVER__HTTP_PORT");

        let config = loaded.unwrap();
        assert_eq!(config.dashboard.top_n, 7);
        assert_eq!(config.server.http_port, 8123);
        assert_eq!(config.dashboard.default_country, "Taiwan*");
    }

    #[test]
    fn test_rejects_zero_top_n() {
        let mut config = sample();
        config.dashboard.top_n = 0;
        assert!(config.validate().is_err());
    }
}
