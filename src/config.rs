//! Runtime configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `BONDWATCH_*` environment variables. CLI flags are applied last by the
//! binary.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::scheduler::Schedule;
use crate::scraping::Columns;

pub const DEFAULT_SOURCE_URL: &str = "https://uainvest.com.ua/ukrbonds?broker=sense";
pub const DEFAULT_WATCH_LIST: &[&str] = &["UA4000234223", "UA4000207518"];
pub const DEFAULT_PORT: u16 = 3000;

const CONFIG_ENV: &str = "BONDWATCH_CONFIG";
const DB_ENV: &str = "BONDWATCH_DB";
const URL_ENV: &str = "BONDWATCH_URL";
const PORT_ENV: &str = "BONDWATCH_PORT";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source_url: String,
    pub watch_list: Vec<String>,
    pub database_path: Option<PathBuf>,
    pub listen_port: u16,
    pub request_timeout_secs: u64,
    pub schedule: ScheduleConfig,
    pub columns: Columns,
}

/// Either `every_secs` or `cron`, never both
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    pub every_secs: Option<u64>,
    pub cron: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            watch_list: DEFAULT_WATCH_LIST.iter().map(|s| s.to_string()).collect(),
            database_path: None,
            listen_port: DEFAULT_PORT,
            request_timeout_secs: 30,
            schedule: ScheduleConfig::default(),
            columns: Columns::default(),
        }
    }
}

impl Config {
    /// Load configuration from `explicit`, `$BONDWATCH_CONFIG`, or the
    /// per-user config file, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::locate_file(explicit) {
            Some(path) => {
                debug!("Loading configuration from {:?}", path);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {:?}", path))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Invalid config file {:?}", path))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ScrapeError::Config(e.message().to_string()))?;
        Ok(config)
    }

    fn locate_file(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dir_spec::config_home()
            .map(|dir| dir.join("bondwatch").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Apply `BONDWATCH_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(DB_ENV).filter(|v| !v.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(db));
        }
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.source_url = url;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.listen_port = port.trim().parse().map_err(|_| {
                ScrapeError::Config(format!("{} is not a valid port: {}", PORT_ENV, port))
            })?;
        }
        Ok(())
    }

    fn validate(&self) {
        if self.watch_list.is_empty() {
            warn!("Watch-list is empty; scrape cycles will store nothing");
        }
    }

    /// Configured database path, or ~/.bondwatch/data.db
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => crate::db::get_default_db_path(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Scrape cadence; every 60 seconds unless configured
    pub fn schedule(&self) -> Result<Schedule> {
        match (&self.schedule.every_secs, &self.schedule.cron) {
            (Some(_), Some(_)) => Err(ScrapeError::Config(
                "schedule accepts either every_secs or cron, not both".to_string(),
            )
            .into()),
            (Some(0), None) => {
                Err(ScrapeError::Config("schedule.every_secs must be positive".to_string()).into())
            }
            (Some(secs), None) => Ok(Schedule::Every(Duration::from_secs(*secs))),
            (None, Some(expr)) => Ok(Schedule::Cron(expr.clone())),
            (None, None) => Ok(Schedule::Every(Duration::from_secs(60))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::ColumnRef;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_sense_listing() {
        let config = Config::default();
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.watch_list, vec!["UA4000234223", "UA4000207518"]);
        assert_eq!(config.listen_port, 3000);
        assert_eq!(config.columns.isin, ColumnRef::Index(1));
        assert_eq!(config.columns.price, ColumnRef::Index(5));
        assert_eq!(
            config.schedule().unwrap(),
            Schedule::Every(Duration::from_secs(60))
        );
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = Config::from_toml_str(
            r#"
            watch_list = ["UA4000999999"]
            listen_port = 8080

            [schedule]
            cron = "0 0 16 * * *"

            [columns]
            isin = "ISIN"
            price = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.watch_list, vec!["UA4000999999"]);
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.columns.isin, ColumnRef::Header("ISIN".to_string()));
        assert_eq!(config.columns.price, ColumnRef::Index(6));
        assert_eq!(
            config.schedule().unwrap(),
            Schedule::Cron("0 0 16 * * *".to_string())
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("watchlist = []").unwrap_err();
        assert!(err.downcast_ref::<ScrapeError>().is_some());
    }

    #[test]
    fn both_schedule_kinds_is_an_error() {
        let config = Config::from_toml_str(
            r#"
            [schedule]
            every_secs = 60
            cron = "0 * * * * *"
            "#,
        )
        .unwrap();
        assert!(config.schedule().is_err());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("BONDWATCH_DB", "/tmp/bonds.db"),
            ("BONDWATCH_PORT", "4000"),
            ("BONDWATCH_URL", "http://127.0.0.1:9/ukrbonds"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/bonds.db"));
        assert_eq!(config.listen_port, 4000);
        assert_eq!(config.source_url, "http://127.0.0.1:9/ukrbonds");
    }

    #[test]
    fn invalid_port_in_env_fails() {
        let mut config = Config::default();
        let result = config.apply_env(|key| (key == "BONDWATCH_PORT").then(|| "abc".to_string()));
        assert!(result.is_err());
    }
}
