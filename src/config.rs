use crate::dates::DEFAULT_DAY_START_HOUR;
use crate::fetcher::DEFAULT_BASE_URL;
use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub local_path: PathBuf,
    pub sync_path: PathBuf,
    pub day_start_hour: u32,
    pub api_base_url: String,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            local_path: PathBuf::from("data/users.json"),
            sync_path: PathBuf::from("data/sync/users.json"),
            day_start_hour: DEFAULT_DAY_START_HOUR,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed("PORT").unwrap_or(defaults.port),
            local_path: env::var("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_path),
            sync_path: env::var("APP_SYNC_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.sync_path),
            day_start_hour: parsed::<u32>("DAY_START_HOUR")
                .filter(|hour| *hour < 24)
                .unwrap_or(defaults.day_start_hour),
            api_base_url: env::var("SOLVED_AC_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.api_base_url),
            fetch_timeout: parsed("FETCH_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
