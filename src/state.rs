use crate::config::Config;
use crate::dates::{self, LogicalDate};
use crate::errors::FetchError;
use crate::fetcher::{ObservationFetcher, SolvedAcFetcher};
use crate::storage::{JsonFileNamespace, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub fetcher: Arc<dyn ObservationFetcher>,
    pub day_start_hour: u32,
}

impl AppState {
    pub fn new(
        store: UserStore,
        fetcher: Arc<dyn ObservationFetcher>,
        day_start_hour: u32,
    ) -> Self {
        Self {
            store: Arc::new(store),
            fetcher,
            day_start_hour,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let store = UserStore::new(
            Box::new(JsonFileNamespace::new("synced", &config.sync_path)),
            Box::new(JsonFileNamespace::new("local", &config.local_path)),
        );
        let fetcher = SolvedAcFetcher::new(config.api_base_url.clone(), config.fetch_timeout)?;
        Ok(Self::new(store, Arc::new(fetcher), config.day_start_hour))
    }

    pub fn today(&self) -> LogicalDate {
        dates::today(self.day_start_hour)
    }
}
