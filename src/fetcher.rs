//! Client for the solved.ac "grass" endpoint, which reports solves per day.

use crate::dates::{LogicalDate, day_diff};
use crate::errors::FetchError;
use crate::models::{HistoryEntry, Observation};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://solved.ac";
const GRASS_PATH: &str = "/api/v3/user/grass";

#[async_trait]
pub trait ObservationFetcher: Send + Sync {
    /// Never fails: a broken fetch comes back as `Observation::failed`.
    async fn fetch(&self, handle: &str, as_of: LogicalDate) -> Observation;
}

pub struct SolvedAcFetcher {
    client: Client,
    base_url: String,
}

impl SolvedAcFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_grass(&self, handle: &str) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(format!("{}{GRASS_PATH}", self.base_url))
            .query(&[("handle", handle), ("topic", "default")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(FetchError::Decode)
    }
}

#[async_trait]
impl ObservationFetcher for SolvedAcFetcher {
    async fn fetch(&self, handle: &str, as_of: LogicalDate) -> Observation {
        match self.fetch_grass(handle).await {
            Ok(body) => {
                let observation = observation_from_response(&body, as_of);
                debug!(
                    handle,
                    today_count = observation.today_count,
                    entries = observation.history.len(),
                    "fetched grass"
                );
                observation
            }
            Err(err) => {
                warn!(handle, "grass fetch failed: {err}");
                Observation::failed(as_of)
            }
        }
    }
}

/// Derives an observation from a grass response body. Missing or odd
/// fields are read permissively; only a body without any `grass` array
/// leaves the streak hint unset.
pub fn observation_from_response(body: &Value, as_of: LogicalDate) -> Observation {
    let Some(entries) = body.get("grass").and_then(Value::as_array) else {
        return Observation {
            history: Vec::new(),
            today_count: 0,
            last_solved_date: None,
            reverse_streak_hint: None,
            as_of,
        };
    };

    let history: Vec<HistoryEntry> = entries.iter().filter_map(parse_entry).collect();

    let today_count = history
        .iter()
        .find(|entry| entry.date == as_of)
        .map(|entry| entry.solved_count)
        .unwrap_or(0);

    let last_solved_date = history
        .iter()
        .filter(|entry| entry.date <= as_of && entry.solved_count > 0)
        .map(|entry| entry.date)
        .max();

    let reverse_streak_hint = if today_count > 0 {
        0
    } else {
        last_solved_date
            .map(|date| u32::try_from(day_diff(as_of, date).max(1)).unwrap_or(u32::MAX))
            .unwrap_or(1)
    };

    Observation {
        history,
        today_count: i64::from(today_count),
        last_solved_date,
        reverse_streak_hint: Some(reverse_streak_hint),
        as_of,
    }
}

fn parse_entry(entry: &Value) -> Option<HistoryEntry> {
    let date = entry.get("date")?.as_str()?.parse().ok()?;
    Some(HistoryEntry {
        date,
        solved_count: coerce_count(entry.get("value")),
    })
}

pub(crate) fn coerce_count(value: Option<&Value>) -> u32 {
    let count = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    u32::try_from(count).unwrap_or(u32::MAX)
}
