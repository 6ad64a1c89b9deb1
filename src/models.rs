use crate::dates::LogicalDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GROUP: &str = "Default";

/// Persisted state of one tracked handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub handle: String,
    /// Empty means no alias.
    #[serde(default)]
    pub alias: String,
    #[serde(default = "default_group")]
    pub group: String,
    #[serde(default)]
    pub today_count: u32,
    /// 0 when solved today, otherwise the number of missed days including today.
    #[serde(default)]
    pub reverse_streak: u32,
    #[serde(default)]
    pub last_solved_date: Option<LogicalDate>,
    #[serde(default)]
    pub last_checked_date: Option<LogicalDate>,
}

impl UserRecord {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            alias: String::new(),
            group: default_group(),
            today_count: 0,
            reverse_streak: 0,
            last_solved_date: None,
            last_checked_date: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias: String = alias.into();
        self.alias = alias.trim().to_string();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        let group: String = group.into();
        self.group = normalize_group(&group);
        self
    }
}

pub fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

pub fn normalize_group(group: &str) -> String {
    let group = group.trim();
    if group.is_empty() || group.eq_ignore_ascii_case(DEFAULT_GROUP) {
        default_group()
    } else {
        group.to_string()
    }
}

/// One day of the solve history as reported by the statistics source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub date: LogicalDate,
    pub solved_count: u32,
}

/// What a single fetch saw for one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub history: Vec<HistoryEntry>,
    /// `ERROR_COUNT` marks a failed fetch.
    pub today_count: i64,
    pub last_solved_date: Option<LogicalDate>,
    pub reverse_streak_hint: Option<u32>,
    pub as_of: LogicalDate,
}

impl Observation {
    pub const ERROR_COUNT: i64 = -1;

    pub fn failed(as_of: LogicalDate) -> Self {
        Self {
            history: Vec::new(),
            today_count: Self::ERROR_COUNT,
            last_solved_date: None,
            reverse_streak_hint: None,
            as_of,
        }
    }

    pub fn is_error(&self) -> bool {
        self.today_count < 0
    }
}

#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    pub handle: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub group: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub handle: String,
    pub alias: String,
    pub label: String,
    pub today_count: u32,
    pub reverse_streak: u32,
    pub last_solved_date: Option<LogicalDate>,
    pub last_checked_date: Option<LogicalDate>,
    pub status: String,
    pub tone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupView {
    pub name: String,
    pub users: Vec<UserView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub date: String,
    pub groups: Vec<GroupView>,
}
