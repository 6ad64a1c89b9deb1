//! Upgrades whatever shape the user list was stored in to the current
//! envelope.
//!
//! Shapes seen in the wild:
//! - `["alice", "bob"]`: the first release stored bare handles.
//! - `[{ "handle": "alice", "alias": "", ... }]`: records without `group`
//!   or `todayCount`.
//! - `{ "version": 2, "users": [...] }`: the current envelope.

use crate::dates::LogicalDate;
use crate::fetcher::coerce_count;
use crate::models::{UserRecord, normalize_group};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub version: u32,
    pub users: &'a [UserRecord],
}

impl<'a> Envelope<'a> {
    pub fn current(users: &'a [UserRecord]) -> Self {
        Self {
            version: SCHEMA_VERSION,
            users,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Normalized {
    pub users: Vec<UserRecord>,
    /// Set when the stored shape differs from the current envelope and
    /// should be written back.
    pub migrated: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredUser {
    Handle(String),
    Record(StoredRecord),
}

/// Every field but the handle is read as raw JSON and coerced, so a record
/// with an odd field is repaired instead of lost.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    handle: String,
    #[serde(default)]
    alias: Value,
    #[serde(default)]
    group: Value,
    #[serde(default)]
    today_count: Value,
    #[serde(default)]
    reverse_streak: Value,
    #[serde(default)]
    last_solved_date: Value,
    #[serde(default)]
    last_checked_date: Value,
}

impl StoredRecord {
    fn into_record(self) -> (UserRecord, bool) {
        let upgraded = !self.is_canonical();
        let record = UserRecord {
            handle: self.handle.trim().to_string(),
            alias: text(&self.alias),
            group: normalize_group(&text(&self.group)),
            today_count: coerce_count(Some(&self.today_count)),
            reverse_streak: coerce_count(Some(&self.reverse_streak)),
            last_solved_date: parse_date(&self.last_solved_date),
            last_checked_date: parse_date(&self.last_checked_date),
        };
        (record, upgraded)
    }

    /// True when the record already has the shape the current envelope writes.
    fn is_canonical(&self) -> bool {
        let count = |v: &Value| v.as_u64().is_some_and(|n| n <= u64::from(u32::MAX));
        let date = |v: &Value| v.is_null() || parse_date(v).is_some();
        self.alias.is_string()
            && self.group.as_str().is_some_and(|g| normalize_group(g) == g)
            && count(&self.today_count)
            && count(&self.reverse_streak)
            && date(&self.last_solved_date)
            && date(&self.last_checked_date)
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_date(value: &Value) -> Option<LogicalDate> {
    value.as_str().and_then(|s| s.parse().ok())
}

/// Turns any stored user-list shape into canonical records. `None` means
/// the document is not a user list at all; callers must not overwrite it.
pub fn normalize(raw: Value) -> Option<Normalized> {
    let (entries, mut migrated) = match raw {
        Value::Array(entries) => (entries, true),
        Value::Object(mut map) => {
            let version = map.get("version").and_then(Value::as_u64);
            let Some(Value::Array(entries)) = map.remove("users") else {
                warn!("stored user envelope has no user list");
                return None;
            };
            (entries, version != Some(u64::from(SCHEMA_VERSION)))
        }
        Value::Null => (Vec::new(), false),
        other => {
            warn!("stored users have an unexpected shape: {other}");
            return None;
        }
    };

    let mut seen = HashSet::new();
    let mut users = Vec::with_capacity(entries.len());
    for entry in entries {
        let (record, upgraded) = match serde_json::from_value::<StoredUser>(entry) {
            Ok(StoredUser::Handle(handle)) => (UserRecord::new(handle.trim()), true),
            Ok(StoredUser::Record(stored)) => stored.into_record(),
            Err(err) => {
                warn!("skipping stored user without a handle: {err}");
                migrated = true;
                continue;
            }
        };
        if record.handle.is_empty() || !seen.insert(record.handle.clone()) {
            warn!(handle = %record.handle, "dropping empty or duplicate stored handle");
            migrated = true;
            continue;
        }
        migrated |= upgraded;
        users.push(record);
    }

    Some(Normalized { users, migrated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_GROUP;
    use serde_json::json;

    #[test]
    fn bare_handles_become_default_records() {
        let out = normalize(json!(["alice", "bob"])).unwrap();
        assert!(out.migrated);
        assert_eq!(out.users.len(), 2);
        for (user, handle) in out.users.iter().zip(["alice", "bob"]) {
            assert_eq!(user.handle, handle);
            assert_eq!(user.group, DEFAULT_GROUP);
            assert_eq!(user.alias, "");
            assert_eq!(user.reverse_streak, 0);
            assert_eq!(user.today_count, 0);
            assert_eq!(user.last_solved_date, None);
            assert_eq!(user.last_checked_date, None);
        }
    }

    #[test]
    fn old_records_get_missing_fields() {
        let out = normalize(json!([{
            "handle": "jae",
            "alias": "J",
            "reverseStreak": 3,
            "lastSolvedDate": "2024-05-28",
            "lastCheckedDate": null
        }]))
        .unwrap();
        assert!(out.migrated);
        let user = &out.users[0];
        assert_eq!(user.alias, "J");
        assert_eq!(user.group, DEFAULT_GROUP);
        assert_eq!(user.today_count, 0);
        assert_eq!(user.reverse_streak, 3);
        assert_eq!(user.last_solved_date, "2024-05-28".parse().ok());
    }

    #[test]
    fn current_envelope_is_left_alone() {
        let users = vec![UserRecord::new("kim").with_group("Study")];
        let raw = serde_json::to_value(Envelope::current(&users)).unwrap();
        let out = normalize(raw).unwrap();
        assert!(!out.migrated);
        assert_eq!(out.users, users);
    }

    #[test]
    fn bad_values_are_clamped_or_dropped() {
        let out = normalize(json!({
            "version": SCHEMA_VERSION,
            "users": [
                {
                    "handle": "neg",
                    "group": "",
                    "todayCount": -1,
                    "reverseStreak": -4,
                    "lastSolvedDate": "soon"
                },
                { "handle": "neg", "group": "Other", "todayCount": 1 },
                { "handle": "  " },
                42,
                "mixed"
            ]
        }))
        .unwrap();
        assert!(out.migrated);
        let handles: Vec<&str> = out.users.iter().map(|u| u.handle.as_str()).collect();
        assert_eq!(handles, vec!["neg", "mixed"]);
        let neg = &out.users[0];
        assert_eq!(neg.group, DEFAULT_GROUP);
        assert_eq!(neg.today_count, 0);
        assert_eq!(neg.reverse_streak, 0);
        assert_eq!(neg.last_solved_date, None);
    }

    #[test]
    fn mistyped_fields_are_coerced_not_dropped() {
        let out = normalize(json!([
            { "handle": "alice", "alias": "A", "todayCount": 1 },
            { "handle": "bob", "alias": "B", "todayCount": "2", "reverseStreak": 3 },
            { "handle": "carol", "alias": 5, "group": " Study ", "lastSolvedDate": 20240528 },
        ]))
        .unwrap();
        assert!(out.migrated);
        assert_eq!(out.users.len(), 3);
        let bob = &out.users[1];
        assert_eq!(bob.today_count, 2);
        assert_eq!(bob.reverse_streak, 3);
        assert_eq!(bob.alias, "B");
        let carol = &out.users[2];
        assert_eq!(carol.alias, "5");
        assert_eq!(carol.group, "Study");
        assert_eq!(carol.last_solved_date, None);
    }

    #[test]
    fn nothing_stored_is_empty() {
        assert_eq!(normalize(Value::Null), Some(Normalized::default()));
    }

    #[test]
    fn unknown_shapes_are_not_user_lists() {
        assert_eq!(normalize(json!("oops")), None);
        assert_eq!(normalize(json!(7)), None);
        assert_eq!(normalize(json!({ "version": SCHEMA_VERSION, "users": "alice" })), None);
        assert_eq!(normalize(json!({ "settings": {} })), None);
    }
}
