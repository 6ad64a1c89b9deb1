//! Ordering and labels for the status list.

use crate::models::{DEFAULT_GROUP, UserRecord, normalize_group};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub members: Vec<UserRecord>,
}

/// Buckets records by group and orders both the groups and their members.
/// Sorting is stable, so records that compare equal keep their input order.
pub fn present(records: &[UserRecord]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for record in records {
        let name = normalize_group(&record.group);
        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.members.push(record.clone()),
            None => groups.push(Group {
                name,
                members: vec![record.clone()],
            }),
        }
    }

    groups.sort_by(|a, b| compare_groups(&a.name, &b.name));
    for group in &mut groups {
        group.members.sort_by(compare_records);
    }
    groups
}

fn compare_groups(a: &str, b: &str) -> Ordering {
    let a_default = a.eq_ignore_ascii_case(DEFAULT_GROUP);
    let b_default = b.eq_ignore_ascii_case(DEFAULT_GROUP);
    b_default
        .cmp(&a_default)
        .then_with(|| compare_names(a, b))
}

/// At-risk records (first missed day) lead; the rest go by today's count,
/// then shorter reverse streak, then name.
pub fn compare_records(a: &UserRecord, b: &UserRecord) -> Ordering {
    let a_risk = a.reverse_streak == 1;
    let b_risk = b.reverse_streak == 1;
    if a_risk != b_risk {
        return b_risk.cmp(&a_risk);
    }

    let by_activity = if a_risk {
        Ordering::Equal
    } else {
        b.today_count
            .cmp(&a.today_count)
            .then(a.reverse_streak.cmp(&b.reverse_streak))
    };

    by_activity.then_with(|| compare_names(display_name(a), display_name(b)))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

pub fn display_name(record: &UserRecord) -> &str {
    if record.alias.is_empty() {
        &record.handle
    } else {
        &record.alias
    }
}

/// `alias (handle)` when an alias is set, the bare handle otherwise.
pub fn qualified_label(record: &UserRecord) -> String {
    if record.alias.is_empty() {
        record.handle.clone()
    } else {
        format!("{} ({})", record.alias, record.handle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Solved(u32),
    ReverseStreak(u32),
    AtRisk,
    Error,
}

impl Status {
    pub fn of(record: &UserRecord, fetch_failed: bool) -> Self {
        if fetch_failed {
            Status::Error
        } else if record.today_count > 0 {
            Status::Solved(record.today_count)
        } else if record.reverse_streak >= 2 {
            Status::ReverseStreak(record.reverse_streak)
        } else {
            Status::AtRisk
        }
    }

    pub fn tone(self) -> &'static str {
        match self {
            Status::Solved(_) => "ok",
            Status::ReverseStreak(_) => "info",
            Status::AtRisk => "danger",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Solved(count) => write!(f, "{count} solved today"),
            Status::ReverseStreak(days) => write!(f, "reverse-streak day {days}"),
            Status::AtRisk => f.write_str("at risk"),
            Status::Error => f.write_str("error"),
        }
    }
}
