use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hour at which solved.ac rolls over to the next day.
pub const DEFAULT_DAY_START_HOUR: u32 = 6;

/// A calendar day as the statistics source counts it. Serialized as
/// `YYYY-MM-DD`, so ordering matches lexicographic order of the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalDate(NaiveDate);

impl LogicalDate {
    pub fn days_before(self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }
}

impl fmt::Display for LogicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for LogicalDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self)
    }
}

pub fn today(day_start_hour: u32) -> LogicalDate {
    today_at(Local::now().naive_local(), day_start_hour)
}

/// Before `day_start_hour` the wall clock still belongs to the previous day.
pub fn today_at(now: NaiveDateTime, day_start_hour: u32) -> LogicalDate {
    let date = now.date();
    if now.hour() < day_start_hour {
        LogicalDate(date - Duration::days(1))
    } else {
        LogicalDate(date)
    }
}

/// Days from `b` to `a`, positive when `a` is later. Works on plain dates,
/// so DST shifts in the local zone never leak in.
pub fn day_diff(a: LogicalDate, b: LogicalDate) -> i64 {
    (a.0 - b.0).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(date: &str, hour: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, 30, 0).unwrap())
    }

    fn day(s: &str) -> LogicalDate {
        s.parse().unwrap()
    }

    #[test]
    fn before_threshold_belongs_to_previous_day() {
        assert_eq!(today_at(at("2024-06-01", 5), 6), day("2024-05-31"));
        assert_eq!(today_at(at("2024-06-01", 6), 6), day("2024-06-01"));
        assert_eq!(today_at(at("2024-03-01", 0), 6), day("2024-02-29"));
    }

    #[test]
    fn zero_threshold_is_plain_midnight() {
        assert_eq!(today_at(at("2024-06-01", 0), 0), day("2024-06-01"));
    }

    #[test]
    fn day_diff_is_zero_on_same_day_and_antisymmetric() {
        let a = day("2024-03-31");
        let b = day("2024-03-09");
        assert_eq!(day_diff(a, a), 0);
        assert_eq!(day_diff(a, b), 22);
        assert_eq!(day_diff(b, a), -22);
        assert_eq!(day_diff(day("2025-01-01"), day("2024-12-31")), 1);
    }

    #[test]
    fn label_round_trips_and_orders_like_text() {
        let a = day("2024-06-01");
        assert_eq!(a.to_string(), "2024-06-01");
        assert!(day("2024-05-31") < a);
        assert!("2024-05-31" < "2024-06-01");
        assert!("not-a-date".parse::<LogicalDate>().is_err());
        assert_eq!(a.days_before(1), day("2024-05-31"));
    }
}
