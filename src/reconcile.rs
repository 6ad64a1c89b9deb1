use crate::dates::{LogicalDate, day_diff};
use crate::models::{Observation, UserRecord};

/// Folds one observation into a user's stored state.
///
/// A failed fetch leaves the record untouched; callers surface the error
/// themselves. When the source gives a streak hint it wins, otherwise the
/// streak is advanced by the days elapsed since the stored check date, so
/// reconciling the same day twice never counts a miss twice.
pub fn reconcile(prior: &UserRecord, obs: &Observation) -> UserRecord {
    if obs.is_error() {
        return prior.clone();
    }

    let today = obs.as_of;
    let mut next = prior.clone();
    next.today_count = u32::try_from(obs.today_count).unwrap_or(u32::MAX);

    if next.today_count > 0 {
        next.reverse_streak = 0;
        next.last_solved_date = Some(today);
    } else {
        next.reverse_streak = match obs.reverse_streak_hint {
            Some(hint) if hint >= 1 => hint,
            _ => estimate_streak(prior, today),
        };
        next.last_solved_date = prior.last_solved_date.max(obs.last_solved_date);
    }

    // a stale observation must not move the check date backwards
    next.last_checked_date = prior.last_checked_date.max(Some(today));
    next
}

fn estimate_streak(prior: &UserRecord, today: LogicalDate) -> u32 {
    let streak = match prior.last_checked_date {
        None => prior.reverse_streak,
        Some(checked) => {
            let elapsed = day_diff(today, checked);
            if elapsed > 0 {
                let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
                prior.reverse_streak.saturating_add(elapsed)
            } else {
                prior.reverse_streak
            }
        }
    };
    // nothing solved today, so today is at least the first miss
    streak.max(1)
}
