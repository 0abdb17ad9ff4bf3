//! Derived view computations.
//!
//! Pure functions over loaded documents. The caller supplies `now` /
//! `today` and must re-evaluate on every view; none of these results may
//! be cached past their evaluation instant.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::types::{Message, ProgressRecord, Role, StatusUpdate, User};

/// Status updates still inside their 24-hour visibility window.
pub fn active_statuses<'a>(
    statuses: &'a [StatusUpdate],
    now: DateTime<Utc>,
) -> Vec<&'a StatusUpdate> {
    let cutoff = now - Duration::hours(24);
    statuses.iter().filter(|s| s.timestamp > cutoff).collect()
}

/// Consecutive-day streak for a user, counted backward from `today`.
///
/// Qualifying dates are the distinct dates carrying at least one completed
/// task, sorted descending. Walking from the most recent, the date at
/// index `i` may lie up to `i + 1` days in the past: the extra day means a
/// day not yet logged today leaves yesterday's chain intact. The first
/// gap beyond that tolerance ends the count.
pub fn streak(records: &[ProgressRecord], user_id: &str, today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.user_id == user_id && !r.tasks_completed.is_empty())
        .map(|r| r.date)
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates.reverse();

    let mut count = 0;
    for (i, date) in dates.iter().enumerate() {
        let days_back = (today - *date).num_days();
        if days_back <= i as i64 + 1 {
            count += 1;
        } else {
            break;
        }
    }
    count
}

/// The conversation between `a` and `b`: every message exchanged between
/// exactly those two parties, oldest first. Symmetric in its arguments.
pub fn conversation<'a>(messages: &'a [Message], a: &str, b: &str) -> Vec<&'a Message> {
    let mut thread: Vec<&Message> = messages
        .iter()
        .filter(|m| {
            (m.sender_id == a && m.receiver_id == b) || (m.sender_id == b && m.receiver_id == a)
        })
        .collect();
    thread.sort_by_key(|m| m.timestamp);
    thread
}

/// A user's records, newest date first (the supporter's per-friend review
/// order).
pub fn records_for_user<'a>(records: &'a [ProgressRecord], user_id: &str) -> Vec<&'a ProgressRecord> {
    let mut own: Vec<&ProgressRecord> = records.iter().filter(|r| r.user_id == user_id).collect();
    own.sort_by(|a, b| b.date.cmp(&a.date));
    own
}

/// The friend-role subset of a roster.
pub fn friends(users: &[User]) -> Vec<&User> {
    users.iter().filter(|u| u.role == Role::Friend).collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::new_id;

    fn status_at(timestamp: DateTime<Utc>) -> StatusUpdate {
        StatusUpdate {
            id: new_id(),
            user_id: "f1".into(),
            user_name: "Asha".into(),
            content: Some("hi".into()),
            attachment: None,
            timestamp,
        }
    }

    fn record_on(user_id: &str, date: NaiveDate, tasks: &[&str]) -> ProgressRecord {
        ProgressRecord {
            tasks_completed: tasks.iter().map(|t| t.to_string()).collect(),
            ..ProgressRecord::empty(user_id, date)
        }
    }

    fn message(sender: &str, receiver: &str, timestamp: DateTime<Utc>) -> Message {
        Message {
            id: new_id(),
            sender_id: sender.into(),
            receiver_id: receiver.into(),
            content: "hello".into(),
            attachment: None,
            timestamp,
        }
    }

    #[test]
    fn status_activity_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let fresh = status_at(now - Duration::hours(23) - Duration::minutes(59));
        let expired = status_at(now - Duration::hours(24) - Duration::minutes(1));
        let statuses = vec![fresh.clone(), expired];

        let active = active_statuses(&statuses, now);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, fresh.id);
    }

    #[test]
    fn streak_counts_consecutive_days_through_today() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let records = vec![
            record_on("f1", today, &["t1"]),
            record_on("f1", today - Duration::days(1), &["t2"]),
            record_on("f1", today - Duration::days(2), &["t1"]),
            // gap at today-3
            record_on("f1", today - Duration::days(4), &["t1"]),
        ];
        assert_eq!(streak(&records, "f1", today), 3);
    }

    #[test]
    fn streak_tolerates_a_missing_entry_for_today() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let records = vec![
            record_on("f1", today - Duration::days(1), &["t1"]),
            record_on("f1", today - Duration::days(2), &["t1"]),
        ];
        assert_eq!(streak(&records, "f1", today), 2);
    }

    #[test]
    fn streak_is_zero_after_a_full_day_gap() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let records = vec![record_on("f1", today - Duration::days(2), &["t1"])];
        assert_eq!(streak(&records, "f1", today), 0);
    }

    #[test]
    fn streak_ignores_dates_with_no_completed_tasks() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let records = vec![
            record_on("f1", today, &[]),
            record_on("f1", today - Duration::days(1), &["t1"]),
        ];
        assert_eq!(streak(&records, "f1", today), 1);
    }

    #[test]
    fn streak_deduplicates_dates_and_filters_by_user() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let records = vec![
            record_on("f1", today, &["t1"]),
            record_on("f1", today, &["t2"]),
            record_on("f2", today - Duration::days(1), &["t1"]),
        ];
        assert_eq!(streak(&records, "f1", today), 1);
    }

    #[test]
    fn conversation_is_symmetric_and_chronological() {
        let base = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let messages = vec![
            message("a", "b", base + Duration::minutes(2)),
            message("b", "a", base),
            message("a", "c", base + Duration::minutes(1)),
            message("b", "a", base + Duration::minutes(3)),
        ];

        let ab = conversation(&messages, "a", "b");
        let ba = conversation(&messages, "b", "a");

        assert_eq!(ab.len(), 3);
        assert_eq!(
            ab.iter().map(|m| &m.id).collect::<Vec<_>>(),
            ba.iter().map(|m| &m.id).collect::<Vec<_>>()
        );
        assert!(ab.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn records_for_user_are_newest_first() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let records = vec![
            record_on("f1", today - Duration::days(3), &["t1"]),
            record_on("f1", today, &["t1"]),
            record_on("f2", today, &["t1"]),
        ];
        let own = records_for_user(&records, "f1");
        assert_eq!(own.len(), 2);
        assert_eq!(own[0].date, today);
    }
}
