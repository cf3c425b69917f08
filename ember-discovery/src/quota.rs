use chrono::{Datelike, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use ember_shared::errors::AppResult;

use crate::models::{NewUsageCounter, UsageCounter};
use crate::schema::usage_counters;

/// Which weekly counter a check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Likes,
    Messages,
}

/// Result of an atomic quota check: whether the action may proceed, and how
/// many slots are left after this one.
#[derive(Debug, Clone, Copy)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: i32,
}

/// Weekly bucket key, e.g. `2026-W32`. Derived from the UTC date's ISO week
/// so the rollover happens exactly once, at the same instant, on every
/// instance. The key is part of the counter row's identity; a new week means
/// a new row, which starts logically at zero. No reset job exists.
pub fn week_bucket(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

pub fn current_week_bucket() -> String {
    week_bucket(Utc::now().date_naive())
}

pub fn remaining(cap: i32, sent: i32) -> i32 {
    (cap - sent).max(0)
}

/// Atomically consume one slot of the given weekly counter, refusing once the
/// cap is reached. Multi-instance safe: the increment is a single conditional
/// `UPDATE ... SET n = n + 1 WHERE n < cap`, so two parallel requests can
/// never push a counter past the cap.
///
/// Premium bypass happens in the caller; this layer neither knows about tiers
/// nor validates user existence.
pub fn check_and_increment(
    conn: &mut PgConnection,
    user_id: Uuid,
    kind: CounterKind,
    cap: i32,
) -> AppResult<QuotaDecision> {
    let bucket = current_week_bucket();

    // Seed this week's row; a concurrent seed loses the race harmlessly.
    diesel::insert_into(usage_counters::table)
        .values(&NewUsageCounter {
            user_id,
            week_bucket: bucket.clone(),
        })
        .on_conflict((usage_counters::user_id, usage_counters::week_bucket))
        .do_nothing()
        .execute(conn)?;

    let updated: Option<UsageCounter> = match kind {
        CounterKind::Likes => diesel::update(
            usage_counters::table
                .filter(usage_counters::user_id.eq(user_id))
                .filter(usage_counters::week_bucket.eq(&bucket))
                .filter(usage_counters::likes_sent.lt(cap)),
        )
        .set((
            usage_counters::likes_sent.eq(usage_counters::likes_sent + 1),
            usage_counters::updated_at.eq(Utc::now()),
        ))
        .get_result(conn)
        .optional()?,
        CounterKind::Messages => diesel::update(
            usage_counters::table
                .filter(usage_counters::user_id.eq(user_id))
                .filter(usage_counters::week_bucket.eq(&bucket))
                .filter(usage_counters::messages_sent.lt(cap)),
        )
        .set((
            usage_counters::messages_sent.eq(usage_counters::messages_sent + 1),
            usage_counters::updated_at.eq(Utc::now()),
        ))
        .get_result(conn)
        .optional()?,
    };

    match updated {
        Some(counter) => {
            let sent = match kind {
                CounterKind::Likes => counter.likes_sent,
                CounterKind::Messages => counter.messages_sent,
            };
            Ok(QuotaDecision {
                allowed: true,
                remaining: remaining(cap, sent),
            })
        }
        // No row matched the `n < cap` guard: the cap is spent for this week.
        None => Ok(QuotaDecision {
            allowed: false,
            remaining: 0,
        }),
    }
}

/// Read this week's counters without consuming anything. Absent row means
/// nothing was spent yet.
pub fn counters_for_week(
    conn: &mut PgConnection,
    user_id: Uuid,
    bucket: &str,
) -> AppResult<(i32, i32)> {
    let row: Option<UsageCounter> = usage_counters::table
        .filter(usage_counters::user_id.eq(user_id))
        .filter(usage_counters::week_bucket.eq(bucket))
        .first(conn)
        .optional()?;

    Ok(row
        .map(|c| (c.likes_sent, c.messages_sent))
        .unwrap_or((0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_formats_iso_week() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(week_bucket(d), "2026-W32");
    }

    #[test]
    fn bucket_uses_iso_year_at_boundaries() {
        // 2024-12-30 is a Monday belonging to ISO week 1 of 2025.
        let d = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(week_bucket(d), "2025-W01");

        // 2021-01-01 is a Friday still in ISO week 53 of 2020.
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(week_bucket(d), "2020-W53");
    }

    #[test]
    fn bucket_is_stable_within_a_week() {
        // Monday through Sunday of one ISO week share a bucket.
        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap();
        assert_eq!(week_bucket(monday), week_bucket(sunday));

        let next_monday = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        assert_ne!(week_bucket(monday), week_bucket(next_monday));
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(remaining(12, 0), 12);
        assert_eq!(remaining(12, 11), 1);
        assert_eq!(remaining(12, 12), 0);
        assert_eq!(remaining(12, 99), 0);
    }
}
