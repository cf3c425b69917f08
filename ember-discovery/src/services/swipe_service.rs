use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};

use crate::config::AppConfig;
use crate::models::{Match, NewMatch, NewSwipe, Swipe, SwipeAction, User};
use crate::quota::{self, CounterKind};
use crate::schema::{matches, profiles, swipes};

#[derive(Debug)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    pub is_match: bool,
    /// Cap minus this week's post-increment count; `None` for premium actors.
    pub remaining_likes: Option<i32>,
    /// Set only when this call created the match record, so the caller can
    /// publish `match.created` exactly once per pair.
    pub created_match: Option<Match>,
}

/// Matches are keyed by the unordered pair: the smaller id always lands in
/// `user_a_id`. Together with the unique index this makes match creation
/// idempotent under concurrent opposite-direction swipes.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Record a swipe, enforcing the weekly like quota for free actors and
/// detecting mutual likes.
///
/// The quota check is a gate: when the cap is spent the call fails with
/// `QuotaExceeded` and nothing is recorded. A repeat swipe on the same target
/// overwrites the stored action.
pub fn process_swipe(
    conn: &mut PgConnection,
    config: &AppConfig,
    actor: &User,
    target_id: Uuid,
    action: SwipeAction,
) -> AppResult<SwipeOutcome> {
    if actor.id == target_id {
        return Err(AppError::new(
            ErrorCode::InvalidTarget,
            "you cannot swipe on yourself",
        ));
    }

    let target_exists: i64 = profiles::table
        .filter(profiles::user_id.eq(target_id))
        .count()
        .get_result(conn)?;
    if target_exists == 0 {
        return Err(AppError::new(
            ErrorCode::ProfileNotFound,
            "target profile not found",
        ));
    }

    let premium = actor.is_premium();

    let remaining_likes = if premium {
        None
    } else if action.consumes_like_quota() {
        let decision =
            quota::check_and_increment(conn, actor.id, CounterKind::Likes, config.weekly_like_cap)?;
        if !decision.allowed {
            return Err(AppError::with_details(
                ErrorCode::QuotaExceeded,
                "weekly like limit reached",
                serde_json::json!({
                    "cap": config.weekly_like_cap,
                    "remaining": 0,
                    "resets": "next ISO week",
                }),
            ));
        }
        Some(decision.remaining)
    } else {
        // Passes are free; report the current balance without spending a slot.
        let bucket = quota::current_week_bucket();
        let (likes_sent, _) = quota::counters_for_week(conn, actor.id, &bucket)?;
        Some(quota::remaining(config.weekly_like_cap, likes_sent))
    };

    let swipe: Swipe = diesel::insert_into(swipes::table)
        .values(&NewSwipe {
            actor_id: actor.id,
            target_id,
            action: action.to_string(),
        })
        .on_conflict((swipes::actor_id, swipes::target_id))
        .do_update()
        .set((
            swipes::action.eq(action.to_string()),
            swipes::updated_at.eq(Utc::now()),
        ))
        .get_result(conn)?;

    let mut is_match = false;
    let mut created_match = None;

    if action.consumes_like_quota() {
        let reciprocal: i64 = swipes::table
            .filter(swipes::actor_id.eq(target_id))
            .filter(swipes::target_id.eq(actor.id))
            .filter(swipes::action.eq_any([
                SwipeAction::Like.to_string(),
                SwipeAction::SuperLike.to_string(),
            ]))
            .count()
            .get_result(conn)?;

        if reciprocal > 0 {
            is_match = true;
            let (a, b) = canonical_pair(actor.id, target_id);
            created_match = diesel::insert_into(matches::table)
                .values(&NewMatch {
                    user_a_id: a,
                    user_b_id: b,
                })
                .on_conflict((matches::user_a_id, matches::user_b_id))
                .do_nothing()
                .get_result::<Match>(conn)
                .optional()?;

            if let Some(ref m) = created_match {
                tracing::info!(
                    match_id = %m.id,
                    user_a = %m.user_a_id,
                    user_b = %m.user_b_id,
                    "match created"
                );
            }
        }
    }

    Ok(SwipeOutcome {
        swipe,
        is_match,
        remaining_likes,
        created_match,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
    }

    #[test]
    fn canonical_pair_puts_smaller_id_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (lo, hi) = canonical_pair(a, b);
        assert!(lo < hi);
    }

    #[test]
    fn canonical_pair_of_equal_ids_is_identity() {
        let a = Uuid::new_v4();
        assert_eq!(canonical_pair(a, a), (a, a));
    }
}
