use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::models::User;
use crate::quota;
use crate::schema::users;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CounterStats {
    pub sent: i32,
    /// `null` means unlimited (premium bypass), not zero left.
    pub remaining: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct UsageStatsResponse {
    pub premium_tier: String,
    pub is_premium: bool,
    pub week_bucket: String,
    pub likes: CounterStats,
    pub messages: CounterStats,
}

/// GET /usage-stats - this week's like/message spend for the current user
pub async fn usage_stats(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UsageStatsResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let account = users::table
        .find(user.id)
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let bucket = quota::current_week_bucket();
    let (likes_sent, messages_sent) = quota::counters_for_week(&mut conn, user.id, &bucket)?;

    let premium = account.is_premium();
    let response = UsageStatsResponse {
        premium_tier: account.tier().to_string(),
        is_premium: premium,
        week_bucket: bucket,
        likes: CounterStats {
            sent: likes_sent,
            remaining: if premium {
                None
            } else {
                Some(quota::remaining(state.config.weekly_like_cap, likes_sent))
            },
        },
        messages: CounterStats {
            sent: messages_sent,
            remaining: if premium {
                None
            } else {
                Some(quota::remaining(state.config.weekly_message_cap, messages_sent))
            },
        },
    };

    Ok(Json(ApiResponse::ok(response)))
}
