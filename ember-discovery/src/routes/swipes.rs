use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{Swipe, SwipeAction, User};
use crate::schema::users;
use crate::services::swipe_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSwipeRequest {
    pub target_id: Uuid,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub swipe: Swipe,
    pub is_match: bool,
    pub remaining_likes: Option<i32>,
}

/// POST /swipes - record a like/pass/super-like and detect a mutual match
pub async fn create_swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    let action = SwipeAction::from_str(&req.action).map_err(|_| {
        AppError::new(
            ErrorCode::InvalidSwipeAction,
            "action must be one of: like, pass, super_like",
        )
    })?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let actor = users::table
        .find(user.id)
        .first::<User>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let outcome =
        swipe_service::process_swipe(&mut conn, &state.config, &actor, req.target_id, action)?;

    publisher::publish_swipe_recorded(
        &state.rabbitmq,
        actor.id,
        req.target_id,
        &action.to_string(),
        outcome.is_match,
    )
    .await;

    if let Some(ref m) = outcome.created_match {
        publisher::publish_match_created(&state.rabbitmq, m.id, m.user_a_id, m.user_b_id).await;
    }

    Ok(Json(ApiResponse::ok(SwipeResponse {
        swipe: outcome.swipe,
        is_match: outcome.is_match,
        remaining_likes: outcome.remaining_likes,
    })))
}
