use axum::extract::{Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::discovery::engine::{rank_candidates, ProfileCard};
use crate::discovery::filters::DiscoveryFilters;
use crate::models::Profile;
use crate::schema::{blocks, profiles, swipes};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    pub category: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<String>,
    pub max_distance: Option<f64>,
    pub limit: Option<i64>,
}

/// GET /discover?category=&min_age=&max_age=&gender=&max_distance=&limit=
pub async fn discover(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiscoverParams>,
) -> AppResult<Json<ApiResponse<Vec<ProfileCard>>>> {
    let filters = DiscoveryFilters {
        category: params.category.filter(|c| !c.trim().is_empty()),
        min_age: params.min_age,
        max_age: params.max_age,
        gender: params.gender.filter(|g| !g.trim().is_empty()),
        max_distance_km: params.max_distance,
    };
    filters
        .validate()
        .map_err(|msg| AppError::new(ErrorCode::ValidationError, msg))?;

    let limit = params
        .limit
        .unwrap_or(state.config.default_discover_limit)
        .clamp(1, state.config.max_discover_limit);

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let requester = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    // Already-evaluated candidates never reappear, whatever the action was.
    let swiped: Vec<Uuid> = swipes::table
        .filter(swipes::actor_id.eq(user.id))
        .select(swipes::target_id)
        .load(&mut conn)?;

    // Blocks exclude in both directions.
    let blocked: Vec<Uuid> = blocks::table
        .filter(blocks::blocker_id.eq(user.id))
        .select(blocks::blocked_id)
        .load(&mut conn)?;
    let blocked_by: Vec<Uuid> = blocks::table
        .filter(blocks::blocked_id.eq(user.id))
        .select(blocks::blocker_id)
        .load(&mut conn)?;

    let mut excluded = swiped;
    excluded.extend(blocked);
    excluded.extend(blocked_by);
    excluded.push(user.id);

    let candidates: Vec<Profile> = profiles::table
        .filter(profiles::user_id.ne_all(&excluded))
        .filter(profiles::display_name.is_not_null())
        .order(profiles::created_at.desc())
        .limit(state.config.candidate_pool_size)
        .load(&mut conn)?;

    let mut cards = rank_candidates(
        &requester,
        candidates,
        &filters,
        state.config.include_ungeolocated,
        limit as usize,
    );

    // Presence lives in Redis (source of truth), keyed by the realtime service.
    let keys: Vec<String> = cards
        .iter()
        .map(|c| format!("online:{}", c.user_id))
        .collect();
    if let Ok(flags) = state.redis.exists_multi(&keys).await {
        for (card, online) in cards.iter_mut().zip(flags) {
            card.is_online = card.is_online || online;
        }
    }

    tracing::debug!(
        requester = %user.id,
        results = cards.len(),
        "discovery query served"
    );

    Ok(Json(ApiResponse::ok(cards)))
}
