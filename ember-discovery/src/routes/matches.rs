use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::pagination::{Paginated, PaginationParams};
use ember_shared::types::ApiResponse;

use crate::models::{Match, Profile};
use crate::schema::{matches, profiles};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MatchEntry {
    pub match_id: Uuid,
    pub matched_at: DateTime<Utc>,
    pub partner: PartnerSummary,
}

#[derive(Debug, Serialize)]
pub struct PartnerSummary {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub primary_photo: Option<String>,
    pub age: Option<i32>,
    pub is_online: bool,
}

/// GET /matches?page=&per_page= - matches for the current user, newest first
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<MatchEntry>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total: i64 = matches::table
        .filter(matches::user_a_id.eq(user.id).or(matches::user_b_id.eq(user.id)))
        .select(count_star())
        .first(&mut conn)?;

    let rows: Vec<Match> = matches::table
        .filter(matches::user_a_id.eq(user.id).or(matches::user_b_id.eq(user.id)))
        .order(matches::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load(&mut conn)?;

    let partner_ids: Vec<Uuid> = rows.iter().map(|m| m.partner_of(user.id)).collect();
    let partners: Vec<Profile> = profiles::table
        .filter(profiles::user_id.eq_any(&partner_ids))
        .load(&mut conn)?;

    let today = Utc::now().date_naive();
    let entries: Vec<MatchEntry> = rows
        .into_iter()
        .map(|m| {
            let partner_id = m.partner_of(user.id);
            let partner = partners.iter().find(|p| p.user_id == partner_id);
            MatchEntry {
                match_id: m.id,
                matched_at: m.created_at,
                partner: PartnerSummary {
                    user_id: partner_id,
                    display_name: partner.and_then(|p| p.display_name.clone()),
                    primary_photo: partner.and_then(|p| p.primary_photo()),
                    age: partner.and_then(|p| p.age_on(today)),
                    is_online: partner.map(|p| p.is_online).unwrap_or(false),
                },
            }
        })
        .collect();

    // Enrich presence from Redis for the partners on this page.
    let mut entries = entries;
    let keys: Vec<String> = entries
        .iter()
        .map(|e| format!("online:{}", e.partner.user_id))
        .collect();
    if let Ok(flags) = state.redis.exists_multi(&keys).await {
        for (entry, online) in entries.iter_mut().zip(flags) {
            entry.partner.is_online = entry.partner.is_online || online;
        }
    }

    Ok(Json(ApiResponse::ok(Paginated::new(
        entries,
        total as u64,
        &params,
    ))))
}
