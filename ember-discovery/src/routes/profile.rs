use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::discovery::engine::ProfileCard;
use crate::events::publisher;
use crate::geo::haversine_km;
use crate::models::{Profile, UpdateProfile};
use crate::schema::{blocks, profiles};
use crate::AppState;

// --- GET /me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /me ---

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 50, message = "display name must be 3-50 characters"))]
    pub display_name: Option<String>,
    #[validate(length(max = 500, message = "bio is limited to 500 characters"))]
    pub bio: Option<String>,
    /// YYYY-MM-DD
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    #[validate(range(min = 100, max = 250))]
    pub height_cm: Option<i32>,
    pub interests: Option<Vec<String>>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photos: Option<Vec<String>>,
    pub primary_photo_idx: Option<i32>,
    #[validate(length(max = 100))]
    pub occupation: Option<String>,
    #[validate(length(max = 100))]
    pub education: Option<String>,
    #[validate(length(max = 50))]
    pub relationship_goal: Option<String>,
    pub languages: Option<Vec<String>>,
}

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Coordinates are all-or-nothing; a profile is either geolocated or not.
    match (req.latitude, req.longitude) {
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(AppError::new(
                    ErrorCode::InvalidCoordinates,
                    "latitude must be in [-90, 90] and longitude in [-180, 180]",
                ));
            }
        }
        (None, None) => {}
        _ => {
            return Err(AppError::new(
                ErrorCode::InvalidCoordinates,
                "latitude and longitude must be provided together",
            ));
        }
    }

    let birth_date = match req.birth_date.as_deref() {
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::new(
                ErrorCode::ValidationError,
                "invalid birth_date format, expected YYYY-MM-DD",
            )
        })?),
        None => None,
    };

    let changes = UpdateProfile {
        display_name: req.display_name,
        bio: req.bio,
        birth_date,
        gender: req.gender,
        height_cm: req.height_cm,
        interests: req.interests.map(|v| serde_json::json!(v)),
        location: req.location,
        latitude: req.latitude,
        longitude: req.longitude,
        photos: req.photos.map(|v| serde_json::json!(v)),
        primary_photo_idx: req.primary_photo_idx,
        occupation: req.occupation,
        education: req.education,
        relationship_goal: req.relationship_goal,
        languages: req.languages.map(|v| serde_json::json!(v)),
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let updated = diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((&changes, profiles::updated_at.eq(Utc::now())))
        .get_result::<Profile>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, updated.id, updated.user_id).await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- GET /profiles/:user_id ---

/// Public card for one profile, with distance from the requester when both
/// sides are geolocated. Blocked pairs see a 404, not a hint.
pub async fn get_public_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProfileCard>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let blocked: i64 = blocks::table
        .filter(
            blocks::blocker_id
                .eq(user.id)
                .and(blocks::blocked_id.eq(target_id))
                .or(blocks::blocker_id
                    .eq(target_id)
                    .and(blocks::blocked_id.eq(user.id))),
        )
        .count()
        .get_result(&mut conn)?;
    if blocked > 0 {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }

    let target = profiles::table
        .filter(profiles::user_id.eq(target_id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let requester: Option<Profile> = profiles::table
        .filter(profiles::user_id.eq(user.id))
        .first(&mut conn)
        .optional()?;

    let distance_km = match (
        requester.as_ref().and_then(|p| p.coordinates()),
        target.coordinates(),
    ) {
        (Some((lat1, lon1)), Some((lat2, lon2))) => Some(haversine_km(lat1, lon1, lat2, lon2)),
        _ => None,
    };

    let mut card = ProfileCard::new(&target, distance_km, Utc::now().date_naive());

    let key = format!("online:{}", target.user_id);
    if let Ok(true) = state.redis.exists(&key).await {
        card.is_online = true;
    }

    Ok(Json(ApiResponse::ok(card)))
}
