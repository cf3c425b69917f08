use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};
use ember_shared::types::auth::AuthUser;
use ember_shared::types::ApiResponse;

use crate::models::{Block, NewBlock};
use crate::schema::{blocks, profiles};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub blocked_user_id: Uuid,
}

/// POST /blocks - block a user; blocked pairs disappear from each other's discovery
pub async fn create_block(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBlockRequest>,
) -> AppResult<Json<ApiResponse<Block>>> {
    if user.id == req.blocked_user_id {
        return Err(AppError::new(
            ErrorCode::CannotBlockSelf,
            "you cannot block yourself",
        ));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let target_exists: i64 = profiles::table
        .filter(profiles::user_id.eq(req.blocked_user_id))
        .count()
        .get_result(&mut conn)?;
    if target_exists == 0 {
        return Err(AppError::new(
            ErrorCode::ProfileNotFound,
            "profile not found",
        ));
    }

    // Repeat blocks are a no-op; return the existing row.
    let block: Option<Block> = diesel::insert_into(blocks::table)
        .values(&NewBlock {
            blocker_id: user.id,
            blocked_id: req.blocked_user_id,
        })
        .on_conflict((blocks::blocker_id, blocks::blocked_id))
        .do_nothing()
        .get_result(&mut conn)
        .optional()?;

    let block = match block {
        Some(b) => b,
        None => blocks::table
            .filter(blocks::blocker_id.eq(user.id))
            .filter(blocks::blocked_id.eq(req.blocked_user_id))
            .first(&mut conn)?,
    };

    tracing::info!(blocker = %user.id, blocked = %req.blocked_user_id, "user blocked");

    Ok(Json(ApiResponse::ok(block)))
}

/// GET /blocks - users the current user has blocked
pub async fn list_blocks(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Block>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows: Vec<Block> = blocks::table
        .filter(blocks::blocker_id.eq(user.id))
        .order(blocks::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(rows)))
}

/// DELETE /blocks/:user_id - unblock
pub async fn remove_block(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(blocked_user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let deleted = diesel::delete(
        blocks::table
            .filter(blocks::blocker_id.eq(user.id))
            .filter(blocks::blocked_id.eq(blocked_user_id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(AppError::new(ErrorCode::BlockNotFound, "block not found"));
    }

    Ok(Json(ApiResponse::empty()))
}
