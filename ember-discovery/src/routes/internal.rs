use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::User;
use crate::quota::{self, CounterKind};
use crate::schema::users;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageQuotaRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageQuotaResponse {
    pub allowed: bool,
    pub remaining: Option<i32>,
}

/// POST /internal/quota/messages — consume one message slot for a user
/// (service-to-service, no auth). The messaging service calls this before
/// delivering; premium accounts are always allowed and never counted.
pub async fn check_message_quota(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MessageQuotaRequest>,
) -> Json<MessageQuotaResponse> {
    let mut conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to get db connection for message quota");
            return Json(MessageQuotaResponse {
                allowed: false,
                remaining: None,
            });
        }
    };

    let account: Option<User> = users::table
        .find(req.user_id)
        .first(&mut conn)
        .optional()
        .unwrap_or(None);

    let Some(account) = account else {
        tracing::warn!(user_id = %req.user_id, "message quota check for unknown user");
        return Json(MessageQuotaResponse {
            allowed: false,
            remaining: None,
        });
    };

    if account.is_premium() {
        return Json(MessageQuotaResponse {
            allowed: true,
            remaining: None,
        });
    }

    match quota::check_and_increment(
        &mut conn,
        req.user_id,
        CounterKind::Messages,
        state.config.weekly_message_cap,
    ) {
        Ok(decision) => Json(MessageQuotaResponse {
            allowed: decision.allowed,
            remaining: Some(decision.remaining),
        }),
        Err(e) => {
            tracing::error!(error = %e, user_id = %req.user_id, "message quota check failed");
            Json(MessageQuotaResponse {
                allowed: false,
                remaining: None,
            })
        }
    }
}
