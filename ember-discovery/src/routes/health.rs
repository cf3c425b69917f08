use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use ember_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db_status = match state.db.get() {
        Ok(_) => HealthStatus::Healthy,
        Err(_) => HealthStatus::Unhealthy,
    };
    let redis_status = match state.redis.exists("health:probe").await {
        Ok(_) => HealthStatus::Healthy,
        Err(_) => HealthStatus::Degraded,
    };

    let response = HealthResponse::healthy("ember-discovery", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![
            HealthCheck {
                name: "postgres".to_string(),
                status: db_status,
                message: None,
            },
            HealthCheck {
                name: "redis".to_string(),
                status: redis_status,
                message: None,
            },
        ]);

    Json(response)
}
