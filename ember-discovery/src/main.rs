use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod discovery;
mod events;
mod geo;
mod models;
mod quota;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use ember_shared::clients::db::create_pool;
pub use ember_shared::clients::db::DbPool;
use ember_shared::clients::rabbitmq::RabbitMQClient;
use ember_shared::clients::redis::RedisClient;
use ember_shared::middleware::{init_metrics, metrics_middleware, PrometheusHandle};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
    pub metrics: PrometheusHandle,
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ember_shared::middleware::init_tracing("ember-discovery");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;
    let metrics = init_metrics();

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
        metrics,
    });

    // Spawn RabbitMQ subscribers for platform events
    let sub_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_user_registered(sub_state).await {
            tracing::error!(error = %e, "user.registered subscriber failed");
        }
    });
    let sub_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_tier_changed(sub_state).await {
            tracing::error!(error = %e, "tier.changed subscriber failed");
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(metrics_handler))
        .route("/me", get(routes::profile::get_profile).patch(routes::profile::update_profile))
        .route("/profiles/:user_id", get(routes::profile::get_public_profile))
        .route("/discover", get(routes::discover::discover))
        .route("/swipes", post(routes::swipes::create_swipe))
        .route("/matches", get(routes::matches::list_matches))
        .route("/usage-stats", get(routes::usage::usage_stats))
        .route("/blocks", post(routes::blocks::create_block).get(routes::blocks::list_blocks))
        .route("/blocks/:user_id", delete(routes::blocks::remove_block))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/quota/messages", post(routes::internal::check_message_quota))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "ember-discovery starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
