use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use ember_shared::types::event::{payloads, routing_keys, Event};

use crate::schema::users;
use crate::services::profile_service;
use crate::AppState;

/// Listen for auth.user.registered events to create default profiles
pub async fn listen_user_registered(state: Arc<AppState>) -> anyhow::Result<()> {
    let consumer = state
        .rabbitmq
        .subscribe(
            "ember-discovery.auth.user.registered",
            &[routing_keys::AUTH_USER_REGISTERED],
        )
        .await?;

    tracing::info!("listening for auth.user.registered events");

    let mut consumer = consumer;
    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::UserRegistered>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        tracing::info!(
                            user_id = %data.user_id,
                            email = %data.email,
                            "received user.registered event"
                        );

                        if let Err(e) = profile_service::create_default_profile(
                            &state.db,
                            data.user_id,
                            &data.email,
                        ) {
                            tracing::error!(
                                error = %e,
                                user_id = %data.user_id,
                                "failed to create default profile"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize user.registered event");
                    }
                }
                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
            }
        }
    }

    Ok(())
}

/// Listen for billing.tier.changed events to keep premium tiers current.
/// Quota enforcement reads the tier from the users table, so a missed event
/// only delays the bypass until redelivery.
pub async fn listen_tier_changed(state: Arc<AppState>) -> anyhow::Result<()> {
    let consumer = state
        .rabbitmq
        .subscribe(
            "ember-discovery.billing.tier.changed",
            &[routing_keys::BILLING_TIER_CHANGED],
        )
        .await?;

    tracing::info!("listening for billing.tier.changed events");

    let mut consumer = consumer;
    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::TierChanged>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        let result = state.db.get().map_err(anyhow::Error::from).and_then(|mut conn| {
                            diesel::update(users::table.find(data.user_id))
                                .set((
                                    users::premium_tier.eq(&data.premium_tier),
                                    users::updated_at.eq(Utc::now()),
                                ))
                                .execute(&mut conn)
                                .map_err(anyhow::Error::from)
                        });

                        match result {
                            Ok(rows) if rows > 0 => {
                                tracing::info!(
                                    user_id = %data.user_id,
                                    tier = %data.premium_tier,
                                    "premium tier updated"
                                );
                            }
                            Ok(_) => {
                                tracing::warn!(
                                    user_id = %data.user_id,
                                    "tier.changed for unknown user"
                                );
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    user_id = %data.user_id,
                                    "failed to update premium tier"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize tier.changed event");
                    }
                }
                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
            }
        }
    }

    Ok(())
}
