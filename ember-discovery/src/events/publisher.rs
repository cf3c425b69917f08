use uuid::Uuid;

use ember_shared::clients::rabbitmq::RabbitMQClient;
use ember_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_swipe_recorded(
    rabbitmq: &RabbitMQClient,
    actor_id: Uuid,
    target_id: Uuid,
    action: &str,
    is_match: bool,
) {
    let event = Event::new(
        "ember-discovery",
        routing_keys::DISCOVERY_SWIPE_RECORDED,
        payloads::SwipeRecorded {
            actor_id,
            target_id,
            action: action.to_string(),
            is_match,
        },
    )
    .with_user(actor_id);

    if let Err(e) = rabbitmq
        .publish(routing_keys::DISCOVERY_SWIPE_RECORDED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish swipe.recorded event");
    }
}

pub async fn publish_match_created(
    rabbitmq: &RabbitMQClient,
    match_id: Uuid,
    user_a_id: Uuid,
    user_b_id: Uuid,
) {
    let event = Event::new(
        "ember-discovery",
        routing_keys::DISCOVERY_MATCH_CREATED,
        payloads::MatchCreated {
            match_id,
            user_a_id,
            user_b_id,
        },
    );

    if let Err(e) = rabbitmq
        .publish(routing_keys::DISCOVERY_MATCH_CREATED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_profile_updated(rabbitmq: &RabbitMQClient, profile_id: Uuid, user_id: Uuid) {
    let event = Event::new(
        "ember-discovery",
        routing_keys::USER_PROFILE_UPDATED,
        payloads::ProfileUpdated {
            profile_id,
            user_id,
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq
        .publish(routing_keys::USER_PROFILE_UPDATED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish profile.updated event");
    }
}
