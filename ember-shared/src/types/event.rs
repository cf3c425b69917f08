use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `ember.{domain}.{entity}.{action}`
/// Example: `ember.discovery.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Auth events (consumed — the auth service owns registration)
    pub const AUTH_USER_REGISTERED: &str = "ember.auth.user.registered";

    // Billing events (consumed — billing owns tier changes)
    pub const BILLING_TIER_CHANGED: &str = "ember.billing.tier.changed";

    // Discovery events (published)
    pub const DISCOVERY_SWIPE_RECORDED: &str = "ember.discovery.swipe.recorded";
    pub const DISCOVERY_MATCH_CREATED: &str = "ember.discovery.match.created";

    // Profile events (published)
    pub const USER_PROFILE_UPDATED: &str = "ember.user.profile.updated";
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserRegistered {
        pub user_id: Uuid,
        pub email: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TierChanged {
        pub user_id: Uuid,
        pub premium_tier: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SwipeRecorded {
        pub actor_id: Uuid,
        pub target_id: Uuid,
        pub action: String,
        pub is_match: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user_a_id: Uuid,
        pub user_b_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileUpdated {
        pub profile_id: Uuid,
        pub user_id: Uuid,
    }
}
