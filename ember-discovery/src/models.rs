use chrono::{DateTime, Datelike, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ember_shared::types::auth::PremiumTier;

use crate::schema::{blocks, matches, profiles, swipes, usage_counters, users};

// --- User ---

/// Replica of the account record owned by the auth service. Never serialized
/// directly; the password hash stays out of every response.
#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub premium_tier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Unknown tier strings (e.g. a tier added by billing before this service
    /// is redeployed) are treated as free, the conservative side for quotas.
    pub fn tier(&self) -> PremiumTier {
        self.premium_tier.parse().unwrap_or(PremiumTier::Free)
    }

    pub fn is_premium(&self) -> bool {
        self.tier().is_premium()
    }
}

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: serde_json::Value,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photos: serde_json::Value,
    pub primary_photo_idx: i32,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub relationship_goal: Option<String>,
    pub languages: serde_json::Value,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Coordinates are all-or-nothing: a profile is geolocated only when both
    /// latitude and longitude are set.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        let birth = self.birth_date?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        Some(age)
    }

    pub fn interests_vec(&self) -> Vec<String> {
        json_string_array(&self.interests)
    }

    pub fn photos_vec(&self) -> Vec<String> {
        json_string_array(&self.photos)
    }

    pub fn languages_vec(&self) -> Vec<String> {
        json_string_array(&self.languages)
    }

    pub fn primary_photo(&self) -> Option<String> {
        let photos = self.photos_vec();
        photos
            .get(self.primary_photo_idx.max(0) as usize)
            .or_else(|| photos.first())
            .cloned()
    }
}

fn json_string_array(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub user_id: Uuid,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub height_cm: Option<i32>,
    pub interests: Option<serde_json::Value>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photos: Option<serde_json::Value>,
    pub primary_photo_idx: Option<i32>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub relationship_goal: Option<String>,
    pub languages: Option<serde_json::Value>,
}

// --- Swipe ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    Like,
    Pass,
    SuperLike,
}

impl SwipeAction {
    pub fn consumes_like_quota(&self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::SuperLike)
    }
}

impl std::fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwipeAction::Like => write!(f, "like"),
            SwipeAction::Pass => write!(f, "pass"),
            SwipeAction::SuperLike => write!(f, "super_like"),
        }
    }
}

impl std::str::FromStr for SwipeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SwipeAction::Like),
            "pass" => Ok(SwipeAction::Pass),
            "super_like" => Ok(SwipeAction::SuperLike),
            _ => Err(format!("unknown swipe action: {s}")),
        }
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = swipes)]
pub struct Swipe {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub action: String,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.user_a_id == user_id {
            self.user_b_id
        } else {
            self.user_a_id
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
}

// --- UsageCounter ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = usage_counters)]
pub struct UsageCounter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_bucket: String,
    pub likes_sent: i32,
    pub messages_sent: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = usage_counters)]
pub struct NewUsageCounter {
    pub user_id: Uuid,
    pub week_bucket: String,
}

// --- Block ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = blocks)]
pub struct Block {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn swipe_action_roundtrip() {
        for action in [SwipeAction::Like, SwipeAction::Pass, SwipeAction::SuperLike] {
            assert_eq!(SwipeAction::from_str(&action.to_string()).unwrap(), action);
        }
    }

    #[test]
    fn only_likes_consume_quota() {
        assert!(SwipeAction::Like.consumes_like_quota());
        assert!(SwipeAction::SuperLike.consumes_like_quota());
        assert!(!SwipeAction::Pass.consumes_like_quota());
    }

    #[test]
    fn age_accounts_for_upcoming_birthday() {
        let mut profile = test_profile();
        profile.birth_date = NaiveDate::from_ymd_opt(2000, 6, 15);

        let before = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        let after = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(profile.age_on(before), Some(25));
        assert_eq!(profile.age_on(after), Some(26));
    }

    #[test]
    fn coordinates_require_both_fields() {
        let mut profile = test_profile();
        assert_eq!(profile.coordinates(), None);

        profile.latitude = Some(47.5596);
        assert_eq!(profile.coordinates(), None);

        profile.longitude = Some(7.5886);
        assert_eq!(profile.coordinates(), Some((47.5596, 7.5886)));
    }

    #[test]
    fn primary_photo_falls_back_to_first() {
        let mut profile = test_profile();
        profile.photos = serde_json::json!(["a.jpg", "b.jpg"]);
        profile.primary_photo_idx = 5;
        assert_eq!(profile.primary_photo(), Some("a.jpg".to_string()));

        profile.primary_photo_idx = 1;
        assert_eq!(profile.primary_photo(), Some("b.jpg".to_string()));
    }

    pub(crate) fn test_profile() -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            display_name: Some("sam".to_string()),
            bio: None,
            birth_date: None,
            gender: None,
            height_cm: None,
            interests: serde_json::json!([]),
            location: None,
            latitude: None,
            longitude: None,
            photos: serde_json::json!([]),
            primary_photo_idx: 0,
            occupation: None,
            education: None,
            relationship_goal: None,
            languages: serde_json::json!([]),
            is_online: false,
            last_seen_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
