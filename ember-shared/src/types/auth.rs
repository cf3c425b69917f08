use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription tier of an account. `Free` is rate-limited weekly;
/// paid tiers bypass quota enforcement entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumTier {
    Free,
    Plus,
    Gold,
}

impl PremiumTier {
    pub fn is_premium(&self) -> bool {
        !matches!(self, PremiumTier::Free)
    }
}

impl std::fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PremiumTier::Free => write!(f, "free"),
            PremiumTier::Plus => write!(f, "plus"),
            PremiumTier::Gold => write!(f, "gold"),
        }
    }
}

impl std::str::FromStr for PremiumTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(PremiumTier::Free),
            "plus" => Ok(PremiumTier::Plus),
            "gold" => Ok(PremiumTier::Gold),
            _ => Err(format!("unknown tier: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub token_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            token_id: claims.jti,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn tier_roundtrip() {
        for tier in [PremiumTier::Free, PremiumTier::Plus, PremiumTier::Gold] {
            assert_eq!(PremiumTier::from_str(&tier.to_string()).unwrap(), tier);
        }
    }

    #[test]
    fn only_free_is_not_premium() {
        assert!(!PremiumTier::Free.is_premium());
        assert!(PremiumTier::Plus.is_premium());
        assert!(PremiumTier::Gold.is_premium());
    }

    #[test]
    fn unknown_tier_rejected() {
        assert!(PremiumTier::from_str("platinum").is_err());
    }
}
