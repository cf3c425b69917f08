use chrono::NaiveDate;

use crate::models::Profile;

/// Typed discovery filters. Every field is optional; provided fields compose
/// with AND semantics. Distance gating lives in the engine because it also
/// depends on the requester's coordinates and config.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryFilters {
    /// Free-text tag matched case-insensitively against a profile's interests.
    pub category: Option<String>,
    /// Inclusive age bounds. Inverted bounds (`min > max`) match nothing,
    /// which is a valid empty result rather than an error.
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<String>,
    pub max_distance_km: Option<f64>,
}

impl DiscoveryFilters {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(min) = self.min_age {
            if min < 0 {
                return Err("min_age must be non-negative".into());
            }
        }
        if let Some(max) = self.max_age {
            if max < 0 {
                return Err("max_age must be non-negative".into());
            }
        }
        if let Some(km) = self.max_distance_km {
            if !km.is_finite() || km < 0.0 {
                return Err("max_distance must be a non-negative number".into());
            }
        }
        Ok(())
    }

    /// Hard predicates: age bounds, gender, category. A candidate with no
    /// birth date cannot satisfy an age bound.
    pub fn matches(&self, candidate: &Profile, today: NaiveDate) -> bool {
        if self.min_age.is_some() || self.max_age.is_some() {
            let age = match candidate.age_on(today) {
                Some(age) => age,
                None => return false,
            };
            if let Some(min) = self.min_age {
                if age < min {
                    return false;
                }
            }
            if let Some(max) = self.max_age {
                if age > max {
                    return false;
                }
            }
        }

        if let Some(ref gender) = self.gender {
            if candidate.gender.as_deref() != Some(gender.as_str()) {
                return false;
            }
        }

        if let Some(ref category) = self.category {
            let has_tag = candidate
                .interests_vec()
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(category));
            if !has_tag {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::test_profile;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn aged(years: i32) -> Profile {
        let mut p = test_profile();
        p.birth_date = NaiveDate::from_ymd_opt(2026 - years, 1, 15);
        p
    }

    #[test]
    fn no_filters_match_everything() {
        let filters = DiscoveryFilters::default();
        assert!(filters.matches(&test_profile(), today()));
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let filters = DiscoveryFilters {
            min_age: Some(25),
            max_age: Some(30),
            ..Default::default()
        };
        assert!(!filters.matches(&aged(24), today()));
        assert!(filters.matches(&aged(25), today()));
        assert!(filters.matches(&aged(30), today()));
        assert!(!filters.matches(&aged(31), today()));
    }

    #[test]
    fn inverted_age_bounds_match_nothing() {
        let filters = DiscoveryFilters {
            min_age: Some(30),
            max_age: Some(20),
            ..Default::default()
        };
        for years in [18, 20, 25, 30, 40] {
            assert!(!filters.matches(&aged(years), today()));
        }
    }

    #[test]
    fn unknown_age_fails_age_bounds() {
        let filters = DiscoveryFilters {
            min_age: Some(18),
            ..Default::default()
        };
        // test_profile has no birth date
        assert!(!filters.matches(&test_profile(), today()));
    }

    #[test]
    fn gender_is_exact_match() {
        let mut candidate = test_profile();
        candidate.gender = Some("woman".to_string());

        let filters = DiscoveryFilters {
            gender: Some("woman".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&candidate, today()));

        let filters = DiscoveryFilters {
            gender: Some("man".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&candidate, today()));
    }

    #[test]
    fn category_matches_interests_case_insensitively() {
        let mut candidate = test_profile();
        candidate.interests = serde_json::json!(["Hiking", "jazz"]);

        let filters = DiscoveryFilters {
            category: Some("hiking".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&candidate, today()));

        let filters = DiscoveryFilters {
            category: Some("climbing".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&candidate, today()));
    }

    #[test]
    fn negative_bounds_fail_validation() {
        let filters = DiscoveryFilters {
            min_age: Some(-1),
            ..Default::default()
        };
        assert!(filters.validate().is_err());

        let filters = DiscoveryFilters {
            max_distance_km: Some(-5.0),
            ..Default::default()
        };
        assert!(filters.validate().is_err());

        let filters = DiscoveryFilters {
            max_distance_km: Some(f64::NAN),
            ..Default::default()
        };
        assert!(filters.validate().is_err());
    }
}
