use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::geo::haversine_km;
use crate::models::Profile;

use super::filters::DiscoveryFilters;

/// Public projection of a candidate profile returned by discovery.
/// `distance_km` is only present when both sides are geolocated.
#[derive(Debug, Serialize)]
pub struct ProfileCard {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub location: Option<String>,
    pub photos: Vec<String>,
    pub primary_photo: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub relationship_goal: Option<String>,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub is_online: bool,
}

impl ProfileCard {
    pub fn new(profile: &Profile, distance_km: Option<f64>, today: NaiveDate) -> Self {
        Self {
            user_id: profile.user_id,
            display_name: profile.display_name.clone(),
            age: profile.age_on(today),
            gender: profile.gender.clone(),
            bio: profile.bio.clone(),
            interests: profile.interests_vec(),
            location: profile.location.clone(),
            photos: profile.photos_vec(),
            primary_photo: profile.primary_photo(),
            occupation: profile.occupation.clone(),
            education: profile.education.clone(),
            relationship_goal: profile.relationship_goal.clone(),
            languages: profile.languages_vec(),
            // displayed to a tenth of a km; gating above uses the raw value
            distance_km: distance_km.map(|km| (km * 10.0).round() / 10.0),
            is_online: profile.is_online,
        }
    }
}

/// Rank a candidate pool for one requester. Pure: exclusions against
/// persisted state (self, already swiped, blocks) happen in the route before
/// the pool reaches this function, which makes the ranking deterministic for
/// a fixed pool and directly testable.
///
/// Ordering: geolocated candidates ascending by distance, then everyone else
/// in pool order. When the requester has no coordinates, distance is skipped
/// entirely: no filter, no sort, no `distance_km` on the cards.
pub fn rank_candidates(
    requester: &Profile,
    candidates: Vec<Profile>,
    filters: &DiscoveryFilters,
    include_ungeolocated: bool,
    limit: usize,
) -> Vec<ProfileCard> {
    let today = Utc::now().date_naive();
    let requester_coords = requester.coordinates();

    let mut cards: Vec<ProfileCard> = Vec::new();
    for candidate in &candidates {
        if candidate.user_id == requester.user_id {
            continue;
        }
        if !filters.matches(candidate, today) {
            continue;
        }

        let distance_km = match (requester_coords, candidate.coordinates()) {
            (Some((lat1, lon1)), Some((lat2, lon2))) => {
                Some(haversine_km(lat1, lon1, lat2, lon2))
            }
            _ => None,
        };

        if requester_coords.is_some() {
            if let Some(max_km) = filters.max_distance_km {
                match distance_km {
                    Some(km) if km > max_km => continue,
                    None if !include_ungeolocated => continue,
                    _ => {}
                }
            }
        }

        cards.push(ProfileCard::new(candidate, distance_km, today));
    }

    // Stable: the non-geolocated tail keeps pool order.
    cards.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    cards.truncate(limit);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::test_profile;

    const BASEL: (f64, f64) = (47.5596, 7.5886);
    const ZURICH: (f64, f64) = (47.3769, 8.5417);
    const FREIBURG: (f64, f64) = (47.9990, 7.8421);

    fn at(coords: (f64, f64)) -> Profile {
        let mut p = test_profile();
        p.latitude = Some(coords.0);
        p.longitude = Some(coords.1);
        p
    }

    fn no_filters() -> DiscoveryFilters {
        DiscoveryFilters::default()
    }

    #[test]
    fn requester_never_appears_in_results() {
        let requester = test_profile();
        let mut clone = requester.clone();
        clone.display_name = Some("self".to_string());

        let cards = rank_candidates(&requester, vec![clone, test_profile()], &no_filters(), true, 10);
        assert_eq!(cards.len(), 1);
        assert_ne!(cards[0].user_id, requester.user_id);
    }

    #[test]
    fn max_distance_excludes_far_candidates() {
        let requester = at(BASEL);
        let zurich = at(ZURICH);
        let zurich_id = zurich.user_id;

        let filters = DiscoveryFilters {
            max_distance_km: Some(50.0),
            ..Default::default()
        };
        let cards = rank_candidates(&requester, vec![zurich.clone()], &filters, true, 10);
        assert!(cards.is_empty(), "Zurich is ~73km from Basel, 50km must exclude it");

        let filters = DiscoveryFilters {
            max_distance_km: Some(100.0),
            ..Default::default()
        };
        let cards = rank_candidates(&requester, vec![zurich], &filters, true, 10);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].user_id, zurich_id);
        let km = cards[0].distance_km.unwrap();
        assert!(km > 70.0 && km < 76.0, "got {km}");
    }

    #[test]
    fn ungeolocated_candidate_passes_distance_filter_by_default() {
        let requester = at(BASEL);
        let unlocated = test_profile();

        let filters = DiscoveryFilters {
            max_distance_km: Some(50.0),
            ..Default::default()
        };
        let cards = rank_candidates(&requester, vec![unlocated], &filters, true, 10);
        assert_eq!(cards.len(), 1);
        assert!(cards[0].distance_km.is_none());
    }

    #[test]
    fn ungeolocated_candidate_can_be_excluded_via_config() {
        let requester = at(BASEL);
        let unlocated = test_profile();

        let filters = DiscoveryFilters {
            max_distance_km: Some(50.0),
            ..Default::default()
        };
        let cards = rank_candidates(&requester, vec![unlocated], &filters, false, 10);
        assert!(cards.is_empty());
    }

    #[test]
    fn unlocated_requester_skips_distance_entirely() {
        let requester = test_profile();
        let zurich = at(ZURICH);

        // A distance filter cannot gate anything without requester coordinates.
        let filters = DiscoveryFilters {
            max_distance_km: Some(1.0),
            ..Default::default()
        };
        let cards = rank_candidates(&requester, vec![zurich], &filters, false, 10);
        assert_eq!(cards.len(), 1);
        assert!(cards[0].distance_km.is_none());
    }

    #[test]
    fn sorts_nearest_first_with_unlocated_tail() {
        let requester = at(BASEL);

        let zurich = at(ZURICH);
        let freiburg = at(FREIBURG);
        let unlocated_a = test_profile();
        let unlocated_b = test_profile();
        let (a_id, b_id) = (unlocated_a.user_id, unlocated_b.user_id);
        let (zurich_id, freiburg_id) = (zurich.user_id, freiburg.user_id);

        let cards = rank_candidates(
            &requester,
            vec![unlocated_a, zurich, unlocated_b, freiburg],
            &no_filters(),
            true,
            10,
        );

        let order: Vec<Uuid> = cards.iter().map(|c| c.user_id).collect();
        // Freiburg (~50km) before Zurich (~73km), then the unlocated pair in pool order.
        assert_eq!(order, vec![freiburg_id, zurich_id, a_id, b_id]);
    }

    #[test]
    fn truncates_to_limit() {
        let requester = test_profile();
        let pool: Vec<Profile> = (0..10).map(|_| test_profile()).collect();

        let cards = rank_candidates(&requester, pool, &no_filters(), true, 3);
        assert_eq!(cards.len(), 3);
    }

    #[test]
    fn inverted_age_bounds_return_empty() {
        let requester = test_profile();
        let mut candidate = test_profile();
        candidate.birth_date = NaiveDate::from_ymd_opt(2000, 1, 1);

        let filters = DiscoveryFilters {
            min_age: Some(30),
            max_age: Some(20),
            ..Default::default()
        };
        let cards = rank_candidates(&requester, vec![candidate], &filters, true, 10);
        assert!(cards.is_empty());
    }

    #[test]
    fn combined_filters_use_and_semantics() {
        let requester = test_profile();

        let mut fits = test_profile();
        fits.birth_date = NaiveDate::from_ymd_opt(1998, 3, 1);
        fits.gender = Some("woman".to_string());
        fits.interests = serde_json::json!(["hiking"]);
        let fits_id = fits.user_id;

        let mut wrong_gender = fits.clone();
        wrong_gender.id = Uuid::new_v4();
        wrong_gender.user_id = Uuid::new_v4();
        wrong_gender.gender = Some("man".to_string());

        let filters = DiscoveryFilters {
            category: Some("hiking".to_string()),
            min_age: Some(25),
            max_age: Some(35),
            gender: Some("woman".to_string()),
            ..Default::default()
        };
        let cards = rank_candidates(&requester, vec![fits, wrong_gender], &filters, true, 10);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].user_id, fits_id);
    }

    #[test]
    fn repeated_ranking_is_idempotent() {
        let requester = at(BASEL);
        let pool = vec![at(ZURICH), test_profile(), at(FREIBURG)];

        let first: Vec<Uuid> = rank_candidates(&requester, pool.clone(), &no_filters(), true, 10)
            .iter()
            .map(|c| c.user_id)
            .collect();
        let second: Vec<Uuid> = rank_candidates(&requester, pool, &no_filters(), true, 10)
            .iter()
            .map(|c| c.user_id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn distance_is_rounded_for_display() {
        let requester = at(BASEL);
        let zurich = at(ZURICH);

        let cards = rank_candidates(&requester, vec![zurich], &no_filters(), true, 10);
        let km = cards[0].distance_km.unwrap();
        assert_eq!((km * 10.0).round() / 10.0, km);
    }
}
