/// Haversine distance in km between two lat/lon points (WGS84 degrees).
/// Inputs are assumed validated by the caller.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const R: f64 = 6371.0; // mean Earth radius in km
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    R * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASEL: (f64, f64) = (47.5596, 7.5886);
    const ZURICH: (f64, f64) = (47.3769, 8.5417);

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_km(BASEL.0, BASEL.1, BASEL.0, BASEL.1), 0.0);
        assert_eq!(haversine_km(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = haversine_km(BASEL.0, BASEL.1, ZURICH.0, ZURICH.1);
        let ba = haversine_km(ZURICH.0, ZURICH.1, BASEL.0, BASEL.1);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn basel_to_zurich_is_about_73_km() {
        let km = haversine_km(BASEL.0, BASEL.1, ZURICH.0, ZURICH.1);
        assert!(km > 70.0 && km < 76.0, "got {km}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let km = haversine_km(0.0, 0.0, 0.0, 180.0);
        // half of 2 * pi * 6371
        assert!((km - 20015.0).abs() < 5.0, "got {km}");
    }

    #[test]
    fn distance_is_never_negative() {
        let km = haversine_km(-47.0, -120.0, 85.0, 179.0);
        assert!(km >= 0.0);
    }
}
