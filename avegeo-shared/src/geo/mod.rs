/// Geofence geometry
///
/// Pure geometric membership testing for circular geofences, plus join
/// code generation.
///
/// # Modules
///
/// - [`code`]: 6-character join code generation with injectable randomness
///
/// # Membership test
///
/// Distance is computed with the haversine great-circle formula, which
/// stays numerically stable at the tens-of-meters radii classroom
/// geofences use. A flat-Earth approximation would bias systematically
/// near the poles and the date line, so it is not used.
///
/// # Example
///
/// ```
/// use avegeo_shared::geo::{haversine_distance_m, is_within_geofence};
///
/// // Point at the geofence center is always within
/// assert!(is_within_geofence(6.5244, 3.3792, 6.5244, 3.3792, 100.0));
///
/// // ~111 km per degree of latitude
/// let d = haversine_distance_m(0.0, 0.0, 1.0, 0.0);
/// assert!((d - 111_195.0).abs() < 100.0);
/// ```

pub mod code;

use crate::error::{CoreError, CoreResult};

/// Mean Earth radius in meters (IUGG)
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Computes the great-circle distance in meters between two coordinates
/// using the haversine formula
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Tests whether a submitted point lies within a circular geofence
///
/// Returns true iff the great-circle distance from (`lat`, `lon`) to
/// (`center_lat`, `center_lon`) is at most `radius_m` meters.
///
/// Callers are responsible for rejecting malformed coordinate ranges
/// first (see [`validate_coordinates`]).
pub fn is_within_geofence(
    lat: f64,
    lon: f64,
    center_lat: f64,
    center_lon: f64,
    radius_m: f64,
) -> bool {
    haversine_distance_m(lat, lon, center_lat, center_lon) <= radius_m
}

/// Rejects coordinates outside the valid latitude/longitude ranges
///
/// # Errors
///
/// Returns `CoreError::Validation` if |lat| > 90 or |lon| > 180, or if
/// either value is not finite.
pub fn validate_coordinates(lat: f64, lon: f64) -> CoreResult<()> {
    if !lat.is_finite() || lat.abs() > 90.0 {
        return Err(CoreError::Validation(format!(
            "Invalid latitude: {}. Latitude must be between -90 and 90.",
            lat
        )));
    }
    if !lon.is_finite() || lon.abs() > 180.0 {
        return Err(CoreError::Validation(format!(
            "Invalid longitude: {}. Longitude must be between -180 and 180.",
            lon
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Geofence used by the campus scenario tests: Yaba, Lagos
    const CENTER_LAT: f64 = 6.5244;
    const CENTER_LON: f64 = 3.3792;

    #[test]
    fn test_distance_is_zero_at_same_point() {
        let d = haversine_distance_m(CENTER_LAT, CENTER_LON, CENTER_LAT, CENTER_LON);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let d1 = haversine_distance_m(6.5244, 3.3792, 6.5250, 3.3800);
        let d2 = haversine_distance_m(6.5250, 3.3800, 6.5244, 3.3792);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_latitude_is_about_111_km() {
        let d = haversine_distance_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn test_submission_at_center_is_within() {
        assert!(is_within_geofence(
            CENTER_LAT, CENTER_LON, CENTER_LAT, CENTER_LON, 100.0
        ));
    }

    #[test]
    fn test_submission_150_meters_away_is_rejected_at_100m_radius() {
        // Offset latitude by 150 m (1 degree of latitude ~ 111,195 m)
        let lat = CENTER_LAT + 150.0 / 111_195.0;
        let d = haversine_distance_m(lat, CENTER_LON, CENTER_LAT, CENTER_LON);
        assert!((d - 150.0).abs() < 1.0, "offset distance was {}", d);

        assert!(!is_within_geofence(lat, CENTER_LON, CENTER_LAT, CENTER_LON, 100.0));
        assert!(is_within_geofence(lat, CENTER_LON, CENTER_LAT, CENTER_LON, 151.0));
    }

    #[test]
    fn test_small_radius_near_date_line() {
        // 50 m east of a point sitting on the antimeridian
        let lon = -179.9999995;
        let d = haversine_distance_m(0.0, 179.99999999, 0.0, lon);
        assert!(d < 100.0, "date-line distance blew up: {}", d);
    }

    #[test]
    fn test_small_radius_near_pole() {
        let d = haversine_distance_m(89.9999, 0.0, 89.9999, 90.0);
        // Two points at 89.9999N separated by 90 degrees of longitude are
        // still only a few meters apart
        assert!(d < 25.0, "polar distance blew up: {}", d);
    }

    #[test]
    fn test_validate_coordinates_ranges() {
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());

        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(0.0, 180.1).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::INFINITY).is_err());
    }
}
