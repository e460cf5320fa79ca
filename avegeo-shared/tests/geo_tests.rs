/// Integration tests for geofence geometry and join codes
///
/// These tests exercise the public geo API exactly as the services use
/// it: coordinate validation, membership decisions at realistic
/// distances, and join-code generation.

use avegeo_shared::error::CoreError;
use avegeo_shared::geo::code::{is_join_code_shaped, JoinCodeGenerator, JOIN_CODE_LENGTH};
use avegeo_shared::geo::{haversine_distance_m, is_within_geofence, validate_coordinates};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Lecture hall at the University of Lagos
const CENTER_LAT: f64 = 6.5244;
const CENTER_LON: f64 = 3.3792;

// One degree of latitude is about 111,195 m on the reference sphere
const METERS_PER_DEGREE_LAT: f64 = 111_195.0;

#[test]
fn student_inside_radius_is_admitted() {
    // ~30 m north of center, 100 m radius
    let lat = CENTER_LAT + 30.0 / METERS_PER_DEGREE_LAT;
    assert!(is_within_geofence(lat, CENTER_LON, CENTER_LAT, CENTER_LON, 100.0));
}

#[test]
fn student_beyond_radius_is_rejected() {
    // ~150 m north of center, 100 m radius
    let lat = CENTER_LAT + 150.0 / METERS_PER_DEGREE_LAT;
    assert!(!is_within_geofence(lat, CENTER_LON, CENTER_LAT, CENTER_LON, 100.0));
}

#[test]
fn distance_is_symmetric() {
    let d1 = haversine_distance_m(CENTER_LAT, CENTER_LON, 6.5180, 3.3985);
    let d2 = haversine_distance_m(6.5180, 3.3985, CENTER_LAT, CENTER_LON);
    assert!((d1 - d2).abs() < 1e-6);
}

#[test]
fn malformed_coordinates_are_validation_errors() {
    for (lat, lon) in [
        (91.0, 0.0),
        (-91.0, 0.0),
        (0.0, 181.0),
        (0.0, -181.0),
        (f64::NAN, 0.0),
        (0.0, f64::INFINITY),
    ] {
        assert!(
            matches!(validate_coordinates(lat, lon), Err(CoreError::Validation(_))),
            "({}, {}) should be rejected",
            lat,
            lon
        );
    }

    assert!(validate_coordinates(90.0, 180.0).is_ok());
    assert!(validate_coordinates(-90.0, -180.0).is_ok());
}

#[test]
fn generated_codes_are_well_shaped() {
    let mut codes = JoinCodeGenerator::with_rng(StdRng::seed_from_u64(7));

    for _ in 0..100 {
        let code = codes.generate();
        assert_eq!(code.len(), JOIN_CODE_LENGTH);
        assert!(is_join_code_shaped(&code), "bad code: {}", code);
    }
}
