//! Property-based tests for the projection clamps using proptest.
//!
//! Properties verified:
//! - Radius never drops below the surface floor
//! - Radius never exceeds the clamped atmosphere ceiling
//! - Direction is always a unit vector
//! - Orientation always carries canonical up onto the direction

use arcturus_core::{PlanetParameters, Position};
use arcturus_projection::{CANONICAL_UP, SphericalProjector};
use proptest::prelude::*;

fn planet_parameters() -> impl Strategy<Value = PlanetParameters> {
    (
        0.1f64..1000.0,
        1.0f64..3.0,
        0.1f64..10_000.0,
        0.0f64..10.0,
        0.0f64..5.0,
        0.01f64..=1.0,
    )
        .prop_map(
            |(radius, multiplier, extent, scale, buffer, margin)| PlanetParameters {
                radius,
                atmosphere_multiplier: multiplier,
                map_extent: extent,
                altitude_scale: scale,
                min_surface_buffer: buffer,
                atmosphere_safety_margin: margin,
            },
        )
}

fn coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1.0e6f64..1.0e6,
        -200.0f64..200.0,
        Just(0.0),
        Just(f64::MAX),
        Just(f64::MIN),
    ]
}

proptest! {
    /// Property: the clamped radius stays between the surface floor and the
    /// atmosphere ceiling (the floor wins when the shell is thinner than it).
    #[test]
    fn prop_radius_within_shell(
        params in planet_parameters(),
        x in coordinate(),
        y in coordinate(),
        z in coordinate(),
    ) {
        let projector = SphericalProjector::new(params);
        prop_assert!(projector.is_ok());
        let Ok(projector) = projector else { return Ok(()) };

        let placement = projector.project_position(Position::new(x, y, z));
        let floor = params.radius + params.min_surface_buffer;
        let ceiling = params.radius + params.altitude_ceiling();
        let tolerance = 1e-9 * params.radius.max(1.0);

        prop_assert!(placement.radius() >= floor - tolerance);
        prop_assert!(placement.radius() <= ceiling.max(floor) + tolerance);
    }

    /// Property: the direction is unit length and the orientation rotates
    /// canonical up onto it.
    #[test]
    fn prop_direction_is_unit_and_oriented(
        x in coordinate(),
        y in coordinate(),
        z in coordinate(),
    ) {
        let projector = SphericalProjector::new(PlanetParameters::default());
        let Ok(projector) = projector else {
            return Err(TestCaseError::fail("default parameters must be valid"));
        };

        let placement = projector.project_position(Position::new(x, y, z));
        let direction = placement.direction();

        prop_assert!((direction.length() - 1.0).abs() < 1e-9);
        prop_assert!(placement.position().is_finite());
        prop_assert!((placement.orientation() * CANONICAL_UP).abs_diff_eq(direction, 1e-5));
    }

    /// Property: projection is deterministic.
    #[test]
    fn prop_projection_is_deterministic(x in coordinate(), y in coordinate(), z in coordinate()) {
        let projector = SphericalProjector::new(PlanetParameters::default());
        let Ok(projector) = projector else {
            return Err(TestCaseError::fail("default parameters must be valid"));
        };
        let position = Position::new(x, y, z);

        prop_assert_eq!(projector.project_position(position), projector.project_position(position));
    }
}

#[test]
fn scenario_origin_beacon_sits_on_floor_facing_x() {
    let projector = SphericalProjector::new(PlanetParameters::default());
    assert!(projector.is_ok());
    let placement = projector
        .map(|p| p.project_position(Position::new(0.0, 0.0, 0.0)))
        .ok();

    assert_eq!(placement.map(|p| (p.radius() * 100.0).round()), Some(3001.0));
    assert_eq!(
        placement.map(|p| p.direction().abs_diff_eq(glam::DVec3::X, 1e-12)),
        Some(true)
    );
}

#[test]
fn placement_serializes_as_plain_arrays() {
    let projector = SphericalProjector::new(PlanetParameters::default());
    let json = projector
        .ok()
        .map(|p| p.project_position(Position::new(0.0, 0.0, 0.0)))
        .and_then(|placement| serde_json::to_value(placement).ok());

    let radius = json.as_ref().and_then(|v| v.get("radius")).and_then(serde_json::Value::as_f64);
    let direction_len = json
        .as_ref()
        .and_then(|v| v.get("direction"))
        .and_then(serde_json::Value::as_array)
        .map(Vec::len);

    assert!(radius.is_some_and(|r| (r - 30.01).abs() < 1e-9));
    assert_eq!(direction_len, Some(3));
}
