//! Spherical projector.
//!
//! Backend map coordinates are treated as an equirectangular projection:
//! `x` spans longitude `[-π, π]`, `z` spans latitude `[-π/2, π/2]`, and `y` is
//! an altitude offset above the surface. Every input is clamped rather than
//! rejected, so noisy telemetry can never produce NaN or sub-surface geometry.

use std::f64::consts::{FRAC_PI_2, PI};

use arcturus_core::{BeaconRecord, PlanetParameters, Position, Result};
use glam::{DQuat, DVec3};
use serde::Serialize;

/// Axis a beacon model points along before it is placed.
pub const CANONICAL_UP: DVec3 = DVec3::Y;

/// Axis used for the half-turn when a beacon points straight down.
pub const ANTIPODAL_AXIS: DVec3 = DVec3::X;

const ANTIPODAL_EPSILON: f64 = 1e-12;

/// Computed world placement of one beacon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    direction: DVec3,
    radius: f64,
    position: DVec3,
    orientation: DQuat,
}

impl Placement {
    /// Unit vector from the planet centre towards the beacon.
    #[must_use]
    pub const fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Distance from the planet centre.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// World position, `direction * radius`.
    #[must_use]
    pub const fn position(&self) -> DVec3 {
        self.position
    }

    /// Rotation taking [`CANONICAL_UP`] onto [`Placement::direction`].
    #[must_use]
    pub const fn orientation(&self) -> DQuat {
        self.orientation
    }
}

/// Pure mapping from backend coordinates to a [`Placement`].
///
/// Holds only validated [`PlanetParameters`]; `Copy`, `Send` and `Sync`, so it
/// can be shared freely between concurrent callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalProjector {
    params: PlanetParameters,
}

impl SphericalProjector {
    /// Build a projector for the given planet.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `params` fails validation.
    pub fn new(params: PlanetParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The planet this projector places beacons on.
    #[must_use]
    pub const fn params(&self) -> &PlanetParameters {
        &self.params
    }

    /// Place a beacon record.
    #[must_use]
    pub fn project(&self, record: &BeaconRecord) -> Placement {
        self.project_position(record.position)
    }

    /// Place raw backend coordinates.
    #[must_use]
    pub fn project_position(&self, position: Position) -> Placement {
        let params = &self.params;

        let x_norm = normalize_planar(position.x, params.map_extent);
        let z_norm = normalize_planar(position.z, params.map_extent);
        let direction = direction_for(x_norm * PI, z_norm * FRAC_PI_2);

        let altitude = clamp_altitude(position.y.max(0.0) * params.altitude_scale, params);
        let radius = (params.radius + altitude).max(params.surface_floor());

        Placement {
            direction,
            radius,
            position: direction * radius,
            orientation: orientation_for(direction),
        }
    }
}

/// Scale a planar coordinate into `[-1, 1]`. NaN maps to the map centre.
fn normalize_planar(value: f64, map_extent: f64) -> f64 {
    let normalized = value / map_extent;
    if normalized.is_nan() {
        0.0
    } else {
        normalized.clamp(-1.0, 1.0)
    }
}

/// Keep an altitude offset under the atmosphere ceiling. NaN maps to the surface.
fn clamp_altitude(altitude: f64, params: &PlanetParameters) -> f64 {
    if altitude.is_nan() {
        0.0
    } else {
        altitude.min(params.altitude_ceiling())
    }
}

/// Unit direction for a longitude/latitude pair, in radians.
#[must_use]
pub fn direction_for(longitude: f64, latitude: f64) -> DVec3 {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();
    DVec3::new(cos_lat * cos_lon, sin_lat, cos_lat * sin_lon)
        .try_normalize()
        .unwrap_or(DVec3::X)
}

/// Shortest-arc rotation taking [`CANONICAL_UP`] onto `direction`.
///
/// Identity when `direction` is up. When `direction` is (within 1e-12 of)
/// straight down, the arc is not unique; this always picks the half-turn about
/// [`ANTIPODAL_AXIS`].
#[must_use]
pub fn orientation_for(direction: DVec3) -> DQuat {
    if direction.dot(CANONICAL_UP) <= -1.0 + ANTIPODAL_EPSILON {
        DQuat::from_axis_angle(ANTIPODAL_AXIS, PI)
    } else {
        DQuat::from_rotation_arc(CANONICAL_UP, direction)
    }
}
