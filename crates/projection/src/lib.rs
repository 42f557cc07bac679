//! Equirectangular projection of beacon coordinates onto the planet sphere.
//!
//! # Example
//!
//! ```
//! use arcturus_core::{PlanetParameters, Position};
//! use arcturus_projection::SphericalProjector;
//!
//! # fn main() -> arcturus_core::Result<()> {
//! let projector = SphericalProjector::new(PlanetParameters::default())?;
//! let placement = projector.project_position(Position::new(0.0, 0.0, 0.0));
//! assert!((placement.radius() - 30.01).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod projector;

pub use projector::{
    ANTIPODAL_AXIS, CANONICAL_UP, Placement, SphericalProjector, direction_for, orientation_for,
};
