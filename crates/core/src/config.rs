//! Planet parameters and station configuration.
//!
//! Configuration is validated once, up front. Anything that would produce
//! degenerate geometry is rejected here so the projector never sees it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::result::Result;

/// Default planet radius in world units.
pub const DEFAULT_RADIUS: f64 = 30.0;
/// Default outer atmosphere radius as a multiple of the planet radius.
pub const DEFAULT_ATMOSPHERE_MULTIPLIER: f64 = 1.35;
/// Default normalization divisor for planar backend coordinates.
pub const DEFAULT_MAP_EXTENT: f64 = 100.0;
/// Default world units per backend altitude unit.
pub const DEFAULT_ALTITUDE_SCALE: f64 = 0.25;
/// Default minimum clearance above the surface.
pub const DEFAULT_MIN_SURFACE_BUFFER: f64 = 0.01;
/// Default fraction of the atmosphere shell a beacon may climb into.
pub const DEFAULT_ATMOSPHERE_SAFETY_MARGIN: f64 = 0.9;

/// Geometry of the rendered planet, consumed by the projector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanetParameters {
    /// Planet radius, > 0.
    pub radius: f64,
    /// Outer atmosphere radius is `radius * atmosphere_multiplier`, >= 1.
    pub atmosphere_multiplier: f64,
    /// Planar coordinates are divided by this before projection, > 0.
    pub map_extent: f64,
    /// Scale applied to the altitude channel, >= 0.
    pub altitude_scale: f64,
    /// Minimum clearance above the surface, >= 0.
    pub min_surface_buffer: f64,
    /// Fraction of the atmosphere shell usable for altitude, in (0, 1].
    pub atmosphere_safety_margin: f64,
}

impl Default for PlanetParameters {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            atmosphere_multiplier: DEFAULT_ATMOSPHERE_MULTIPLIER,
            map_extent: DEFAULT_MAP_EXTENT,
            altitude_scale: DEFAULT_ALTITUDE_SCALE,
            min_surface_buffer: DEFAULT_MIN_SURFACE_BUFFER,
            atmosphere_safety_margin: DEFAULT_ATMOSPHERE_SAFETY_MARGIN,
        }
    }
}

impl PlanetParameters {
    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("radius", self.radius),
            ("atmosphere_multiplier", self.atmosphere_multiplier),
            ("map_extent", self.map_extent),
            ("altitude_scale", self.altitude_scale),
            ("min_surface_buffer", self.min_surface_buffer),
            ("atmosphere_safety_margin", self.atmosphere_safety_margin),
        ];
        if let Some((field, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(Error::invalid_config(*field, format!("must be finite, got {value}")));
        }

        if self.radius <= 0.0 {
            return Err(Error::invalid_config(
                "radius",
                format!("must be > 0, got {}", self.radius),
            ));
        }
        if self.atmosphere_multiplier < 1.0 {
            return Err(Error::invalid_config(
                "atmosphere_multiplier",
                format!("must be >= 1, got {}", self.atmosphere_multiplier),
            ));
        }
        if self.map_extent <= 0.0 {
            return Err(Error::invalid_config(
                "map_extent",
                format!("must be > 0, got {}", self.map_extent),
            ));
        }
        if self.altitude_scale < 0.0 {
            return Err(Error::invalid_config(
                "altitude_scale",
                format!("must be >= 0, got {}", self.altitude_scale),
            ));
        }
        if self.min_surface_buffer < 0.0 {
            return Err(Error::invalid_config(
                "min_surface_buffer",
                format!("must be >= 0, got {}", self.min_surface_buffer),
            ));
        }
        if self.atmosphere_safety_margin <= 0.0 || self.atmosphere_safety_margin > 1.0 {
            return Err(Error::invalid_config(
                "atmosphere_safety_margin",
                format!("must be in (0, 1], got {}", self.atmosphere_safety_margin),
            ));
        }
        Ok(())
    }

    /// Validate and return self.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if any field is out of range.
    pub fn validated(self) -> Result<Self> {
        self.validate().map(|()| self)
    }

    /// Radius of the outer atmosphere shell.
    #[must_use]
    pub fn atmosphere_radius(&self) -> f64 {
        self.radius * self.atmosphere_multiplier
    }

    /// Largest altitude offset a beacon may take above the surface.
    #[must_use]
    pub fn altitude_ceiling(&self) -> f64 {
        (self.atmosphere_radius() - self.radius) * self.atmosphere_safety_margin
    }

    /// Smallest distance from the planet centre a beacon may sit at.
    #[must_use]
    pub fn surface_floor(&self) -> f64 {
        self.radius + self.min_surface_buffer
    }
}

/// Settings for the snapshot feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedSettings {
    /// Capacity of the snapshot channel.
    pub channel_capacity: usize,
    /// Delay between replayed snapshots, in milliseconds. Zero replays at once.
    pub replay_interval_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            replay_interval_ms: 0,
        }
    }
}

/// Settings for the reconciliation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerSettings {
    /// Consecutive consumer failures tolerated before the loop gives up.
    pub max_sink_errors: usize,
    /// Stop on the first consumer failure.
    pub stop_on_sink_error: bool,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            max_sink_errors: 10,
            stop_on_sink_error: false,
        }
    }
}

/// Complete station configuration, as loaded from TOML.
///
/// Every section uses snake_case keys; unknown keys are rejected.
///
/// ```toml
/// [planet]
/// radius = 30.0
/// atmosphere_multiplier = 1.35
///
/// [feed]
/// channel_capacity = 64
///
/// [reconciler]
/// max_sink_errors = 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StationConfig {
    pub planet: PlanetParameters,
    pub feed: FeedSettings,
    pub reconciler: ReconcilerSettings,
}

impl StationConfig {
    /// Parse and validate a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TomlParseFailed`] on malformed TOML and
    /// [`Error::InvalidConfig`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::toml_parse_failed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigReadFailed`] if the file cannot be read, plus
    /// any error of [`StationConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config_read_failed(path, e.to_string()))?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "Loaded station config");
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        self.planet.validate()?;
        if self.feed.channel_capacity == 0 {
            return Err(Error::invalid_config(
                "feed.channel_capacity",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(PlanetParameters::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let params = PlanetParameters {
            radius: 0.0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn test_rejects_non_positive_map_extent() {
        let params = PlanetParameters {
            map_extent: -5.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_safety_margin_bounds() {
        let zero = PlanetParameters {
            atmosphere_safety_margin: 0.0,
            ..Default::default()
        };
        let above_one = PlanetParameters {
            atmosphere_safety_margin: 1.01,
            ..Default::default()
        };
        let one = PlanetParameters {
            atmosphere_safety_margin: 1.0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
        assert!(above_one.validate().is_err());
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_rejects_thin_atmosphere_multiplier() {
        let params = PlanetParameters {
            atmosphere_multiplier: 0.9,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let params = PlanetParameters {
            altitude_scale: f64::NAN,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("altitude_scale"));
    }

    #[test]
    fn test_derived_radii() {
        let params = PlanetParameters::default();
        assert!((params.atmosphere_radius() - 40.5).abs() < 1e-9);
        assert!((params.altitude_ceiling() - 9.45).abs() < 1e-9);
        assert!((params.surface_floor() - 30.01).abs() < 1e-9);
    }

    #[test]
    fn test_station_config_partial_toml_uses_defaults() {
        let config = StationConfig::from_toml_str(
            r"
            [planet]
            radius = 50.0
            map_extent = 200.0
            ",
        )
        .unwrap();

        assert!((config.planet.radius - 50.0).abs() < f64::EPSILON);
        assert!((config.planet.map_extent - 200.0).abs() < f64::EPSILON);
        assert!((config.planet.altitude_scale - DEFAULT_ALTITUDE_SCALE).abs() < f64::EPSILON);
        assert_eq!(config.feed, FeedSettings::default());
    }

    #[test]
    fn test_station_config_rejects_invalid_planet() {
        let err = StationConfig::from_toml_str("[planet]\nradius = -1.0\n").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_station_config_rejects_zero_capacity() {
        let err = StationConfig::from_toml_str("[feed]\nchannel_capacity = 0\n").unwrap_err();
        assert!(err.to_string().contains("channel_capacity"));
    }

    #[test]
    fn test_station_config_uses_snake_case_throughout() {
        let config = StationConfig::from_toml_str(
            r"
            [planet]
            atmosphere_multiplier = 1.5
            min_surface_buffer = 0.05

            [feed]
            channel_capacity = 8

            [reconciler]
            max_sink_errors = 3
            ",
        )
        .unwrap();

        assert!((config.planet.atmosphere_multiplier - 1.5).abs() < f64::EPSILON);
        assert!((config.planet.min_surface_buffer - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.feed.channel_capacity, 8);
        assert_eq!(config.reconciler.max_sink_errors, 3);
    }

    #[test]
    fn test_station_config_rejects_unknown_keys() {
        let err = StationConfig::from_toml_str("[planet]
atmosphereMultiplier = 1.5
").unwrap_err();
        assert!(matches!(err, Error::TomlParseFailed { .. }));
        assert!(err.to_string().contains("atmosphereMultiplier"));
    }

    #[test]
    fn test_station_config_malformed_toml() {
        let err = StationConfig::from_toml_str("[planet\nradius = ").unwrap_err();
        assert!(matches!(err, Error::TomlParseFailed { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.toml");
        std::fs::write(&path, "[reconciler]\nstop_on_sink_error = true\n").unwrap();

        let config = StationConfig::load(&path).unwrap();
        assert!(config.reconciler.stop_on_sink_error);
    }

    #[test]
    fn test_load_missing_file() {
        let err = StationConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigReadFailed { .. }));
    }
}
