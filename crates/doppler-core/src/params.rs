//! Simulation parameters with their reference defaults.
//!
//! Every field has a default, so a TOML file only needs to list what it
//! changes:
//!
//! ```toml
//! time_scale = 1.0
//! heard_reset = "on-emission"
//!
//! [source]
//! frequency = 2.0
//! velocity = [120.0, 0.0]
//! ```

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AGGREGATION_INTERVAL, CROSSING_MARGIN, RETIREMENT_DISTANCE, SOUND_SPEED, WAVE_CAPACITY,
};
use crate::error::ConfigError;
use crate::perception::HeardResetPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DopplerParams {
    /// Wavefront propagation speed (units per second).
    pub sound_speed: f32,
    /// Maximum number of simultaneously alive wavefronts.
    pub wave_capacity: usize,
    /// Radius past which a wavefront is retired.
    pub retirement_distance: f32,
    /// Perception window length in seconds.
    pub aggregation_interval: f32,
    /// Lead past the observer before a wavefront counts as confirmed-crossed.
    pub crossing_margin: f32,
    /// Derive perceived volume from the nearest newly heard wavefront.
    pub track_volume: bool,
    pub heard_reset: HeardResetPolicy,
    /// Initial multiplier from wall-clock frame time to simulated time.
    pub time_scale: f32,
    pub min_time_scale: f32,
    pub max_time_scale: f32,
    /// Per-axis velocity limit for both bodies.
    pub max_body_speed: f32,
    pub source: SourceParams,
    pub observer: ObserverParams,
    pub controls: ControlParams,
    pub audio: AudioParams,
}

impl Default for DopplerParams {
    fn default() -> Self {
        Self {
            sound_speed: SOUND_SPEED,
            wave_capacity: WAVE_CAPACITY,
            retirement_distance: RETIREMENT_DISTANCE,
            aggregation_interval: AGGREGATION_INTERVAL,
            crossing_margin: CROSSING_MARGIN,
            track_volume: true,
            heard_reset: HeardResetPolicy::EveryWindow,
            time_scale: 0.3,
            min_time_scale: 0.0,
            max_time_scale: 10.0,
            max_body_speed: 3.0 * SOUND_SPEED,
            source: SourceParams::default(),
            observer: ObserverParams::default(),
            controls: ControlParams::default(),
            audio: AudioParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceParams {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Emission rate in wavefronts per second. Zero means silent.
    pub frequency: f32,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            position: Vec2::new(100.0, 200.0),
            velocity: Vec2::ZERO,
            frequency: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverParams {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Default for ObserverParams {
    fn default() -> Self {
        Self {
            position: Vec2::new(300.0, 200.0),
            velocity: Vec2::ZERO,
        }
    }
}

/// Size of the delta applied per tick while a control is held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlParams {
    pub frequency_step: f32,
    pub velocity_step: f32,
    pub time_scale_step: f32,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            frequency_step: 1.0,
            velocity_step: SOUND_SPEED / 10.0,
            time_scale_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioParams {
    pub enabled: bool,
    /// Master gain applied on top of the perceived volume (0–1).
    pub gain: f32,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            enabled: true,
            gain: 0.5,
        }
    }
}

impl DopplerParams {
    /// Parse parameters from TOML text and validate them.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sound_speed > 0.0) {
            return Err(ConfigError::invalid("sound_speed", "must be > 0"));
        }
        if self.wave_capacity == 0 {
            return Err(ConfigError::invalid("wave_capacity", "must be > 0"));
        }
        if !(self.retirement_distance > 0.0) {
            return Err(ConfigError::invalid("retirement_distance", "must be > 0"));
        }
        if !(self.aggregation_interval > 0.0) {
            return Err(ConfigError::invalid("aggregation_interval", "must be > 0"));
        }
        if !(self.crossing_margin >= 0.0) {
            return Err(ConfigError::invalid("crossing_margin", "must be >= 0"));
        }
        if !(self.min_time_scale >= 0.0) {
            return Err(ConfigError::invalid(
                "min_time_scale",
                "must be >= 0 so time never runs backwards",
            ));
        }
        if self.min_time_scale > self.max_time_scale {
            return Err(ConfigError::invalid(
                "max_time_scale",
                format!("must be >= min_time_scale ({})", self.min_time_scale),
            ));
        }
        if !(self.min_time_scale..=self.max_time_scale).contains(&self.time_scale) {
            return Err(ConfigError::invalid(
                "time_scale",
                format!(
                    "{} is outside [{}, {}]",
                    self.time_scale, self.min_time_scale, self.max_time_scale
                ),
            ));
        }
        if !(self.max_body_speed > 0.0) {
            return Err(ConfigError::invalid("max_body_speed", "must be > 0"));
        }
        for (field, velocity) in [
            ("source.velocity", self.source.velocity),
            ("observer.velocity", self.observer.velocity),
        ] {
            if velocity.abs().max_element() > self.max_body_speed {
                return Err(ConfigError::invalid(
                    field,
                    format!("components must be within ±{}", self.max_body_speed),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.audio.gain) {
            return Err(ConfigError::invalid("audio.gain", "must be within [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = DopplerParams::default();
        params.validate().expect("defaults must validate");
        assert_eq!(params.wave_capacity, 500);
        assert_eq!(params.controls.velocity_step, 34.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let params = DopplerParams::from_toml_str(
            r#"
            time_scale = 1.0
            heard_reset = "on-emission"

            [source]
            frequency = 2.0
            velocity = [120.0, 0.0]
            "#,
        )
        .unwrap();

        assert_eq!(params.time_scale, 1.0);
        assert_eq!(params.heard_reset, HeardResetPolicy::OnEmission);
        assert_eq!(params.source.frequency, 2.0);
        assert_eq!(params.source.velocity, Vec2::new(120.0, 0.0));
        assert_eq!(params.source.position, Vec2::new(100.0, 200.0));
        assert_eq!(params.observer, ObserverParams::default());
        assert_eq!(params.sound_speed, SOUND_SPEED);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let params = DopplerParams::from_toml_str("").unwrap();
        assert_eq!(params, DopplerParams::default());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = DopplerParams::from_toml_str("sound_speed = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "sound_speed", .. }), "{err}");

        let err = DopplerParams::from_toml_str("wave_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "wave_capacity", .. }), "{err}");

        let err = DopplerParams::from_toml_str("time_scale = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "time_scale", .. }), "{err}");

        let err = DopplerParams::from_toml_str("[audio]\ngain = 2.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "audio.gain", .. }), "{err}");
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = DopplerParams::from_toml_str("sound_speed = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = DopplerParams::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    }
}
