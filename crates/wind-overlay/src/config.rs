//! Configuration for the wind overlay.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};

/// Default display unit label.
pub const DEFAULT_UNIT: &str = "m/s";

/// Default screen pixels travelled per frame per m/s.
pub const DEFAULT_VELOCITY_SCALE: f64 = 0.3;

/// Default particles per screen pixel (one per 1500 px²).
pub const DEFAULT_PARTICLE_MULTIPLIER: f64 = 1.0 / 1500.0;

/// Default animation frame rate in frames per second.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Options accepted by a wind overlay.
///
/// Field names on the wire follow the overlay's option object
/// (`baseURL`, `VELOCITY_SCALE`, ...); snake_case aliases are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayOptions {
    /// URL of the compressed wind payload.
    #[serde(rename = "baseURL", alias = "base_url")]
    pub base_url: String,

    /// Display unit label. Informational only.
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Screen pixels per frame per m/s.
    #[serde(
        rename = "VELOCITY_SCALE",
        alias = "velocity_scale",
        default = "default_velocity_scale"
    )]
    pub velocity_scale: f64,

    /// Particles per screen pixel.
    #[serde(
        rename = "PARTICLE_MULTIPLIER",
        alias = "particle_multiplier",
        default = "default_particle_multiplier"
    )]
    pub particle_multiplier: f64,

    /// Frames per second driven by the frame ticker.
    #[serde(rename = "FRAME_RATE", alias = "frame_rate", default = "default_frame_rate")]
    pub frame_rate: u32,
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

fn default_velocity_scale() -> f64 {
    DEFAULT_VELOCITY_SCALE
}

fn default_particle_multiplier() -> f64 {
    DEFAULT_PARTICLE_MULTIPLIER
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            unit: default_unit(),
            velocity_scale: DEFAULT_VELOCITY_SCALE,
            particle_multiplier: DEFAULT_PARTICLE_MULTIPLIER,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl OverlayOptions {
    /// Options with the given payload URL and every other field defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load options from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(val) = std::env::var("WIND_BASE_URL") {
            options.base_url = val;
        }

        if let Ok(val) = std::env::var("WIND_UNIT") {
            options.unit = val;
        }

        if let Ok(val) = std::env::var("WIND_VELOCITY_SCALE") {
            if let Ok(scale) = val.parse() {
                options.velocity_scale = scale;
            }
        }

        if let Ok(val) = std::env::var("WIND_PARTICLE_MULTIPLIER") {
            if let Ok(multiplier) = val.parse() {
                options.particle_multiplier = multiplier;
            }
        }

        if let Ok(val) = std::env::var("WIND_FRAME_RATE") {
            if let Ok(rate) = val.parse() {
                options.frame_rate = rate;
            }
        }

        options
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> OverlayResult<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| OverlayError::InvalidConfig(format!("JSON options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> OverlayResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OverlayError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let options: Self = serde_yaml::from_str(&contents).map_err(|e| {
            OverlayError::InvalidConfig(format!("YAML options in {}: {}", path.display(), e))
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(OverlayError::InvalidConfig("baseURL is required".to_string()));
        }

        if !self.velocity_scale.is_finite() || self.velocity_scale <= 0.0 {
            return Err(OverlayError::InvalidConfig(format!(
                "VELOCITY_SCALE must be > 0, got {}",
                self.velocity_scale
            )));
        }

        if !self.particle_multiplier.is_finite() || self.particle_multiplier <= 0.0 {
            return Err(OverlayError::InvalidConfig(format!(
                "PARTICLE_MULTIPLIER must be > 0, got {}",
                self.particle_multiplier
            )));
        }

        if self.frame_rate == 0 || self.frame_rate > 240 {
            return Err(OverlayError::InvalidConfig(format!(
                "FRAME_RATE must be 1-240, got {}",
                self.frame_rate
            )));
        }

        Ok(())
    }

    /// Time between animation frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.frame_rate.max(1) as u64)
    }
}
