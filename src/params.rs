//! Tuning parameters — the knobs exposed by the control panel
//!
//! The panel writes, everything else only reads. Each knob has a
//! [`ParamSpec`] with its range and step so the panel can build sliders
//! without knowing the struct layout.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfigError, SceneError};

/// Environment variable naming a JSON preset file (native)
pub const PARAMS_ENV: &str = "GALAXY_PARAMS";

/// Range and step of one numeric knob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamSpec {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Numeric knobs in panel order. Colors are handled separately.
pub const PARAM_SPECS: &[ParamSpec] = &[
    ParamSpec { name: "star_count", label: "Stars", min: 0.0, max: 100_000.0, step: 1000.0 },
    ParamSpec { name: "sparkle_count", label: "Sparkles", min: 0.0, max: 1000.0, step: 10.0 },
    ParamSpec { name: "sparkle_size", label: "Sparkle size", min: 0.5, max: 12.0, step: 0.5 },
    ParamSpec { name: "sparkle_speed", label: "Sparkle speed", min: 0.0, max: 2.0, step: 0.05 },
    ParamSpec { name: "light_intensity", label: "Light intensity", min: 0.0, max: 5.0, step: 0.1 },
    ParamSpec { name: "rotate_speed", label: "Rotation", min: 0.0, max: 0.01, step: 0.0005 },
    ParamSpec { name: "density", label: "Density", min: 0.0, max: 3.0, step: 0.05 },
    ParamSpec { name: "spiral", label: "Spiral", min: 0.0, max: 10.0, step: 0.1 },
    ParamSpec { name: "bloom_intensity", label: "Bloom", min: 0.0, max: 5.0, step: 0.1 },
];

/// Look up the spec for a knob by name
pub fn spec(name: &str) -> Option<&'static ParamSpec> {
    PARAM_SPECS.iter().find(|s| s.name == name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningParameters {
    pub star_count: u32,
    pub sparkle_count: u32,
    pub sparkle_size: f32,
    pub sparkle_speed: f32,
    pub light_intensity: f32,
    /// Linear RGB in [0, 1]
    pub light_color: [f32; 3],
    /// Radians added to the group rotation per frame tick
    pub rotate_speed: f32,
    pub density: f32,
    pub spiral: f32,
    pub bloom_intensity: f32,
}

impl Default for TuningParameters {
    fn default() -> Self {
        Self {
            star_count: 30_000,
            sparkle_count: 200,
            sparkle_size: 4.0,
            sparkle_speed: 0.4,
            light_intensity: 1.5,
            light_color: [1.0, 0.85, 0.6],
            rotate_speed: 0.001,
            density: 1.0,
            spiral: 3.0,
            bloom_intensity: 1.5,
        }
    }
}

impl TuningParameters {
    /// Current value of a numeric knob
    pub fn get(&self, name: &str) -> Option<f64> {
        let v = match name {
            "star_count" => self.star_count as f64,
            "sparkle_count" => self.sparkle_count as f64,
            "sparkle_size" => self.sparkle_size as f64,
            "sparkle_speed" => self.sparkle_speed as f64,
            "light_intensity" => self.light_intensity as f64,
            "rotate_speed" => self.rotate_speed as f64,
            "density" => self.density as f64,
            "spiral" => self.spiral as f64,
            "bloom_intensity" => self.bloom_intensity as f64,
            _ => return None,
        };
        Some(v)
    }

    /// Set a numeric knob, clamped to its spec. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        let Some(spec) = spec(name) else {
            return false;
        };
        let value = spec.clamp(value);
        match name {
            "star_count" => self.star_count = value.round() as u32,
            "sparkle_count" => self.sparkle_count = value.round() as u32,
            "sparkle_size" => self.sparkle_size = value as f32,
            "sparkle_speed" => self.sparkle_speed = value as f32,
            "light_intensity" => self.light_intensity = value as f32,
            "rotate_speed" => self.rotate_speed = value as f32,
            "density" => self.density = value as f32,
            "spiral" => self.spiral = value as f32,
            "bloom_intensity" => self.bloom_intensity = value as f32,
            _ => return false,
        }
        true
    }

    /// Clamp every knob into its declared range.
    /// Non-finite values are left alone for [`validate`](Self::validate) to reject.
    pub fn clamped(mut self) -> Self {
        for spec in PARAM_SPECS {
            if let Some(v) = self.get(spec.name) {
                if v.is_finite() {
                    self.set(spec.name, v);
                }
            }
        }
        for c in &mut self.light_color {
            if c.is_finite() {
                *c = c.clamp(0.0, 1.0);
            }
        }
        self
    }

    /// Reject values the shaders cannot consume.
    pub fn validate(&self) -> Result<(), SceneError> {
        for spec in PARAM_SPECS {
            let v = self.get(spec.name).unwrap_or(f64::NAN);
            if !v.is_finite() {
                return Err(SceneError::InvalidParameter { name: spec.name, value: v });
            }
        }
        if let Some(&c) = self.light_color.iter().find(|c| !c.is_finite()) {
            return Err(SceneError::InvalidParameter { name: "light_color", value: c as f64 });
        }
        Ok(())
    }

    /// Parse a JSON preset; missing keys take defaults, values are clamped.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json)?;
        Ok(params.clamped())
    }

    /// Initial parameters: the preset if one is configured, otherwise defaults.
    pub fn load() -> Self {
        match Self::load_preset() {
            Ok(Some(params)) => {
                info!(star_count = params.star_count, "Tuning preset loaded");
                params
            }
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "Ignoring tuning preset, using defaults");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load_preset() -> Result<Option<Self>, ConfigError> {
        let Ok(path) = std::env::var(PARAMS_ENV) else {
            return Ok(None);
        };
        info!(path = %path, "Reading tuning preset");
        let json = std::fs::read_to_string(&path)?;
        Self::from_json(&json).map(Some)
    }

    #[cfg(target_arch = "wasm32")]
    fn load_preset() -> Result<Option<Self>, ConfigError> {
        let json = js_sys::eval("window.__galaxy_params")
            .ok()
            .and_then(|v| v.as_string());
        match json {
            Some(json) => Self::from_json(&json).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_spec_has_a_readable_value() {
        let params = TuningParameters::default();
        for spec in PARAM_SPECS {
            let v = params.get(spec.name).unwrap();
            assert!(v >= spec.min && v <= spec.max, "{} default {} out of range", spec.name, v);
        }
    }

    #[test]
    fn set_clamps_to_range() {
        let mut params = TuningParameters::default();
        assert!(params.set("density", 99.0));
        assert_eq!(params.density, 3.0);
        assert!(params.set("star_count", -5.0));
        assert_eq!(params.star_count, 0);
        assert!(!params.set("no_such_knob", 1.0));
    }

    #[test]
    fn json_missing_keys_take_defaults() {
        let params = TuningParameters::from_json(r#"{"spiral": 5.5}"#).unwrap();
        assert_eq!(params.spiral, 5.5);
        assert_eq!(params.star_count, 30_000);
    }

    #[test]
    fn json_out_of_range_is_clamped() {
        let params =
            TuningParameters::from_json(r#"{"star_count": 500000, "light_color": [2.0, 0.5, -1.0]}"#)
                .unwrap();
        assert_eq!(params.star_count, 100_000);
        assert_eq!(params.light_color, [1.0, 0.5, 0.0]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            TuningParameters::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validate_rejects_nan() {
        let mut params = TuningParameters::default();
        params.density = f32::NAN;
        assert!(matches!(
            params.validate(),
            Err(SceneError::InvalidParameter { name: "density", .. })
        ));
        assert!(TuningParameters::default().validate().is_ok());
    }
}
