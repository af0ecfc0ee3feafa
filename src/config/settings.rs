//! Viewer settings persisted as JSON.
//!
//! A settings file only needs the fields it wants to change; everything
//! else falls back to the defaults.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::beam::BeamStyle;
use crate::surface::{Palette, SurfaceInsets};
use crate::sync::TriggerPolicy;
use crate::timing::{DEFAULT_PIXELS_PER_SECOND, DEFAULT_SPEED_VALUE};

/// Current settings format version.
/// Increment this when making breaking changes to the format.
pub const SETTINGS_VERSION: u32 = 1;

/// Error type for settings operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Incompatible settings version: found {found}, expected <= {expected}")]
    IncompatibleVersion { found: u32, expected: u32 },
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: u32,
    /// Beam speed at 100%, in pixels per second.
    pub nominal_pixels_per_second: f64,
    /// Line predictive beams start from.
    pub header_px: f64,
    /// Fraction of the viewport height taken by the keyboard.
    pub keyboard_fraction: f64,
    /// Inset subtracted from the predictive travel distance.
    pub footer_px: f64,
    pub live_beam_gap_px: f64,
    pub initial_beam_height_px: f64,
    pub corner_radius_px: f64,
    /// Speed slider position at startup.
    pub default_speed_value: f64,
    pub colors: Palette,
    pub trigger_policy: TriggerPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        let insets = SurfaceInsets::default();
        let style = BeamStyle::default();
        Self {
            version: SETTINGS_VERSION,
            nominal_pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            header_px: insets.header_px,
            keyboard_fraction: insets.keyboard_fraction,
            footer_px: insets.footer_px,
            live_beam_gap_px: style.live_gap_px,
            initial_beam_height_px: style.initial_height_px,
            corner_radius_px: style.corner_radius_px,
            default_speed_value: DEFAULT_SPEED_VALUE,
            colors: Palette::default(),
            trigger_policy: TriggerPolicy::default(),
        }
    }
}

impl Settings {
    /// Check if this settings version is compatible with the current format.
    pub fn is_compatible(&self) -> bool {
        self.version <= SETTINGS_VERSION
    }

    /// Reject values the engine cannot animate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.nominal_pixels_per_second.is_finite() && self.nominal_pixels_per_second > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "nominal_pixels_per_second must be positive, got {}",
                self.nominal_pixels_per_second
            )));
        }
        if !(0.0..1.0).contains(&self.keyboard_fraction) {
            return Err(ConfigError::Invalid(format!(
                "keyboard_fraction must be in [0, 1), got {}",
                self.keyboard_fraction
            )));
        }
        let lengths = [
            ("header_px", self.header_px),
            ("footer_px", self.footer_px),
            ("live_beam_gap_px", self.live_beam_gap_px),
            ("initial_beam_height_px", self.initial_beam_height_px),
            ("corner_radius_px", self.corner_radius_px),
        ];
        for (name, value) in lengths {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if !self.default_speed_value.is_finite() {
            return Err(ConfigError::Invalid("default_speed_value must be finite".into()));
        }
        Ok(())
    }

    pub fn insets(&self) -> SurfaceInsets {
        SurfaceInsets {
            header_px: self.header_px,
            keyboard_fraction: self.keyboard_fraction,
            footer_px: self.footer_px,
        }
    }

    pub fn beam_style(&self) -> BeamStyle {
        BeamStyle {
            live_gap_px: self.live_beam_gap_px,
            initial_height_px: self.initial_beam_height_px,
            corner_radius_px: self.corner_radius_px,
        }
    }
}

/// Save settings to a JSON file.
pub fn save_to_file(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load and validate settings from a JSON file.
pub fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&json)?;

    if !settings.is_compatible() {
        return Err(ConfigError::IncompatibleVersion {
            found: settings.version,
            expected: SETTINGS_VERSION,
        });
    }
    settings.validate()?;

    info!("Loaded settings from {}", path.display());
    Ok(settings)
}
