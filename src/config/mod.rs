//! Configuration management for touchstick
//!
//! Handles loading, parsing and validation of YAML joystick layouts.

mod error;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub use error::ConfigError;

use crate::input::geometry::Rect;
use crate::input::joystick::{JoystickMode, DEFAULT_TAP_TIME_DELTA};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub joysticks: Vec<JoystickConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire: Option<FireConfig>,
}

/// Static configuration of one virtual joystick
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JoystickConfig {
    pub name: String,
    #[serde(default = "default_mode")]
    pub mode: JoystickMode,
    /// Hit region in screen pixels (pad mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub touch_zone: Option<Rect>,
    /// Graphic placement in screen pixels; the hit region for fixed mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphic: Option<Rect>,
    #[serde(default)]
    pub dead_zone: f32,
    #[serde(default)]
    pub normalize: bool,
    #[serde(default = "default_tap_time_delta")]
    pub tap_time_delta: f32,
}

/// Fire trigger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FireConfig {
    /// Joystick whose latch fires; the fallback button is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joystick: Option<String>,
    #[serde(default = "default_fire_delay")]
    pub fire_delay: f32,
}

impl AppConfig {
    /// Load configuration from file with validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml_str(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.joysticks.is_empty() {
            return Err(ConfigError::NoJoysticks);
        }

        let mut names = HashSet::new();
        for joystick in &self.joysticks {
            joystick.validate()?;
            if !names.insert(joystick.name.as_str()) {
                return Err(ConfigError::DuplicateName(joystick.name.clone()));
            }
        }

        if let Some(fire) = &self.fire {
            if !fire.fire_delay.is_finite() || fire.fire_delay < 0.0 {
                return Err(ConfigError::InvalidFireDelay(fire.fire_delay));
            }
            if let Some(name) = &fire.joystick {
                if !names.contains(name.as_str()) {
                    return Err(ConfigError::UnknownFireJoystick(name.clone()));
                }
            }
        }

        Ok(())
    }
}

impl JoystickConfig {
    /// Pad joystick covering `zone`
    pub fn pad(name: impl Into<String>, zone: Rect) -> Self {
        Self {
            name: name.into(),
            mode: JoystickMode::Pad,
            touch_zone: Some(zone),
            graphic: None,
            dead_zone: 0.0,
            normalize: false,
            tap_time_delta: DEFAULT_TAP_TIME_DELTA,
        }
    }

    /// Fixed joystick whose graphic sits at `graphic`
    pub fn fixed(name: impl Into<String>, graphic: Rect) -> Self {
        Self {
            name: name.into(),
            mode: JoystickMode::Fixed,
            touch_zone: None,
            graphic: Some(graphic),
            dead_zone: 0.0,
            normalize: false,
            tap_time_delta: DEFAULT_TAP_TIME_DELTA,
        }
    }

    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Hit region: the touch zone for pads, the graphic for fixed joysticks,
    /// each falling back to the other
    ///
    /// A pad with both rects set uses `touch_zone`; the graphic only places the drawing.
    pub fn resolved_zone(&self) -> Result<Rect, ConfigError> {
        let zone = match self.mode {
            JoystickMode::Pad => self.touch_zone.or(self.graphic),
            JoystickMode::Fixed => self.graphic.or(self.touch_zone),
        };
        zone.ok_or_else(|| ConfigError::MissingZone {
            joystick: self.name.clone(),
            mode: self.mode,
        })
    }

    /// Default rect of the graphic, falling back to the touch zone
    pub fn resolved_graphic(&self) -> Result<Rect, ConfigError> {
        self.graphic
            .or(self.touch_zone)
            .ok_or_else(|| ConfigError::MissingZone {
                joystick: self.name.clone(),
                mode: self.mode,
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }

        for (field, rect) in [("touch_zone", &self.touch_zone), ("graphic", &self.graphic)] {
            if let Some(rect) = rect {
                if !rect.is_valid() {
                    return Err(ConfigError::InvalidRect {
                        joystick: self.name.clone(),
                        field,
                    });
                }
            }
        }
        self.resolved_zone()?;

        if !self.dead_zone.is_finite() || !(0.0..1.0).contains(&self.dead_zone) {
            return Err(ConfigError::InvalidDeadZone {
                joystick: self.name.clone(),
                value: self.dead_zone,
            });
        }

        if !self.tap_time_delta.is_finite() || self.tap_time_delta < 0.0 {
            return Err(ConfigError::InvalidTapTimeDelta {
                joystick: self.name.clone(),
                value: self.tap_time_delta,
            });
        }

        Ok(())
    }
}

// Default value functions
fn default_mode() -> JoystickMode { JoystickMode::Pad }
fn default_tap_time_delta() -> f32 { DEFAULT_TAP_TIME_DELTA }
fn default_fire_delay() -> f32 { crate::fire::DEFAULT_FIRE_DELAY }
