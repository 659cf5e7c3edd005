//! Configuration validation errors

use thiserror::Error;

use crate::input::joystick::JoystickMode;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one joystick must be configured")]
    NoJoysticks,

    #[error("joystick name cannot be empty")]
    EmptyName,

    #[error("joystick '{0}' is defined more than once")]
    DuplicateName(String),

    #[error("joystick '{joystick}' has an invalid {field} rect (needs finite values and positive size)")]
    InvalidRect {
        joystick: String,
        field: &'static str,
    },

    #[error("{mode} joystick '{joystick}' needs a touch_zone or graphic rect")]
    MissingZone { joystick: String, mode: JoystickMode },

    #[error("joystick '{joystick}' dead_zone {value} must be in [0, 1)")]
    InvalidDeadZone { joystick: String, value: f32 },

    #[error("joystick '{joystick}' tap_time_delta {value} must be a non-negative number of seconds")]
    InvalidTapTimeDelta { joystick: String, value: f32 },

    #[error("fire_delay {0} must be a non-negative number of seconds")]
    InvalidFireDelay(f32),

    #[error("fire trigger references unknown joystick '{0}'")]
    UnknownFireJoystick(String),
}
