//! touchstick - multi-touch virtual joysticks
//!
//! Turns per-frame touch lists into joystick directions, with each physical
//! finger latched by at most one joystick and tap counts tracked per joystick.
//!
//! ```
//! use glam::Vec2;
//! use touchstick::config::JoystickConfig;
//! use touchstick::input::{Rect, TouchFrame, TouchPhase, TouchSample};
//! use touchstick::input::joystick::JoystickRegistry;
//!
//! let mut registry = JoystickRegistry::new();
//! let id = registry
//!     .add(&JoystickConfig::pad("move", Rect::new(0.0, 0.0, 200.0, 200.0)))
//!     .unwrap();
//!
//! let down = TouchFrame::new(vec![TouchSample::new(1, Vec2::new(100.0, 100.0), TouchPhase::Began)]);
//! registry.tick(&down, 1.0 / 60.0);
//! let moved = TouchFrame::new(vec![TouchSample::new(1, Vec2::new(150.0, 100.0), TouchPhase::Moved)]);
//! registry.tick(&moved, 1.0 / 60.0);
//!
//! let joystick = registry.get(id).unwrap();
//! assert!(joystick.is_activated());
//! assert_eq!(joystick.position(), Vec2::new(0.5, 0.0));
//! ```

pub mod config;
pub mod fire;
pub mod input;
pub mod replay;

pub use config::{AppConfig, ConfigError, JoystickConfig};
pub use fire::{FireInput, FireTrigger};
pub use input::joystick::{JoystickController, JoystickId, JoystickMode, JoystickRegistry};
pub use input::{FingerId, Rect, TouchFrame, TouchPhase, TouchSample};
