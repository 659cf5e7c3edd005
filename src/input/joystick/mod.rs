//! Virtual joystick support
//!
//! Provides multi-touch joysticks with exclusive finger latching, dead-zone
//! shaping and tap counting. A [`JoystickRegistry`] owns the controllers of a
//! scene and is ticked once per frame with the frame's touches.

pub mod controller;
pub mod graphic;
pub mod normalize;
pub mod registry;
pub mod tap;


pub use controller::{JoystickController, JoystickMode};
pub use graphic::GraphicState;
pub use registry::{JoystickId, JoystickRegistry, LatchBroadcast, LatchState};
pub use tap::{TapCounter, DEFAULT_TAP_TIME_DELTA};
