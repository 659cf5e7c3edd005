//! Touch input: raw samples, screen geometry and virtual joysticks

pub mod geometry;
pub mod joystick;
pub mod touch;

pub use geometry::Rect;
pub use touch::{FingerId, TouchFrame, TouchPhase, TouchSample};
