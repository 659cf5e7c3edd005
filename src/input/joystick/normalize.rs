//! Dead-zone and unit-circle shaping for joystick output.
//!
//! Raw positions arrive either clamped per axis (pad mode, so diagonals can
//! reach a magnitude of ~1.414) or unclamped (fixed mode). Shaping applies a
//! radial (circular) dead zone and always returns a vector of length <= 1.
//!
//! # Key Functions
//!
//! - [`shape_position`]: full shaping pipeline used by the controller
//! - [`remap_magnitude`]: map `[dead_zone, 1]` linearly onto `[0, 1]`

use glam::Vec2;

/// Shape a raw joystick position.
///
/// Branch order:
/// 1. length below `dead_zone` → zero
/// 2. length above 1 → scaled back onto the unit circle
/// 3. `normalize` → direction kept, length remapped out of the dead zone so the
///    output does not jump from zero to `dead_zone` at the boundary
/// 4. otherwise → unchanged
///
/// # Example
/// ```
/// use glam::Vec2;
/// use touchstick::input::joystick::normalize::shape_position;
///
/// assert_eq!(shape_position(Vec2::new(0.05, 0.0), 0.1, false), Vec2::ZERO);
/// assert_eq!(shape_position(Vec2::new(0.3, 0.0), 0.1, false), Vec2::new(0.3, 0.0));
/// assert_eq!(shape_position(Vec2::new(3.0, 4.0), 0.0, false), Vec2::new(0.6, 0.8));
/// ```
pub fn shape_position(raw: Vec2, dead_zone: f32, normalize: bool) -> Vec2 {
    let length = raw.length();

    if length < dead_zone {
        return Vec2::ZERO;
    }

    if length > 1.0 {
        return raw / length;
    }

    if normalize {
        // No direction to keep. Only reachable with a zero dead zone.
        if length == 0.0 {
            return Vec2::ZERO;
        }
        return raw / length * remap_magnitude(length, dead_zone);
    }

    raw
}

/// Map `length` from `[dead_zone, 1]` to `[0, 1]`, clamped.
///
/// A dead zone of 1 or more leaves no range to remap; the result is then 1
/// for any length at or past the dead zone.
pub fn remap_magnitude(length: f32, dead_zone: f32) -> f32 {
    let span = 1.0 - dead_zone;
    if span <= 0.0 {
        return 1.0;
    }
    ((length - dead_zone) / span).clamp(0.0, 1.0)
}
