//! Render hints for the joystick graphic
//!
//! The core does not draw anything. It only tracks where the graphic should
//! sit and how opaque it should be, for the rendering collaborator to read.

use glam::Vec2;
use serde::Serialize;

use super::controller::JoystickMode;
use crate::input::geometry::Rect;

/// Pad graphic opacity while a finger is latched
pub const PAD_ALPHA_ACTIVE: f32 = 0.15;

/// Pad graphic opacity at rest
pub const PAD_ALPHA_IDLE: f32 = 0.025;

/// Fixed-mode graphics keep their authored opacity
pub const FIXED_ALPHA: f32 = 1.0;

/// What the renderer should draw this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphicState {
    /// Screen rect of the graphic
    pub rect: Rect,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub(crate) struct Graphic {
    mode: JoystickMode,
    default_rect: Rect,
    state: GraphicState,
}

impl Graphic {
    pub(crate) fn new(mode: JoystickMode, default_rect: Rect) -> Self {
        Self {
            mode,
            default_rect,
            state: GraphicState {
                rect: default_rect,
                alpha: idle_alpha(mode),
            },
        }
    }

    pub(crate) fn state(&self) -> GraphicState {
        self.state
    }

    /// Current on-screen bounds contain `point`
    pub(crate) fn hit_test(&self, point: Vec2) -> bool {
        self.state.rect.contains(point)
    }

    pub(crate) fn on_latch(&mut self) {
        if self.mode == JoystickMode::Pad {
            self.state.alpha = PAD_ALPHA_ACTIVE;
        }
    }

    /// Move a fixed-mode graphic so its centre tracks `position`
    ///
    /// `position` (-1, -1) puts the graphic's origin one half extent below and
    /// left of the default centre; (1, 1) one half extent above and right.
    pub(crate) fn follow(&mut self, position: Vec2) {
        if self.mode != JoystickMode::Fixed {
            return;
        }
        let half = self.default_rect.half_extent();
        let center = self.default_rect.center();
        let origin = (position - Vec2::ONE) * half + center;
        self.state.rect = self.state.rect.with_origin(origin);
    }

    /// Snap back to the default rect and idle opacity
    pub(crate) fn reset(&mut self) {
        self.state.rect = self.default_rect;
        self.state.alpha = idle_alpha(self.mode);
    }
}

fn idle_alpha(mode: JoystickMode) -> f32 {
    match mode {
        JoystickMode::Pad => PAD_ALPHA_IDLE,
        JoystickMode::Fixed => FIXED_ALPHA,
    }
}
