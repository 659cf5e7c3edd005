//! Fire trigger driven by a joystick latch or a fallback button
//!
//! With a joystick, holding a finger on it fires repeatedly, at most once per
//! `fire_delay`. Without touch hardware the digital button fires once per
//! press. What firing does (animation, projectiles) is up to the caller.

use tracing::trace;

use crate::config::FireConfig;
use crate::input::joystick::JoystickController;

/// Default minimum spacing between shots, in seconds
pub const DEFAULT_FIRE_DELAY: f32 = 0.5;

/// Per-frame fire input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireInput {
    /// Joystick `is_activated()` this frame
    Joystick(bool),
    /// Fallback button held this frame
    Button(bool),
}

impl From<&JoystickController> for FireInput {
    fn from(joystick: &JoystickController) -> Self {
        FireInput::Joystick(joystick.is_activated())
    }
}

/// Rate-limited fire decision
///
/// The first shot is not delayed: a held joystick fires on the first frame
/// it is activated, and `fire_delay` only spaces out the shots after it.
#[derive(Debug, Clone)]
pub struct FireTrigger {
    fire_delay: f32,
    clock: f32,
    last_fire: Option<f32>,
    button_was_down: bool,
}

impl FireTrigger {
    pub fn new(fire_delay: f32) -> Self {
        Self {
            fire_delay,
            clock: 0.0,
            last_fire: None,
            button_was_down: false,
        }
    }

    pub fn from_config(config: &FireConfig) -> Self {
        Self::new(config.fire_delay)
    }

    /// Advance by `dt` seconds and report whether this frame fires
    pub fn update(&mut self, dt: f32, input: FireInput) -> bool {
        self.clock += dt;

        let fire = match input {
            FireInput::Joystick(activated) => activated && self.cooled_down(),
            FireInput::Button(down) => {
                let pressed = down && !self.button_was_down;
                self.button_was_down = down;
                pressed
            }
        };

        if fire {
            trace!(clock = self.clock, "Fire");
            self.last_fire = Some(self.clock);
        }
        fire
    }

    fn cooled_down(&self) -> bool {
        match self.last_fire {
            Some(last) => self.clock - last > self.fire_delay,
            None => true,
        }
    }

    pub fn fire_delay(&self) -> f32 {
        self.fire_delay
    }

    /// Clock value of the most recent shot
    pub fn last_fire(&self) -> Option<f32> {
        self.last_fire
    }
}

impl Default for FireTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_FIRE_DELAY)
    }
}
