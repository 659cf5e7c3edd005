//! Registry of live joysticks and finger-latch broadcasting
//!
//! The registry owns every controller in a scene and mediates the latch
//! protocol: when one controller claims a finger, every other live controller
//! is asked to let go of it before the tick moves on. Controllers never see
//! each other directly, only the [`LatchBroadcast`] seam.
//!
//! The live list is built lazily. Adding, disabling or enabling a controller
//! marks it stale and the next [`JoystickRegistry::tick`] rebuilds it.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::controller::JoystickController;
use crate::config::{ConfigError, JoystickConfig};
use crate::input::touch::{FingerId, TouchFrame};

/// Handle of a controller within its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoystickId(pub usize);

impl std::fmt::Display for JoystickId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "joystick:{}", self.0)
    }
}

/// Who, if anyone, has a finger right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    Free,
    /// Owned since an earlier tick
    Held(JoystickId),
    /// Claimed during the tick in progress
    LatchedThisTick(JoystickId),
}

/// What a controller needs from its surroundings during an update
pub trait LatchBroadcast {
    /// Ownership of `finger` among the other controllers
    fn latch_state(&self, finger: FingerId) -> LatchState;

    /// `claimant` just latched `finger`; every other holder must release it
    fn broadcast_latch(&mut self, claimant: JoystickId, finger: FingerId);
}

#[derive(Debug)]
struct Slot {
    /// `None` only while the controller is being updated
    controller: Option<JoystickController>,
    enabled: bool,
}

#[derive(Debug, Default)]
pub struct JoystickRegistry {
    slots: Vec<Slot>,
    live: Vec<JoystickId>,
    stale: bool,
    latched_this_tick: HashMap<FingerId, JoystickId>,
}

impl JoystickRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with one controller per config entry
    pub fn from_configs<'a>(
        configs: impl IntoIterator<Item = &'a JoystickConfig>,
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for config in configs {
            registry.add(config)?;
        }
        Ok(registry)
    }

    /// Create and register a controller, enabled
    pub fn add(&mut self, config: &JoystickConfig) -> Result<JoystickId, ConfigError> {
        if self.get_by_name(&config.name).is_some() {
            return Err(ConfigError::DuplicateName(config.name.clone()));
        }

        let id = JoystickId(self.slots.len());
        let controller = JoystickController::new(id, config)?;
        debug!(%id, name = %config.name, mode = %config.mode, "Registered joystick");

        self.slots.push(Slot {
            controller: Some(controller),
            enabled: true,
        });
        self.invalidate();
        Ok(id)
    }

    /// Enable or disable a controller
    ///
    /// Disabling releases its finger. Returns `false` for an unknown id.
    pub fn set_enabled(&mut self, id: JoystickId, enabled: bool) -> bool {
        let Some(slot) = self.slots.get_mut(id.0) else {
            return false;
        };
        if slot.enabled == enabled {
            return true;
        }

        slot.enabled = enabled;
        if !enabled {
            if let Some(controller) = slot.controller.as_mut() {
                controller.reset();
            }
        }
        debug!(%id, enabled, "Joystick enable state changed");
        self.invalidate();
        true
    }

    pub fn is_enabled(&self, id: JoystickId) -> bool {
        self.slots.get(id.0).is_some_and(|s| s.enabled)
    }

    /// Mark the live list stale; it is rebuilt on the next tick
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Rebuild the live list from enabled controllers
    pub fn rebuild(&mut self) {
        self.live = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.enabled)
            .map(|(idx, _)| JoystickId(idx))
            .collect();
        self.stale = false;
        debug!(live = self.live.len(), total = self.slots.len(), "Rebuilt joystick registry");
    }

    /// Run one frame through every live controller
    ///
    /// Latch broadcasts happen synchronously inside each controller's update,
    /// so exclusivity holds again before the next controller runs.
    pub fn tick(&mut self, frame: &TouchFrame, dt: f32) {
        if self.stale {
            self.rebuild();
        }
        self.latched_this_tick.clear();

        // Snapshot of ids: the list cannot change mid-tick, broadcasts only touch slots
        let order = self.live.clone();
        for id in order {
            let Some(mut controller) = self.slots[id.0].controller.take() else {
                continue;
            };
            controller.update(frame, dt, self);
            self.slots[id.0].controller = Some(controller);
        }
    }

    /// Controller currently holding `finger`
    pub fn owner_of(&self, finger: FingerId) -> Option<JoystickId> {
        self.iter()
            .find(|c| c.owned_finger() == Some(finger))
            .map(|c| c.id())
    }

    pub fn get(&self, id: JoystickId) -> Option<&JoystickController> {
        self.slots.get(id.0).and_then(|s| s.controller.as_ref())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&JoystickController> {
        self.slots
            .iter()
            .filter_map(|s| s.controller.as_ref())
            .find(|c| c.name() == name)
    }

    /// Enabled controllers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &JoystickController> {
        self.slots
            .iter()
            .filter(|s| s.enabled)
            .filter_map(|s| s.controller.as_ref())
    }

    /// Number of registered controllers, enabled or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl LatchBroadcast for JoystickRegistry {
    fn latch_state(&self, finger: FingerId) -> LatchState {
        if let Some(&owner) = self.latched_this_tick.get(&finger) {
            return LatchState::LatchedThisTick(owner);
        }
        match self.owner_of(finger) {
            Some(owner) => LatchState::Held(owner),
            None => LatchState::Free,
        }
    }

    fn broadcast_latch(&mut self, claimant: JoystickId, finger: FingerId) {
        self.latched_this_tick.insert(finger, claimant);

        for &id in &self.live {
            if id == claimant {
                continue;
            }
            let Some(other) = self.slots[id.0].controller.as_mut() else {
                continue;
            };
            if other.release_if_owns(finger) {
                debug!(%finger, released = %id, latched_by = %claimant, "Finger handed over");
            } else {
                trace!(%finger, %id, "Not holding latched finger");
            }
        }
    }
}
