//! Raw touch samples as delivered by the platform layer
//!
//! One [`TouchSample`] per active contact per frame. The core only reads them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable identifier of a physical contact, valid until the contact ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerId(pub u64);

impl std::fmt::Display for FingerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "finger:{}", self.0)
    }
}

/// Lifecycle phase of a contact within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    Canceled,
}

impl TouchPhase {
    /// `true` for phases after which the finger is gone
    pub fn is_terminal(self) -> bool {
        matches!(self, TouchPhase::Ended | TouchPhase::Canceled)
    }
}

impl std::str::FromStr for TouchPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "began" | "begin" | "down" => Ok(TouchPhase::Began),
            "moved" | "move" => Ok(TouchPhase::Moved),
            "stationary" | "hold" => Ok(TouchPhase::Stationary),
            "ended" | "end" | "up" => Ok(TouchPhase::Ended),
            "canceled" | "cancelled" | "cancel" => Ok(TouchPhase::Canceled),
            other => Err(format!("unknown touch phase '{}'", other)),
        }
    }
}

/// A single contact as seen in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchSample {
    pub finger: FingerId,
    /// Screen position in pixels
    pub position: Vec2,
    pub phase: TouchPhase,
    /// Tap count reported by the platform for this contact
    #[serde(default)]
    pub tap_count: u32,
}

impl TouchSample {
    pub fn new(finger: u64, position: Vec2, phase: TouchPhase) -> Self {
        Self {
            finger: FingerId(finger),
            position,
            phase,
            tap_count: 0,
        }
    }

    pub fn with_tap_count(mut self, tap_count: u32) -> Self {
        self.tap_count = tap_count;
        self
    }
}

/// Ordered set of samples for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchFrame {
    pub touches: Vec<TouchSample>,
}

impl TouchFrame {
    pub fn new(touches: Vec<TouchSample>) -> Self {
        Self { touches }
    }

    /// A frame with no active contacts
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.touches.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchSample> {
        self.touches.iter()
    }

    /// Sample for the given finger, if present this frame
    pub fn get(&self, finger: FingerId) -> Option<&TouchSample> {
        self.touches.iter().find(|t| t.finger == finger)
    }
}

impl From<Vec<TouchSample>> for TouchFrame {
    fn from(touches: Vec<TouchSample>) -> Self {
        Self::new(touches)
    }
}
