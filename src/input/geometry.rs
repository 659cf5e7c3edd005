//! Screen-space rectangles for touch zones and joystick graphics

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen pixels
///
/// `contains` is inclusive on the min edge and exclusive on the max edge, so
/// two zones sharing an edge never both report a hit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn half_extent(&self) -> Vec2 {
        self.size() * 0.5
    }

    pub fn center(&self) -> Vec2 {
        self.min() + self.half_extent()
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
    }

    /// Same size, origin moved to `origin`
    pub fn with_origin(&self, origin: Vec2) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Both dimensions strictly positive and every field finite
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height].iter().all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}
