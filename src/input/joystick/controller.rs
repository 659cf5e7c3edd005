//! Per-instance virtual joystick state machine
//!
//! A controller owns at most one finger at a time. Each tick it:
//! 1. advances the tap window
//! 2. releases its finger if the frame has no touches at all
//! 3. latches qualifying touches that land in its zone, telling the registry
//! 4. tracks the owned touch to produce a raw position
//! 5. shapes the raw position (dead zone, unit circle)
//! 6. moves a fixed-mode graphic to follow the output

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::graphic::{Graphic, GraphicState};
use super::normalize::shape_position;
use super::registry::{JoystickId, LatchBroadcast, LatchState};
use super::tap::TapCounter;
use crate::config::{ConfigError, JoystickConfig};
use crate::input::geometry::Rect;
use crate::input::touch::{FingerId, TouchFrame, TouchPhase, TouchSample};

/// How a joystick maps a finger to a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoystickMode {
    /// Origin is wherever the finger first touched down inside the zone
    Pad,
    /// Origin is the centre of the graphic, which follows the finger
    Fixed,
}

impl std::fmt::Display for JoystickMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoystickMode::Pad => write!(f, "pad"),
            JoystickMode::Fixed => write!(f, "fixed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoystickController {
    id: JoystickId,
    name: String,
    mode: JoystickMode,
    zone: Rect,
    dead_zone: f32,
    normalize: bool,

    owned_finger: Option<FingerId>,
    raw_position: Vec2,
    position: Vec2,
    down_position: Vec2,
    down_time: f32,
    taps: TapCounter,
    graphic: Graphic,

    /// Seconds accumulated from tick deltas
    clock: f32,
}

impl JoystickController {
    /// Build a controller from validated configuration
    pub fn new(id: JoystickId, config: &JoystickConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let zone = config.resolved_zone()?;
        let graphic_rect = config.resolved_graphic()?;

        Ok(Self {
            id,
            name: config.name.clone(),
            mode: config.mode,
            zone,
            dead_zone: config.dead_zone,
            normalize: config.normalize,
            owned_finger: None,
            raw_position: Vec2::ZERO,
            position: Vec2::ZERO,
            down_position: Vec2::ZERO,
            down_time: 0.0,
            taps: TapCounter::new(config.tap_time_delta),
            graphic: Graphic::new(config.mode, graphic_rect),
            clock: 0.0,
        })
    }

    /// Run one frame of input through the controller
    pub fn update(&mut self, frame: &TouchFrame, dt: f32, latch: &mut dyn LatchBroadcast) {
        self.clock += dt;
        self.taps.tick(dt);

        if frame.is_empty() {
            if let Some(finger) = self.owned_finger {
                debug!(joystick = %self.name, %finger, "All touches gone, releasing");
            }
            self.reset();
        } else {
            for touch in frame.iter() {
                if self.should_latch(touch, latch) {
                    self.latch(touch, latch);
                }
                if self.owned_finger == Some(touch.finger) {
                    self.track(touch);
                }
            }
        }

        self.position = shape_position(self.raw_position, self.dead_zone, self.normalize);
        self.graphic.follow(self.position);
    }

    /// Release the finger if this controller holds it
    ///
    /// Returns `true` when something was released.
    pub fn release_if_owns(&mut self, finger: FingerId) -> bool {
        if self.owned_finger != Some(finger) {
            return false;
        }
        self.reset();
        true
    }

    /// Drop any latched finger and return to rest
    pub fn reset(&mut self) {
        self.owned_finger = None;
        self.raw_position = Vec2::ZERO;
        self.position = Vec2::ZERO;
        self.down_position = Vec2::ZERO;
        self.graphic.reset();
    }

    fn hit_test(&self, point: Vec2) -> bool {
        match self.mode {
            JoystickMode::Pad => self.zone.contains(point),
            JoystickMode::Fixed => self.graphic.hit_test(point),
        }
    }

    fn should_latch(&self, touch: &TouchSample, latch: &dyn LatchBroadcast) -> bool {
        // Terminal samples never start a claim, and a touch we already own is a continuation
        if touch.phase.is_terminal() || self.owned_finger == Some(touch.finger) {
            return false;
        }
        let fresh = touch.phase == TouchPhase::Began;
        // While holding a finger, only a new contact can take over the slot
        if self.owned_finger.is_some() && !fresh {
            return false;
        }
        if !self.hit_test(touch.position) {
            return false;
        }

        match latch.latch_state(touch.finger) {
            LatchState::Free => true,
            LatchState::LatchedThisTick(owner) => owner == self.id,
            LatchState::Held(owner) => owner == self.id || fresh,
        }
    }

    fn latch(&mut self, touch: &TouchSample, latch: &mut dyn LatchBroadcast) {
        if let Some(previous) = self.owned_finger {
            trace!(joystick = %self.name, %previous, next = %touch.finger, "Switching to fresh contact");
        }

        self.owned_finger = Some(touch.finger);
        self.down_position = touch.position;
        self.down_time = self.clock;
        self.graphic.on_latch();
        self.taps.register_tap();

        debug!(
            joystick = %self.name,
            finger = %touch.finger,
            taps = self.taps.count(),
            "Latched finger"
        );

        latch.broadcast_latch(self.id, touch.finger);
    }

    fn track(&mut self, touch: &TouchSample) {
        // Platform tap detection can see more taps than our window does
        self.taps.adopt_native(touch.tap_count);

        let half = self.zone.half_extent();
        self.raw_position = match self.mode {
            JoystickMode::Pad => {
                ((touch.position - self.down_position) / half).clamp(Vec2::NEG_ONE, Vec2::ONE)
            }
            JoystickMode::Fixed => (touch.position - self.zone.center()) / half,
        };

        if touch.phase.is_terminal() {
            trace!(joystick = %self.name, finger = %touch.finger, phase = ?touch.phase, "Finger lifted");
            self.reset();
        }
    }

    pub fn id(&self) -> JoystickId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> JoystickMode {
        self.mode
    }

    /// Hit zone in screen space. For fixed joysticks this is the default graphic rect.
    pub fn zone(&self) -> Rect {
        self.zone
    }

    /// Shaped output, length <= 1, zero when no finger is latched
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position before dead-zone shaping
    pub fn raw_position(&self) -> Vec2 {
        self.raw_position
    }

    /// A finger is currently latched
    pub fn is_activated(&self) -> bool {
        self.owned_finger.is_some()
    }

    pub fn owned_finger(&self) -> Option<FingerId> {
        self.owned_finger
    }

    pub fn tap_count(&self) -> u32 {
        self.taps.count()
    }

    /// Seconds left in the current tap window, zero when it is closed
    pub fn tap_time_remaining(&self) -> f32 {
        self.taps.remaining()
    }

    pub fn is_tap_window_open(&self) -> bool {
        self.taps.is_window_open()
    }

    pub fn down_position(&self) -> Vec2 {
        self.down_position
    }

    /// Controller clock at the moment the current finger latched
    pub fn down_time(&self) -> f32 {
        self.down_time
    }

    /// Seconds the current finger has been held, `None` when unlatched
    pub fn held_for(&self) -> Option<f32> {
        self.owned_finger.map(|_| self.clock - self.down_time)
    }

    pub fn graphic(&self) -> GraphicState {
        self.graphic.state()
    }

    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in for the registry: records broadcasts and reports fixed owners
    #[derive(Default)]
    struct RecordingLatch {
        held: Vec<(FingerId, JoystickId)>,
        broadcasts: Vec<(JoystickId, FingerId)>,
    }

    impl LatchBroadcast for RecordingLatch {
        fn latch_state(&self, finger: FingerId) -> LatchState {
            if let Some(&(owner, _)) = self.broadcasts.iter().find(|(_, f)| *f == finger) {
                return LatchState::LatchedThisTick(owner);
            }
            match self.held.iter().find(|(f, _)| *f == finger) {
                Some(&(_, owner)) => LatchState::Held(owner),
                None => LatchState::Free,
            }
        }

        fn broadcast_latch(&mut self, claimant: JoystickId, finger: FingerId) {
            self.broadcasts.push((claimant, finger));
        }
    }

    fn pad_config() -> JoystickConfig {
        JoystickConfig {
            name: "pad".to_string(),
            mode: JoystickMode::Pad,
            touch_zone: Some(Rect::new(0.0, 0.0, 200.0, 200.0)),
            graphic: None,
            dead_zone: 0.1,
            normalize: false,
            tap_time_delta: 0.3,
        }
    }

    fn fixed_config() -> JoystickConfig {
        JoystickConfig {
            name: "fixed".to_string(),
            mode: JoystickMode::Fixed,
            touch_zone: None,
            graphic: Some(Rect::new(300.0, 0.0, 100.0, 100.0)),
            dead_zone: 0.0,
            normalize: false,
            tap_time_delta: 0.3,
        }
    }

    fn frame(touches: &[(u64, f32, f32, TouchPhase)]) -> TouchFrame {
        touches
            .iter()
            .map(|&(id, x, y, phase)| TouchSample::new(id, Vec2::new(x, y), phase))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_pad_displacement_inside_half_zone() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        assert!(c.is_activated());
        assert_eq!(c.position(), Vec2::ZERO);

        c.update(&frame(&[(1, 130.0, 100.0, TouchPhase::Moved)]), 0.016, &mut latch);
        assert_eq!(c.position(), Vec2::new(0.3, 0.0));
    }

    #[test]
    fn test_pad_displacement_clamps_per_axis() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        c.update(&frame(&[(1, 400.0, 100.0, TouchPhase::Moved)]), 0.016, &mut latch);
        assert_eq!(c.raw_position(), Vec2::new(1.0, 0.0));
        assert_eq!(c.position(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_pad_dead_zone_zeroes_small_moves() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        c.update(&frame(&[(1, 105.0, 104.0, TouchPhase::Moved)]), 0.016, &mut latch);
        assert!(c.is_activated());
        assert_eq!(c.position(), Vec2::ZERO);
    }

    #[test]
    fn test_touch_outside_zone_is_ignored() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 250.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        assert!(!c.is_activated());
        assert!(latch.broadcasts.is_empty());
        assert_eq!(c.tap_count(), 0);
    }

    #[test]
    fn test_latch_broadcasts_claim() {
        let mut c = JoystickController::new(JoystickId(4), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(9, 50.0, 50.0, TouchPhase::Began)]), 0.016, &mut latch);
        assert_eq!(latch.broadcasts, vec![(JoystickId(4), FingerId(9))]);

        // Continuation does not broadcast again
        c.update(&frame(&[(9, 60.0, 50.0, TouchPhase::Moved)]), 0.016, &mut latch);
        assert_eq!(latch.broadcasts.len(), 1);
    }

    #[test]
    fn test_ended_releases_and_repeat_is_noop() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        c.update(&frame(&[(1, 150.0, 100.0, TouchPhase::Ended)]), 0.016, &mut latch);
        assert!(!c.is_activated());
        assert_eq!(c.position(), Vec2::ZERO);
        assert_eq!(c.down_position(), Vec2::ZERO);
        let taps = c.tap_count();

        c.update(&frame(&[(1, 150.0, 100.0, TouchPhase::Ended)]), 0.016, &mut latch);
        assert!(!c.is_activated());
        assert_eq!(c.position(), Vec2::ZERO);
        assert_eq!(c.tap_count(), taps);
        assert_eq!(latch.broadcasts.len(), 1);
    }

    #[test]
    fn test_empty_frame_releases() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        c.update(&frame(&[(1, 160.0, 100.0, TouchPhase::Moved)]), 0.016, &mut latch);
        assert!(c.position().x > 0.0);

        c.update(&TouchFrame::empty(), 0.016, &mut latch);
        assert!(!c.is_activated());
        assert_eq!(c.position(), Vec2::ZERO);
    }

    #[test]
    fn test_missing_owned_finger_holds_position() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        c.update(&frame(&[(1, 150.0, 100.0, TouchPhase::Moved)]), 0.016, &mut latch);
        // Another finger elsewhere on screen, ours not reported this frame
        c.update(&frame(&[(2, 500.0, 500.0, TouchPhase::Began)]), 0.016, &mut latch);
        assert_eq!(c.owned_finger(), Some(FingerId(1)));
        assert_eq!(c.position(), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_held_by_other_only_taken_on_fresh_contact() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch {
            held: vec![(FingerId(3), JoystickId(1))],
            ..Default::default()
        };

        // Finger sliding into our zone while someone else owns it
        c.update(&frame(&[(3, 100.0, 100.0, TouchPhase::Moved)]), 0.016, &mut latch);
        assert!(!c.is_activated());

        // Fresh contact with the same id: the other controller missed its Ended
        c.update(&frame(&[(3, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        assert_eq!(c.owned_finger(), Some(FingerId(3)));
    }

    #[test]
    fn test_latched_elsewhere_this_tick_is_not_taken() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch {
            broadcasts: vec![(JoystickId(2), FingerId(5))],
            ..Default::default()
        };

        c.update(&frame(&[(5, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        assert!(!c.is_activated());
    }

    #[test]
    fn test_native_tap_count_adopted() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        let touch = TouchSample::new(1, Vec2::new(100.0, 100.0), TouchPhase::Began).with_tap_count(3);
        c.update(&TouchFrame::new(vec![touch]), 0.016, &mut latch);
        assert_eq!(c.tap_count(), 3);
    }

    #[test]
    fn test_fixed_mode_centre_relative_and_graphic_follows() {
        let mut c = JoystickController::new(JoystickId(0), &fixed_config()).unwrap();
        let mut latch = RecordingLatch::default();

        // Centre is (350, 50), half extent (50, 50)
        c.update(&frame(&[(1, 375.0, 50.0, TouchPhase::Began)]), 0.016, &mut latch);
        assert!(c.is_activated());
        assert_eq!(c.position(), Vec2::new(0.5, 0.0));
        assert_eq!(c.graphic().rect, Rect::new(325.0, 0.0, 100.0, 100.0));

        // Unclamped before shaping, then pulled back to the unit circle
        c.update(&frame(&[(1, 500.0, 50.0, TouchPhase::Moved)]), 0.016, &mut latch);
        assert_eq!(c.raw_position(), Vec2::new(3.0, 0.0));
        assert_eq!(c.position(), Vec2::new(1.0, 0.0));

        c.update(&frame(&[(1, 500.0, 50.0, TouchPhase::Canceled)]), 0.016, &mut latch);
        assert!(!c.is_activated());
        assert_eq!(c.graphic().rect, Rect::new(300.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_fixed_mode_hit_tests_moved_graphic() {
        let mut c = JoystickController::new(JoystickId(0), &fixed_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 399.0, 50.0, TouchPhase::Began)]), 0.016, &mut latch);
        // Graphic now spans roughly x in [349, 449]
        assert!(c.graphic().rect.x > 340.0);

        // A second fresh finger inside the moved graphic but outside the default rect
        c.update(
            &frame(&[(1, 399.0, 50.0, TouchPhase::Stationary), (2, 420.0, 50.0, TouchPhase::Began)]),
            0.016,
            &mut latch,
        );
        assert_eq!(c.owned_finger(), Some(FingerId(2)));
    }

    #[test]
    fn test_held_for_tracks_clock() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        assert_eq!(c.held_for(), None);
        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.5, &mut latch);
        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Stationary)]), 0.25, &mut latch);
        assert!((c.held_for().unwrap() - 0.25).abs() < 1e-6);
        assert!((c.down_time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_busy_pad_ignores_free_sliding_finger() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        c.update(
            &frame(&[(1, 150.0, 100.0, TouchPhase::Moved), (2, 20.0, 20.0, TouchPhase::Moved)]),
            0.016,
            &mut latch,
        );
        assert_eq!(c.owned_finger(), Some(FingerId(1)));
        assert_eq!(c.position(), Vec2::new(0.5, 0.0));
        assert_eq!(c.tap_count(), 1);
        assert_eq!(latch.broadcasts.len(), 1);

        // An idle pad does pick up a free finger that slides in
        let mut idle = JoystickController::new(JoystickId(1), &pad_config()).unwrap();
        idle.update(&frame(&[(2, 20.0, 20.0, TouchPhase::Moved)]), 0.016, &mut latch);
        assert_eq!(idle.owned_finger(), Some(FingerId(2)));
    }

    #[test]
    fn test_release_if_owns_ignores_other_fingers() {
        let mut c = JoystickController::new(JoystickId(0), &pad_config()).unwrap();
        let mut latch = RecordingLatch::default();

        c.update(&frame(&[(1, 100.0, 100.0, TouchPhase::Began)]), 0.016, &mut latch);
        assert!(!c.release_if_owns(FingerId(2)));
        assert!(c.is_activated());
        assert!(c.release_if_owns(FingerId(1)));
        assert!(!c.is_activated());
    }
}
