//! Recorded touch traces and off-device replay
//!
//! A trace is a CSV file with one row per contact per frame:
//!
//! ```text
//! frame,finger,x,y,phase,tap_count
//! 0,1,100,100,began,1
//! 1,1,130,100,moved,
//! 3,1,130,100,ended,
//! ```
//!
//! Frame numbers without rows (frame 2 above) are replayed as empty frames,
//! up to [`MAX_FRAME_GAP`] in a row.

use anyhow::{bail, Context, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::config::{AppConfig, ConfigError};
use crate::fire::{FireInput, FireTrigger};
use crate::input::joystick::{JoystickId, JoystickRegistry};
use crate::input::touch::{TouchFrame, TouchPhase, TouchSample};

/// Largest run of frame numbers a trace may skip, about three minutes at 60 fps
pub const MAX_FRAME_GAP: usize = 10_000;

#[derive(Debug, Deserialize)]
struct TraceRow {
    frame: usize,
    finger: u64,
    x: f32,
    y: f32,
    phase: String,
    #[serde(default)]
    tap_count: Option<u32>,
}

/// Frames of a recorded session, in order
#[derive(Debug, Clone, Default)]
pub struct Trace {
    pub frames: Vec<TouchFrame>,
}

impl Trace {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open trace file: {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("Invalid trace file: {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut by_frame: BTreeMap<usize, Vec<TouchSample>> = BTreeMap::new();

        for (line, row) in csv.deserialize::<TraceRow>().enumerate() {
            // Header is line 1
            let row = row.with_context(|| format!("Malformed trace row at line {}", line + 2))?;
            let phase: TouchPhase = row
                .phase
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .with_context(|| format!("Bad phase at line {}", line + 2))?;

            let sample = TouchSample::new(row.finger, Vec2::new(row.x, row.y), phase)
                .with_tap_count(row.tap_count.unwrap_or(0));
            by_frame.entry(row.frame).or_default().push(sample);
        }

        let mut frames = Vec::new();
        for (index, touches) in by_frame {
            let gap = index - frames.len();
            if gap > MAX_FRAME_GAP {
                bail!(
                    "Frame {} leaves a gap of {} empty frames (limit {})",
                    index,
                    gap,
                    MAX_FRAME_GAP
                );
            }
            frames.resize(index, TouchFrame::empty());
            frames.push(TouchFrame::new(touches));
        }

        debug!(frames = frames.len(), "Loaded touch trace");
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Output of one joystick after a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoystickReport {
    pub name: String,
    pub position: [f32; 2],
    pub activated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finger: Option<u64>,
    pub tap_count: u32,
    pub tap_window_open: bool,
    /// Seconds left before the tap count resets
    pub tap_time_remaining: f32,
}

/// Everything observable after a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: usize,
    pub joysticks: Vec<JoystickReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fired: Option<bool>,
}

struct FireBinding {
    joystick: Option<JoystickId>,
    trigger: FireTrigger,
}

/// Drives a registry (and optionally a fire trigger) through a trace
pub struct Replay {
    registry: JoystickRegistry,
    fire: Option<FireBinding>,
    dt: f32,
}

impl Replay {
    pub fn new(registry: JoystickRegistry, dt: f32) -> Self {
        Self {
            registry,
            fire: None,
            dt,
        }
    }

    /// Registry and fire trigger as described by `config`
    pub fn from_config(config: &AppConfig, dt: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = JoystickRegistry::from_configs(&config.joysticks)?;
        let mut replay = Self::new(registry, dt);

        if let Some(fire) = &config.fire {
            let joystick = match &fire.joystick {
                Some(name) => Some(
                    replay
                        .registry
                        .get_by_name(name)
                        .map(|c| c.id())
                        .ok_or_else(|| ConfigError::UnknownFireJoystick(name.clone()))?,
                ),
                None => None,
            };
            replay = replay.with_fire(joystick, FireTrigger::from_config(fire));
        }

        Ok(replay)
    }

    /// Attach a fire trigger. With no joystick, any touch counts as the button.
    pub fn with_fire(mut self, joystick: Option<JoystickId>, trigger: FireTrigger) -> Self {
        self.fire = Some(FireBinding { joystick, trigger });
        self
    }

    pub fn registry(&self) -> &JoystickRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut JoystickRegistry {
        &mut self.registry
    }

    /// Tick one frame and report the outputs
    pub fn step(&mut self, index: usize, frame: &TouchFrame) -> FrameReport {
        self.registry.tick(frame, self.dt);

        let fired = self.fire.as_mut().map(|binding| {
            let input = match binding.joystick.and_then(|id| self.registry.get(id)) {
                Some(joystick) => FireInput::from(joystick),
                None => FireInput::Button(!frame.is_empty()),
            };
            binding.trigger.update(self.dt, input)
        });

        let joysticks = self
            .registry
            .iter()
            .map(|c| JoystickReport {
                name: c.name().to_string(),
                position: c.position().to_array(),
                activated: c.is_activated(),
                finger: c.owned_finger().map(|f| f.0),
                tap_count: c.tap_count(),
                tap_window_open: c.is_tap_window_open(),
                tap_time_remaining: c.tap_time_remaining(),
            })
            .collect();

        FrameReport {
            frame: index,
            joysticks,
            fired,
        }
    }

    pub fn run(&mut self, trace: &Trace) -> Vec<FrameReport> {
        trace
            .frames
            .iter()
            .enumerate()
            .map(|(index, frame)| self.step(index, frame))
            .collect()
    }
}
