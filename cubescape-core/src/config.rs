/// Scene and screen configuration
use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CubeError, CubeResult};
use crate::frame::DEFAULT_BACKGROUND;
use crate::geometry::CubeSpec;
use crate::projection::Projector;
use crate::transform::RotationState;

pub const DEFAULT_WIDTH: usize = 140;
pub const DEFAULT_HEIGHT: usize = 40;
pub const DEFAULT_CAMERA_DISTANCE: f32 = 120.0;
pub const DEFAULT_PERSPECTIVE: f32 = 40.0;
/// Most loop coordinates one cube axis may produce; a cube face has at
/// most the square of this many samples.
pub const MAX_AXIS_SAMPLES: usize = 4096;
pub const DEFAULT_ROTATION_STEP: RotationState = RotationState {
    a: 0.05,
    b: 0.05,
    c: 0.01,
};

/// Everything the frame driver needs to produce frames.
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub camera_distance: f32,
    pub perspective: f32,
    pub background: char,
    /// Added to the rotation after every frame.
    pub rotation_step: RotationState,
    /// Rotation of the first frame, and after a restart.
    pub initial_rotation: RotationState,
    /// Drawn in order into one shared depth buffer.
    pub cubes: Vec<CubeSpec>,
    /// Snap sample coordinates toward zero before rotating them.
    pub truncate_samples: bool,
    /// Minimum time per frame; 0 runs uncapped.
    pub frame_delay_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
            perspective: DEFAULT_PERSPECTIVE,
            background: DEFAULT_BACKGROUND,
            rotation_step: DEFAULT_ROTATION_STEP,
            initial_rotation: RotationState::zero(),
            cubes: CubeSpec::default_scene(),
            truncate_samples: false,
            frame_delay_ms: 0,
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(s: &str) -> CubeResult<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> CubeResult<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> CubeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Use `step` for every cube.
    pub fn set_sample_step(&mut self, step: f32) {
        for cube in &mut self.cubes {
            cube.step = step;
        }
    }

    pub fn frame_delay(&self) -> Option<Duration> {
        (self.frame_delay_ms > 0).then(|| Duration::from_millis(self.frame_delay_ms))
    }

    pub fn projector(&self) -> Projector {
        Projector::new(
            self.width,
            self.height,
            self.camera_distance,
            self.perspective,
        )
    }

    pub fn validate(&self) -> CubeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CubeError::config(format!(
                "screen must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(CubeError::config("screen size overflows"));
        }
        if !self.camera_distance.is_finite() {
            return Err(CubeError::config("camera_distance must be finite"));
        }
        if !self.perspective.is_finite() {
            return Err(CubeError::config("perspective must be finite"));
        }
        for (name, r) in [
            ("rotation_step", &self.rotation_step),
            ("initial_rotation", &self.initial_rotation),
        ] {
            if !(r.a.is_finite() && r.b.is_finite() && r.c.is_finite()) {
                return Err(CubeError::config(format!("{name} must be finite")));
            }
        }
        for (idx, cube) in self.cubes.iter().enumerate() {
            if !(cube.half_width.is_finite() && cube.half_width > 0.0) {
                return Err(CubeError::config(format!(
                    "cube {idx}: half_width must be positive, got {}",
                    cube.half_width
                )));
            }
            if !(cube.step.is_finite() && cube.step > 0.0) {
                return Err(CubeError::config(format!(
                    "cube {idx}: step must be positive, got {}",
                    cube.step
                )));
            }
            if cube.axis_len() > MAX_AXIS_SAMPLES {
                return Err(CubeError::config(format!(
                    "cube {idx}: step {} is too fine for half_width {} (more than {MAX_AXIS_SAMPLES} samples per axis)",
                    cube.step, cube.half_width
                )));
            }
            if !cube.offset.is_finite() {
                return Err(CubeError::config(format!("cube {idx}: offset must be finite")));
            }
        }
        Ok(())
    }
}
