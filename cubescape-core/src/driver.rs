/// Per-frame orchestration: samples -> rotation -> projection -> compositing
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::RenderConfig;
use crate::error::CubeResult;
use crate::frame::{Compositor, Grid};
use crate::geometry::truncate;
use crate::projection::Projector;
use crate::transform::{rotation_matrix, RotationState};
use nalgebra::Point3;

/// Receives each finished frame for display.
pub trait FrameSink {
    fn present(&mut self, frame: &Grid) -> CubeResult<()>;
}

impl<F> FrameSink for F
where
    F: FnMut(&Grid) -> CubeResult<()>,
{
    fn present(&mut self, frame: &Grid) -> CubeResult<()> {
        self(frame)
    }
}

/// Shared flag asking the frame loop to stop after the current frame.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Mutable state carried from frame to frame.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub rotation: RotationState,
    compositor: Compositor,
}

impl RenderState {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            rotation: config.initial_rotation,
            compositor: Compositor::new(config.width, config.height, config.background),
        }
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }
}

/// Counts from the last rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub samples: usize,
    pub written: usize,
}

pub struct FrameDriver {
    config: RenderConfig,
    projector: Projector,
    state: RenderState,
    frame_index: u64,
    last_stats: FrameStats,
}

impl FrameDriver {
    pub fn new(config: RenderConfig) -> CubeResult<Self> {
        config.validate()?;
        tracing::debug!(
            width = config.width,
            height = config.height,
            cubes = config.cubes.len(),
            "frame driver ready"
        );
        Ok(Self {
            projector: config.projector(),
            state: RenderState::new(&config),
            config,
            frame_index: 0,
            last_stats: FrameStats::default(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn rotation(&self) -> RotationState {
        self.state.rotation
    }

    pub fn set_rotation(&mut self, rotation: RotationState) {
        self.state.rotation = rotation;
    }

    /// Frames produced since construction or the last restart.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Render every cube at the current rotation, without advancing it.
    #[tracing::instrument(level = "trace", skip(self), fields(frame = self.frame_index))]
    pub fn render(&mut self) -> &Grid {
        let state = &mut self.state;
        state.compositor.reset();

        let rotation = rotation_matrix(&state.rotation);
        let mut stats = FrameStats::default();

        for cube in &self.config.cubes {
            for sample in cube.samples() {
                let position = if self.config.truncate_samples {
                    truncate(&sample.position)
                } else {
                    sample.position
                };
                let rotated = Point3::from(rotation * position.coords);

                stats.samples += 1;
                if let Some(p) = self.projector.project(&rotated, cube.offset) {
                    if state.compositor.submit_projected(&p, sample.glyph) {
                        stats.written += 1;
                    }
                }
            }
        }

        tracing::trace!(samples = stats.samples, written = stats.written, "frame composited");
        self.last_stats = stats;
        state.compositor.render()
    }

    pub fn advance(&mut self) {
        self.state.rotation.rotate(&self.config.rotation_step);
        self.frame_index += 1;
    }

    /// Render the current frame, then advance the rotation for the next.
    pub fn step(&mut self) -> &Grid {
        self.render();
        self.advance();
        self.state.compositor.render()
    }

    /// Render one frame into `sink` and advance.
    pub fn present_to<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> CubeResult<()> {
        self.render();
        sink.present(self.state.compositor.render())?;
        self.advance();
        Ok(())
    }

    /// Drive `sink` until `stop` fires or the sink fails.
    pub fn run<S: FrameSink + ?Sized>(
        &mut self,
        sink: &mut S,
        stop: &StopToken,
    ) -> CubeResult<()> {
        while !stop.is_stopped() {
            self.present_to(sink)?;
        }
        Ok(())
    }

    /// Back to the initial rotation so the sequence replays from frame 0.
    pub fn restart(&mut self) {
        tracing::debug!(after = self.frame_index, "restarting frame sequence");
        self.state.rotation = self.config.initial_rotation;
        self.frame_index = 0;
    }

    /// Lazy sequence of owned frames, produced on demand until `stop` fires.
    pub fn frames(&mut self, stop: StopToken) -> Frames<'_> {
        Frames { driver: self, stop }
    }
}

pub struct Frames<'a> {
    driver: &'a mut FrameDriver,
    stop: StopToken,
}

impl Iterator for Frames<'_> {
    type Item = Grid;

    fn next(&mut self) -> Option<Grid> {
        if self.stop.is_stopped() {
            return None;
        }
        Some(self.driver.step().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CubeSpec;

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 40,
            height: 20,
            cubes: vec![CubeSpec::new(5.0, 0.0).with_step(1.0)],
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_step_advances_rotation() {
        let mut driver = FrameDriver::new(small_config()).unwrap();
        driver.step();
        driver.step();
        let r = driver.rotation();
        assert!((r.a - 0.1).abs() < 1e-6);
        assert!((r.b - 0.1).abs() < 1e-6);
        assert!((r.c - 0.02).abs() < 1e-6);
        assert_eq!(driver.frame_index(), 2);
    }

    #[test]
    fn test_render_does_not_advance() {
        let mut driver = FrameDriver::new(small_config()).unwrap();
        let first = driver.render().clone();
        let again = driver.render().clone();
        assert_eq!(first, again);
        assert_eq!(driver.rotation(), RotationState::zero());
    }

    #[test]
    fn test_stats_count_every_sample() {
        let mut driver = FrameDriver::new(small_config()).unwrap();
        driver.render();
        let stats = driver.last_stats();
        assert_eq!(stats.samples, 6 * 100);
        assert!(stats.written > 0 && stats.written <= stats.samples);
    }

    #[test]
    fn test_frames_stop_when_token_fires() {
        let mut driver = FrameDriver::new(small_config()).unwrap();
        let stop = StopToken::new();
        let mut frames = driver.frames(stop.clone());
        assert!(frames.next().is_some());
        assert!(frames.next().is_some());
        stop.stop();
        assert!(frames.next().is_none());
        assert_eq!(driver.frame_index(), 2);
    }

    #[test]
    fn test_restart_replays_sequence() {
        let mut driver = FrameDriver::new(small_config()).unwrap();
        let first: Vec<Grid> = driver.frames(StopToken::new()).take(3).collect();
        driver.restart();
        let replay: Vec<Grid> = driver.frames(StopToken::new()).take(3).collect();
        assert_eq!(first, replay);
        assert_ne!(first[0], first[2]);
    }

    #[test]
    fn test_run_presents_until_stopped() {
        let mut driver = FrameDriver::new(small_config()).unwrap();
        let stop = StopToken::new();
        let mut seen = 0;
        let mut sink = |frame: &Grid| -> CubeResult<()> {
            assert_eq!((frame.width(), frame.height()), (40, 20));
            seen += 1;
            if seen == 4 {
                stop.stop();
            }
            Ok(())
        };
        driver.run(&mut sink, &stop).unwrap();
        assert_eq!(seen, 4);
        assert_eq!(driver.frame_index(), 4);
    }

    #[test]
    fn test_sink_error_propagates() {
        let mut driver = FrameDriver::new(small_config()).unwrap();
        let mut sink = |_: &Grid| -> CubeResult<()> { Err(crate::CubeError::display("closed")) };
        let err = driver.run(&mut sink, &StopToken::new()).unwrap_err();
        assert!(err.to_string().contains("closed"));
        assert_eq!(driver.frame_index(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        assert!(FrameDriver::new(config).is_err());
    }
}
