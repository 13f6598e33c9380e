//! Terminal front end for cubescape
//!
//! Owns the process-facing half of rendering: terminal setup and teardown,
//! the frame loop and its timing, and the keys that end a run. Frames come
//! from `cubescape_core::FrameDriver` and are drawn by `TerminalSink`.

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, terminal,
};
use cubescape_core::{FrameDriver, StopToken};
use std::io::{stdout, Stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::TerminalSink;

/// How the app takes over the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Raw mode on the alternate screen; `q`, `Esc` or `Ctrl-C` quit.
    Fullscreen,
    /// Frames written in place on the normal screen, no key handling.
    Plain,
}

/// Runs the frame loop against a terminal
///
/// Setup and teardown sequences go through the same writer as the frames.
/// Raw mode is process-wide and only touched in `OutputMode::Fullscreen`.
pub struct TerminalApp<W: Write = Stdout> {
    driver: FrameDriver,
    sink: TerminalSink<W>,
    stop: StopToken,
    mode: OutputMode,
    frame_limit: Option<u64>,
    frame_delay: Option<Duration>,
    frames_drawn: u64,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp<Stdout> {
    pub fn new(driver: FrameDriver, mode: OutputMode) -> Self {
        Self::with_writer(driver, mode, stdout())
    }
}

impl<W: Write> TerminalApp<W> {
    pub fn with_writer(driver: FrameDriver, mode: OutputMode, writer: W) -> Self {
        let frame_delay = driver.config().frame_delay();
        Self {
            driver,
            sink: TerminalSink::new(writer),
            stop: StopToken::new(),
            mode,
            frame_limit: None,
            frame_delay,
            frames_drawn: 0,
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Stop after `limit` frames.
    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Handle for stopping the loop from elsewhere, e.g. a signal handler.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn into_writer(self) -> W {
        self.sink.into_inner()
    }

    pub fn run(&mut self) -> Result<()> {
        if let Err(err) = self.enter() {
            // Undo whatever part of setup went through.
            let _ = self.exit();
            return Err(err);
        }

        let result = self.main_loop();

        // Always try to restore terminal state.
        let restored = self.exit();
        result.and(restored)
    }

    fn enter(&mut self) -> Result<()> {
        let out = self.sink.writer_mut();
        match self.mode {
            OutputMode::Fullscreen => {
                terminal::enable_raw_mode()?;
                execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
            }
            OutputMode::Plain => {
                execute!(out, terminal::Clear(terminal::ClearType::All), cursor::Hide)?;
            }
        }
        Ok(())
    }

    /// Runs every restore step even if an earlier one fails, and reports
    /// the first failure.
    fn exit(&mut self) -> Result<()> {
        let out = self.sink.writer_mut();
        let mut results = Vec::with_capacity(3);
        if self.mode == OutputMode::Fullscreen {
            results.push(terminal::disable_raw_mode());
            results.push(execute!(out, terminal::LeaveAlternateScreen));
        }
        results.push(execute!(out, cursor::Show));
        results.into_iter().collect::<std::io::Result<()>>()?;
        Ok(())
    }

    fn main_loop(&mut self) -> Result<()> {
        tracing::info!(mode = ?self.mode, limit = ?self.frame_limit, delay = ?self.frame_delay, "frame loop started");

        while !self.stop.is_stopped() {
            if self.frame_limit.is_some_and(|limit| self.frames_drawn >= limit) {
                break;
            }
            let frame_start = Instant::now();

            if self.mode == OutputMode::Fullscreen {
                while event::poll(Duration::from_millis(0))? {
                    self.handle_event(event::read()?);
                }
                if self.stop.is_stopped() {
                    break;
                }
            }

            self.driver.present_to(&mut self.sink)?;
            self.frames_drawn += 1;

            // Frame timing
            self.frame_count += 1;
            if let Some(delay) = self.frame_delay {
                let elapsed = frame_start.elapsed();
                if elapsed < delay {
                    std::thread::sleep(delay - elapsed);
                } else if elapsed > delay * 2 {
                    tracing::warn!(?elapsed, ?delay, "frame took longer than twice the frame delay");
                }
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
                tracing::debug!(fps = self.fps, frame = self.driver.frame_index(), "frame rate");
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if is_quit_key(&key) {
                tracing::debug!(?key.code, "quit requested");
                self.stop.stop();
            }
        }
    }
}

/// Keys that end a fullscreen run. Nothing else reacts to input.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
