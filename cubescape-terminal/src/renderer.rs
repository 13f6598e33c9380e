/// Writes finished frames to a terminal
use crossterm::{cursor, style::Print, QueueableCommand};
use cubescape_core::{CubeResult, FrameSink, Grid};
use std::io::Write;

/// Display sink that redraws the whole grid from the top-left corner.
///
/// In raw mode `\n` does not return the carriage, so rows end in `\r\n`.
pub struct TerminalSink<W: Write> {
    writer: W,
    line: String,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            line: String::new(),
        }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn draw(&mut self, frame: &Grid) -> std::io::Result<()> {
        self.writer.queue(cursor::MoveTo(0, 0))?;
        for row in frame.rows() {
            self.line.clear();
            self.line.extend(row);
            self.line.push_str("\r\n");
            self.writer.queue(Print(&self.line))?;
        }
        self.writer.flush()
    }
}

impl<W: Write> FrameSink for TerminalSink<W> {
    fn present(&mut self, frame: &Grid) -> CubeResult<()> {
        Ok(self.draw(frame)?)
    }
}
