/// Depth-buffered character compositing
use std::fmt;

use crate::projection::Projected;

/// Default glyph for cells no surface reaches.
pub const DEFAULT_BACKGROUND: char = '\'';

/// A finished frame: a fixed-size, row-major grid of glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Grid {
    pub fn new(width: usize, height: usize, fill: char) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Rows top to bottom, each exactly `width` glyphs.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Render as text, one line per row, each terminated by `\n`.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.rows() {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }

    /// Count cells holding `glyph`.
    pub fn count(&self, glyph: char) -> usize {
        self.cells.iter().filter(|c| **c == glyph).count()
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn fill(&mut self, glyph: char) {
        self.cells.fill(glyph);
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Owns the depth buffer and the glyph grid for one frame at a time.
///
/// Each cell's depth is the largest `ooz` written to it since the last
/// reset, and its glyph is the one submitted with that depth.
#[derive(Debug, Clone)]
pub struct Compositor {
    background: char,
    depth_buffer: Vec<f32>,
    grid: Grid,
}

impl Compositor {
    pub fn new(width: usize, height: usize, background: char) -> Self {
        Self {
            background,
            depth_buffer: vec![0.0; width * height],
            grid: Grid::new(width, height, background),
        }
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    pub fn background(&self) -> char {
        self.background
    }

    /// Clear to the background glyph at zero depth. Call before each frame.
    pub fn reset(&mut self) {
        self.depth_buffer.fill(0.0);
        self.grid.fill(self.background);
    }

    /// Depth-test one sample and write it if it is nearer than what the
    /// cell holds. Off-screen and occluded samples are dropped; ties keep
    /// the earlier glyph.
    ///
    /// Returns whether the cell was written.
    pub fn submit(&mut self, x: i32, y: i32, ooz: f32, glyph: char) -> bool {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return false;
        };
        let Some(idx) = self.grid.index(x, y) else {
            return false;
        };

        if ooz > self.depth_buffer[idx] {
            self.depth_buffer[idx] = ooz;
            self.grid.cells[idx] = glyph;
            true
        } else {
            false
        }
    }

    pub fn submit_projected(&mut self, p: &Projected, glyph: char) -> bool {
        self.submit(p.x, p.y, p.ooz, glyph)
    }

    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        self.grid.index(x, y).map(|idx| self.depth_buffer[idx])
    }

    /// The composited frame.
    pub fn render(&self) -> &Grid {
        &self.grid
    }
}
