//! In-memory display
//!
//! [`MemoryDisplay`] owns one pixel buffer per screen and hands them out
//! through [`DisplayProvider`]. Used by the headless runner and the tests,
//! and able to dump a screen as a binary PPM image.

use std::io::{self, Write};

use crate::core::{
    DisplayProvider, FrameBuffer, PixelFormat, ScreenId, GLYPH_HEIGHT, GLYPH_WIDTH,
};

/// Display provider backed by heap buffers
#[derive(Debug, Clone)]
pub struct MemoryDisplay {
    top: Vec<u16>,
    bottom: Vec<u16>,
    format: PixelFormat,
    presented: [u64; 2],
}

impl Default for MemoryDisplay {
    fn default() -> Self {
        Self::new(PixelFormat::default())
    }
}

impl MemoryDisplay {
    /// Create a display with both screens zeroed
    pub fn new(format: PixelFormat) -> Self {
        Self {
            top: vec![0; screen_len(ScreenId::Top)],
            bottom: vec![0; screen_len(ScreenId::Bottom)],
            format,
            presented: [0; 2],
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixels of a screen, row-major
    pub fn pixels(&self, screen: ScreenId) -> &[u16] {
        match screen {
            ScreenId::Top => &self.top,
            ScreenId::Bottom => &self.bottom,
        }
    }

    fn pixels_mut(&mut self, screen: ScreenId) -> &mut [u16] {
        match screen {
            ScreenId::Top => &mut self.top,
            ScreenId::Bottom => &mut self.bottom,
        }
    }

    /// Raw pixel at `(x, y)`
    pub fn pixel(&self, screen: ScreenId, x: usize, y: usize) -> Option<u16> {
        if x >= screen.pixel_width() {
            return None;
        }
        self.pixels(screen).get(y * screen.pixel_width() + x).copied()
    }

    /// Pixels of tile `(x, y)`, row by row
    pub fn tile(&self, screen: ScreenId, x: usize, y: usize) -> Vec<u16> {
        let mut out = Vec::with_capacity(GLYPH_WIDTH * GLYPH_HEIGHT);
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if let Some(p) = self.pixel(screen, x * GLYPH_WIDTH + col, y * GLYPH_HEIGHT + row) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Number of times `present` was called for `screen`
    pub fn frames_presented(&self, screen: ScreenId) -> u64 {
        self.presented[screen_index(screen)]
    }

    /// Write a screen as a binary PPM (P6) image
    pub fn write_ppm<W: Write>(&self, screen: ScreenId, mut out: W) -> io::Result<()> {
        let (width, height) = (screen.pixel_width(), screen.pixel_height());
        write!(out, "P6\n{} {}\n255\n", width, height)?;
        let mut row = Vec::with_capacity(width * 3);
        for line in self.pixels(screen).chunks(width) {
            row.clear();
            for &p in line {
                let c = self.format.decode(p);
                row.extend_from_slice(&[c.r, c.g, c.b]);
            }
            out.write_all(&row)?;
        }
        out.flush()
    }
}

impl DisplayProvider for MemoryDisplay {
    fn acquire(&mut self, screen: ScreenId) -> Option<FrameBuffer<'_>> {
        let format = self.format;
        let (width, height) = (screen.pixel_width(), screen.pixel_height());
        FrameBuffer::new(self.pixels_mut(screen), width, height, width, format)
    }

    fn present(&mut self, screen: ScreenId) {
        self.presented[screen_index(screen)] += 1;
        tracing::trace!(?screen, "frame presented");
    }
}

fn screen_len(screen: ScreenId) -> usize {
    screen.pixel_width() * screen.pixel_height()
}

fn screen_index(screen: ScreenId) -> usize {
    match screen {
        ScreenId::Top => 0,
        ScreenId::Bottom => 1,
    }
}
