//! Tile renderer
//!
//! Turns tile-grid operations into pixel writes: blitting one glyph, blanking
//! a run of tiles, and shifting a window up by one tile row. Tile `(x, y)`
//! covers pixels `x * GLYPH_WIDTH .. (x + 1) * GLYPH_WIDTH` horizontally and
//! the same for rows.

use super::color::{Attributes, ResolvedColors};
use super::font::{Font, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::framebuffer::FrameBuffer;

/// Pixel row used for the underline decoration
const UNDERLINE_ROW: usize = GLYPH_HEIGHT - 1;
/// Pixel row used for the crossed-out decoration
const STRIKE_ROW: usize = GLYPH_HEIGHT / 2 - 1;

/// Hook for consoles that draw glyphs themselves
pub trait RenderOverride {
    /// Render `code_point` at tile `(x, y)`. Return `true` if it was handled
    /// and the built-in tile renderer should do nothing.
    fn try_render(&mut self, x: usize, y: usize, code_point: u8) -> bool;
}

/// A rectangle of tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl TileRect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column
    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the last row
    pub const fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Resolved drawing style for a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileStyle {
    pub colors: ResolvedColors,
    pub flags: Attributes,
}

/// Draws tiles into a borrowed framebuffer
#[derive(Debug)]
pub struct TileRenderer<'f, 'b> {
    fb: &'f mut FrameBuffer<'b>,
}

impl<'f, 'b> TileRenderer<'f, 'b> {
    pub fn new(fb: &'f mut FrameBuffer<'b>) -> Self {
        Self { fb }
    }

    /// Blit the glyph for `code` at tile `(x, y)`.
    ///
    /// Code points outside the font render as a background-filled tile.
    pub fn draw_glyph(&mut self, font: &Font<'_>, x: usize, y: usize, code: u8, style: TileStyle) {
        let Some(glyph) = font.glyph(code) else {
            self.fill_tiles(TileRect::new(x, y, 1, 1), style);
            return;
        };

        let format = self.fb.format();
        let fg = format.encode(style.colors.fg);
        let bg = format.encode(style.colors.bg);
        let concealed = style.flags.contains(Attributes::CONCEAL);
        let px = x * GLYPH_WIDTH;
        let py = y * GLYPH_HEIGHT;

        for (row, &bits) in glyph.iter().enumerate() {
            let line = (row == UNDERLINE_ROW && style.flags.contains(Attributes::UNDERLINE))
                || (row == STRIKE_ROW && style.flags.contains(Attributes::CROSSED_OUT));
            let bits = if concealed {
                0
            } else if line {
                0xFF
            } else {
                bits
            };
            for col in 0..GLYPH_WIDTH {
                let on = (bits >> col) & 1 != 0;
                self.fb.set_pixel(px + col, py + row, if on { fg } else { bg });
            }
        }
    }

    /// Fill every tile in `rect` with the style's background color
    pub fn fill_tiles(&mut self, rect: TileRect, style: TileStyle) {
        let bg = self.fb.format().encode(style.colors.bg);
        self.fb.fill_rect(
            rect.x * GLYPH_WIDTH,
            rect.y * GLYPH_HEIGHT,
            rect.width * GLYPH_WIDTH,
            rect.height * GLYPH_HEIGHT,
            bg,
        );
    }

    /// Shift every tile row of `window` up by one and blank the bottom row
    pub fn scroll_up(&mut self, window: TileRect, style: TileStyle) {
        if window.height == 0 {
            return;
        }
        self.fb.copy_rows(
            window.x * GLYPH_WIDTH,
            window.width * GLYPH_WIDTH,
            (window.y + 1) * GLYPH_HEIGHT,
            window.y * GLYPH_HEIGHT,
            (window.height - 1) * GLYPH_HEIGHT,
        );
        self.fill_tiles(
            TileRect::new(window.x, window.bottom() - 1, window.width, 1),
            style,
        );
    }
}
