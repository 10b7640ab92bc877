//! Glyph table
//!
//! A [`Font`] is a borrowed view over a packed 8x8 bitmap table. Each glyph
//! occupies [`GLYPH_BYTES`] consecutive bytes, one byte per pixel row, with
//! bit 0 of each byte being the leftmost pixel. The console only ever holds
//! a reference to the table; the caller owns the bytes.

use std::fmt;

/// Glyph width in pixels
pub const GLYPH_WIDTH: usize = 8;
/// Glyph height in pixels
pub const GLYPH_HEIGHT: usize = 8;
/// Bytes per glyph
pub const GLYPH_BYTES: usize = GLYPH_HEIGHT;

/// Built-in ASCII glyphs, code points 0..128
static BUILTIN_GLYPHS: [[u8; GLYPH_BYTES]; 128] = font8x8::legacy::BASIC_LEGACY;

/// A glyph bitmap set covering `ascii_offset..ascii_offset + num_chars`
#[derive(Clone, Copy)]
pub struct Font<'a> {
    gfx: &'a [u8],
    ascii_offset: u16,
    num_chars: u16,
}

impl<'a> Font<'a> {
    /// Create a font over `gfx`.
    ///
    /// The table is not validated here; glyphs that fall past the end of
    /// `gfx` simply read as missing.
    pub const fn new(gfx: &'a [u8], ascii_offset: u16, num_chars: u16) -> Self {
        Self {
            gfx,
            ascii_offset,
            num_chars,
        }
    }

    /// Raw glyph bytes
    pub fn gfx(&self) -> &'a [u8] {
        self.gfx
    }

    /// First code point covered by the table
    pub fn ascii_offset(&self) -> u16 {
        self.ascii_offset
    }

    /// Number of glyphs in the table
    pub fn num_chars(&self) -> u16 {
        self.num_chars
    }

    /// Whether this font can be loaded into a console
    pub fn is_loadable(&self) -> bool {
        self.num_chars > 0
    }

    /// Check whether `code` falls inside the covered range
    pub fn covers(&self, code: u8) -> bool {
        let code = u32::from(code);
        let start = u32::from(self.ascii_offset);
        code >= start && code < start + u32::from(self.num_chars)
    }

    /// Look up the bitmap rows for `code`
    pub fn glyph(&self, code: u8) -> Option<&'a [u8]> {
        if !self.covers(code) {
            return None;
        }
        let index = usize::from(code) - usize::from(self.ascii_offset);
        let start = index * GLYPH_BYTES;
        self.gfx.get(start..start + GLYPH_BYTES)
    }

    /// Identity comparison: same backing table and same coverage
    pub fn same_as(&self, other: &Font<'_>) -> bool {
        std::ptr::eq(self.gfx.as_ptr(), other.gfx.as_ptr())
            && self.gfx.len() == other.gfx.len()
            && self.ascii_offset == other.ascii_offset
            && self.num_chars == other.num_chars
    }
}

impl Font<'static> {
    /// The built-in 128-glyph ASCII font
    pub fn builtin() -> Self {
        Self::new(BUILTIN_GLYPHS.as_flattened(), 0, 128)
    }
}

impl Default for Font<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Font<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("gfx_len", &self.gfx.len())
            .field("ascii_offset", &self.ascii_offset)
            .field("num_chars", &self.num_chars)
            .finish()
    }
}
