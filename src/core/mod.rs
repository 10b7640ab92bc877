//! Console Core Module
//!
//! Platform-independent console state and drawing. This module contains:
//! - Glyph tables and the built-in font
//! - Palette, colors and attribute flags
//! - Framebuffer views and the display seam
//! - The tile renderer
//! - Per-console cursor/window/rendition state
//! - Deterministic snapshot generation

mod color;
mod font;
mod framebuffer;
mod renderer;
mod snapshot;
mod state;

pub use color::{codes, Attributes, Color, Palette, ResolvedColors, Rgb};
pub use font::{Font, GLYPH_BYTES, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use framebuffer::{DisplayProvider, FrameBuffer, PixelFormat, ScreenId};
pub use renderer::{RenderOverride, TileRect, TileRenderer, TileStyle};
pub use snapshot::{Snapshot, WindowSnapshot};
pub use state::{
    ConsoleState, CursorPos, EraseMode, Rendition, DEFAULT_COLUMNS, DEFAULT_ROWS,
    DEFAULT_TAB_SIZE,
};
