//! Colors and text attributes
//!
//! The console works with a fixed palette: eight ANSI colors, their bright
//! variants, and eight faint variants. Cells carry a palette index for the
//! foreground and background plus an [`Attributes`] bitmask; the two are
//! resolved to concrete RGB values only when a tile is drawn.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Escape shorthands for the common colors
pub mod codes {
    pub const RESET: &[u8] = b"\x1b[0m";
    pub const BLACK: &[u8] = b"\x1b[30m";
    pub const RED: &[u8] = b"\x1b[31;1m";
    pub const GREEN: &[u8] = b"\x1b[32;1m";
    pub const YELLOW: &[u8] = b"\x1b[33;1m";
    pub const BLUE: &[u8] = b"\x1b[34;1m";
    pub const MAGENTA: &[u8] = b"\x1b[35;1m";
    pub const CYAN: &[u8] = b"\x1b[36;1m";
    pub const WHITE: &[u8] = b"\x1b[37;1m";
}

bitflags! {
    /// Text attribute flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attributes: u16 {
        const BOLD        = 1 << 0;
        const FAINT       = 1 << 1;
        /// Carried for renderer extensions, not drawn here
        const ITALIC      = 1 << 2;
        const UNDERLINE   = 1 << 3;
        /// Carried for renderer extensions, not drawn here
        const BLINK_SLOW  = 1 << 4;
        /// Carried for renderer extensions, not drawn here
        const BLINK_FAST  = 1 << 5;
        const REVERSE     = 1 << 6;
        const CONCEAL     = 1 << 7;
        const CROSSED_OUT = 1 << 8;
        const FG_BRIGHT   = 1 << 11;
        const BG_BRIGHT   = 1 << 12;
    }
}

/// Palette index of one of the eight base colors (0..=7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(u8);

impl Color {
    pub const BLACK: Color = Color(0);
    pub const RED: Color = Color(1);
    pub const GREEN: Color = Color(2);
    pub const YELLOW: Color = Color(3);
    pub const BLUE: Color = Color(4);
    pub const MAGENTA: Color = Color(5);
    pub const CYAN: Color = Color(6);
    pub const WHITE: Color = Color(7);

    /// Default foreground
    pub const DEFAULT_FG: Color = Color::WHITE;
    /// Default background
    pub const DEFAULT_BG: Color = Color::BLACK;

    /// Build a color from a palette index, keeping only the low three bits
    pub const fn new(index: u8) -> Self {
        Color(index & 0x07)
    }

    /// Palette index (0..=7)
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// A 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// Foreground/background pair after attributes have been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColors {
    pub fg: Rgb,
    pub bg: Rgb,
}

/// The 24-entry console palette: normal, bright and faint banks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    normal: [Rgb; 8],
    bright: [Rgb; 8],
    faint: [Rgb; 8],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            normal: [
                Rgb::new(0, 0, 0),       // black
                Rgb::new(128, 0, 0),     // red
                Rgb::new(0, 128, 0),     // green
                Rgb::new(128, 128, 0),   // yellow
                Rgb::new(0, 0, 128),     // blue
                Rgb::new(128, 0, 128),   // magenta
                Rgb::new(0, 128, 128),   // cyan
                Rgb::new(192, 192, 192), // white
            ],
            bright: [
                Rgb::new(128, 128, 128),
                Rgb::new(255, 0, 0),
                Rgb::new(0, 255, 0),
                Rgb::new(255, 255, 0),
                Rgb::new(0, 0, 255),
                Rgb::new(255, 0, 255),
                Rgb::new(0, 255, 255),
                Rgb::new(255, 255, 255),
            ],
            faint: [
                Rgb::new(0, 0, 0),
                Rgb::new(64, 0, 0),
                Rgb::new(0, 64, 0),
                Rgb::new(64, 64, 0),
                Rgb::new(0, 0, 64),
                Rgb::new(64, 0, 64),
                Rgb::new(0, 64, 64),
                Rgb::new(96, 96, 96),
            ],
        }
    }
}

impl Palette {
    /// Build a palette from 16 ANSI entries (normal then bright) and 8 faint entries
    pub fn new(ansi: [Rgb; 16], faint: [Rgb; 8]) -> Self {
        let mut normal = [Rgb::default(); 8];
        let mut bright = [Rgb::default(); 8];
        normal.copy_from_slice(&ansi[..8]);
        bright.copy_from_slice(&ansi[8..]);
        Self {
            normal,
            bright,
            faint,
        }
    }

    /// Normal-bank entry
    pub fn normal(&self, color: Color) -> Rgb {
        self.normal[usize::from(color.index())]
    }

    /// Bright-bank entry
    pub fn bright(&self, color: Color) -> Rgb {
        self.bright[usize::from(color.index())]
    }

    /// Faint-bank entry
    pub fn faint(&self, color: Color) -> Rgb {
        self.faint[usize::from(color.index())]
    }

    /// Resolve a foreground/background pair under `flags`.
    ///
    /// Bold or bright-fg picks the bright bank for the foreground, faint
    /// picks the faint bank. Reverse swaps the pair, conceal paints the
    /// foreground in the background color.
    pub fn resolve(&self, fg: Color, bg: Color, flags: Attributes) -> ResolvedColors {
        let mut fg = if flags.intersects(Attributes::BOLD | Attributes::FG_BRIGHT) {
            self.bright(fg)
        } else if flags.contains(Attributes::FAINT) {
            self.faint(fg)
        } else {
            self.normal(fg)
        };
        let mut bg = if flags.contains(Attributes::BG_BRIGHT) {
            self.bright(bg)
        } else {
            self.normal(bg)
        };

        if flags.contains(Attributes::REVERSE) {
            std::mem::swap(&mut fg, &mut bg);
        }
        if flags.contains(Attributes::CONCEAL) {
            fg = bg;
        }

        ResolvedColors { fg, bg }
    }
}
