//! Deterministic snapshot generation
//!
//! Snapshots capture the observable console state in a serializable form
//! for testing and debugging. Feeding the same bytes to a fresh console must
//! always produce the same snapshot.

use serde::{Deserialize, Serialize};

use super::framebuffer::ScreenId;
use super::renderer::TileRect;
use super::state::{ConsoleState, CursorPos};

/// A snapshot of one console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub screen: ScreenId,
    pub initialized: bool,
    /// Grid dimensions in tiles
    pub cols: usize,
    pub rows: usize,
    pub window: WindowSnapshot,
    pub cursor: CursorPos,
    /// Last position a glyph was drawn at
    pub prev_cursor: CursorPos,
    pub saved_cursor: CursorPos,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pending_wrap: bool,
    pub tab_size: usize,
    pub fg: u8,
    pub bg: u8,
    /// Raw attribute bits
    pub flags: u16,
    /// Attribute names, for reading
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

/// Snapshot of the clip window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl From<TileRect> for WindowSnapshot {
    fn from(rect: TileRect) -> Self {
        WindowSnapshot {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

impl Snapshot {
    /// Create a snapshot from console state
    pub fn from_state(state: &ConsoleState<'_>) -> Self {
        let rendition = state.rendition();
        Snapshot {
            screen: state.screen(),
            initialized: state.is_initialized(),
            cols: state.console_width(),
            rows: state.console_height(),
            window: state.window().into(),
            cursor: state.cursor(),
            prev_cursor: state.prev_cursor(),
            saved_cursor: state.saved_cursor(),
            pending_wrap: state.pending_wrap(),
            tab_size: state.tab_size(),
            fg: rendition.fg.index(),
            bg: rendition.bg.index(),
            flags: rendition.flags.bits(),
            attributes: rendition
                .flags
                .iter_names()
                .map(|(name, _)| name.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Serialize snapshot to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// One-line summary for logs and the headless runner
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{:?} {}x{} window {},{} {}x{} cursor {},{}{} fg {} bg {}",
            self.screen,
            self.cols,
            self.rows,
            self.window.x,
            self.window.y,
            self.window.width,
            self.window.height,
            self.cursor.x,
            self.cursor.y,
            if self.pending_wrap { "+" } else { "" },
            self.fg,
            self.bg,
        );
        if !self.attributes.is_empty() {
            text.push_str(" [");
            text.push_str(&self.attributes.join(","));
            text.push(']');
        }
        text
    }
}
