//! Configuration for the console

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{ConsoleState, Font, Palette, Rgb, ScreenId};
use crate::debug::DebugDevice;

/// Console configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geometry of the default console
    pub console: ConsoleConfig,
    /// Color palette
    pub colors: ColorPalette,
    /// Where diagnostic output goes
    pub debug_device: DebugDevice,
    /// Screen the headless runner binds to
    pub screen: ScreenId,
}

/// Default console geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Grid width in tiles
    pub columns: u16,
    /// Grid height in tiles
    pub rows: u16,
    pub tab_size: u16,
    /// Clip window; the full grid when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowConfig>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            columns: 40,
            rows: 30,
            tab_size: 3,
            window: None,
        }
    }
}

/// Clip window, in tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Color palette configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    /// The 16 ANSI colors: 0-7 normal, 8-15 bright
    pub ansi: [(u8, u8, u8); 16],
    /// Faint variants of the 8 base colors
    pub faint: [(u8, u8, u8); 8],
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            ansi: [
                (0, 0, 0),       // 0: Black
                (128, 0, 0),     // 1: Red
                (0, 128, 0),     // 2: Green
                (128, 128, 0),   // 3: Yellow
                (0, 0, 128),     // 4: Blue
                (128, 0, 128),   // 5: Magenta
                (0, 128, 128),   // 6: Cyan
                (192, 192, 192), // 7: White
                (128, 128, 128), // 8: Bright Black
                (255, 0, 0),     // 9: Bright Red
                (0, 255, 0),     // 10: Bright Green
                (255, 255, 0),   // 11: Bright Yellow
                (0, 0, 255),     // 12: Bright Blue
                (255, 0, 255),   // 13: Bright Magenta
                (0, 255, 255),   // 14: Bright Cyan
                (255, 255, 255), // 15: Bright White
            ],
            faint: [
                (0, 0, 0),
                (64, 0, 0),
                (0, 64, 0),
                (64, 64, 0),
                (0, 0, 64),
                (64, 0, 64),
                (0, 64, 64),
                (96, 96, 96),
            ],
        }
    }
}

impl ColorPalette {
    /// Build the runtime palette
    pub fn to_palette(&self) -> Palette {
        Palette::new(self.ansi.map(Rgb::from), self.faint.map(Rgb::from))
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config.sanitized())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/mochi-console/config.json
        if let Some(config_dir) = dirs_config_path() {
            let config_path = config_dir.join("config.json");
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring config")
                    }
                }
            }
        }
        Self::default()
    }

    /// Clamp zero sizes to one
    pub fn sanitized(mut self) -> Self {
        let c = &mut self.console;
        c.columns = c.columns.max(1);
        c.rows = c.rows.max(1);
        c.tab_size = c.tab_size.max(1);
        if let Some(w) = c.window.as_mut() {
            w.width = w.width.max(1);
            w.height = w.height.max(1);
        }
        self
    }

    /// Build an uninitialized console state with the built-in font
    pub fn console_state<'a>(&self) -> ConsoleState<'a> {
        let c = &self.console;
        let mut state =
            ConsoleState::new(Font::builtin(), usize::from(c.columns), usize::from(c.rows));
        state.set_tab_size(usize::from(c.tab_size));
        state.set_palette(self.colors.to_palette());
        if let Some(w) = c.window {
            state.set_window(
                usize::from(w.x),
                usize::from(w.y),
                usize::from(w.width),
                usize::from(w.height),
            );
        }
        state
    }
}

/// Get the configuration directory path
fn dirs_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("mochi-console"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
