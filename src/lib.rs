//! Mochi Console Library
//!
//! A tile-based text console for small bitmap displays. Bytes written to a
//! console are split into printable code points, which are blitted as 8x8
//! glyphs into a framebuffer owned by the display subsystem, and ANSI
//! control sequences, which move the cursor, erase and change colors.
//!
//! - `core`: fonts, palette, framebuffer views, tile renderer, console state
//! - `parser`: the `ESC [` control sequence parser
//! - `console`: parser and state tied together
//! - `registry`: default/current console bookkeeping and debug routing
//! - `app`: configuration
//! - `debug`: diagnostic output routing
//! - `headless`: an in-memory display provider

pub mod app;
pub mod console;
pub mod core;
pub mod debug;
pub mod headless;
pub mod parser;
pub mod registry;

pub use crate::console::Console;
pub use crate::core::{DisplayProvider, Font, FrameBuffer, RenderOverride, ScreenId, Snapshot};
pub use debug::DebugDevice;
pub use headless::MemoryDisplay;
pub use registry::{ConsoleId, ConsoleRegistry, ConsoleWriter};
