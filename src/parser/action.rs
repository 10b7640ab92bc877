//! Console Actions
//!
//! Semantic operations produced by the parser that should be applied to a
//! console.

use super::params::Params;

/// A console action produced by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Draw a code point at the cursor
    Print(u8),

    /// Execute a C0 control character
    Control(ControlCode),

    /// Execute a recognized CSI command
    Csi(CsiAction),
}

/// C0 control codes the console acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// BS - Backspace
    Backspace,
    /// HT - Horizontal Tab
    Tab,
    /// LF - Line Feed (also returns the carriage)
    LineFeed,
    /// CR - Carriage Return
    CarriageReturn,
}

impl ControlCode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x08 => Some(ControlCode::Backspace),
            0x09 => Some(ControlCode::Tab),
            0x0A => Some(ControlCode::LineFeed),
            0x0D => Some(ControlCode::CarriageReturn),
            _ => None,
        }
    }
}

/// CSI commands, by final byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsiCommand {
    /// `A`
    CursorUp,
    /// `B`
    CursorDown,
    /// `C`
    CursorForward,
    /// `D`
    CursorBack,
    /// `H` or `f`
    CursorPosition,
    /// `J`
    EraseInDisplay,
    /// `K`
    EraseInLine,
    /// `m`
    SelectGraphicRendition,
    /// `s`
    SaveCursor,
    /// `u`
    RestoreCursor,
}

impl CsiCommand {
    pub fn from_final(byte: u8) -> Option<Self> {
        Some(match byte {
            b'A' => CsiCommand::CursorUp,
            b'B' => CsiCommand::CursorDown,
            b'C' => CsiCommand::CursorForward,
            b'D' => CsiCommand::CursorBack,
            b'H' | b'f' => CsiCommand::CursorPosition,
            b'J' => CsiCommand::EraseInDisplay,
            b'K' => CsiCommand::EraseInLine,
            b'm' => CsiCommand::SelectGraphicRendition,
            b's' => CsiCommand::SaveCursor,
            b'u' => CsiCommand::RestoreCursor,
            _ => return None,
        })
    }
}

/// A complete CSI sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsiAction {
    pub command: CsiCommand,
    pub params: Params,
}

impl CsiAction {
    pub fn new(command: CsiCommand, params: &[u16]) -> Self {
        Self {
            command,
            params: Params::from_slice(params),
        }
    }

    /// Get parameter at index, or default value if not present
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index, default)
    }

    /// Get parameter at index, treating 0 as default
    pub fn param_or_default(&self, index: usize, default: u16) -> u16 {
        self.params.get_or_default(index, default)
    }
}
