//! Parser State Machine
//!
//! Turns a byte stream into [`Action`]s. Three states:
//!
//! - Normal: printable bytes and C0 controls
//! - EscapeSeen: after ESC, only `[` continues the sequence
//! - CollectingParams: after `ESC [`, digits and `;` until a final byte
//!
//! Anything the console does not understand is consumed silently: an ESC
//! not followed by `[`, an unknown final byte, a control byte inside a
//! sequence, or a parameter list longer than [`MAX_PARAMS`].

use super::action::{Action, ControlCode, CsiAction, CsiCommand};
use super::params::{accumulate, Params, MAX_PARAMS};

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Normal,
    EscapeSeen,
    CollectingParams,
}

/// The escape-sequence parser
#[derive(Debug, Default)]
pub struct Parser {
    state: State,
    params: Params,
    /// Numeral being built, `None` until a digit is seen
    current: Option<u16>,
}

impl Parser {
    /// Create a new parser in the normal state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Return to the normal state, dropping any partial sequence.
    /// Returns whether something was dropped.
    pub fn reset(&mut self) -> bool {
        let partial = self.state != State::Normal;
        self.state = State::Normal;
        self.clear_params();
        partial
    }

    fn clear_params(&mut self) {
        self.params.clear();
        self.current = None;
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        data.iter().filter_map(|&b| self.advance(b)).collect()
    }

    /// Process a single byte
    pub fn advance(&mut self, byte: u8) -> Option<Action> {
        match self.state {
            State::Normal => self.process_normal(byte),
            State::EscapeSeen => self.process_escape(byte),
            State::CollectingParams => self.process_params(byte),
        }
    }

    fn process_normal(&mut self, byte: u8) -> Option<Action> {
        match byte {
            0x1B => {
                self.state = State::EscapeSeen;
                None
            }
            0x00..=0x1F => ControlCode::from_byte(byte).map(Action::Control),
            _ => Some(Action::Print(byte)),
        }
    }

    fn process_escape(&mut self, byte: u8) -> Option<Action> {
        if byte == b'[' {
            self.clear_params();
            self.state = State::CollectingParams;
        } else {
            tracing::trace!(byte, "dropping non-CSI escape");
            self.state = State::Normal;
        }
        None
    }

    fn process_params(&mut self, byte: u8) -> Option<Action> {
        match byte {
            b'0'..=b'9' => {
                self.current = Some(accumulate(self.current, byte));
                None
            }
            b';' => {
                self.params.push(self.current.take().unwrap_or(0));
                None
            }
            _ => {
                if let Some(n) = self.current.take() {
                    self.params.push(n);
                } else if !self.params.is_empty() {
                    self.params.push(0);
                }
                self.state = State::Normal;
                self.dispatch_csi(byte)
            }
        }
    }

    fn dispatch_csi(&mut self, final_byte: u8) -> Option<Action> {
        let Some(command) = CsiCommand::from_final(final_byte) else {
            tracing::trace!(final_byte, params = ?self.params.as_slice(), "dropping unknown CSI");
            return None;
        };
        if self.params.is_overflowed() {
            tracing::trace!(max = MAX_PARAMS, ?command, "dropping CSI with too many parameters");
            return None;
        }
        Some(Action::Csi(CsiAction {
            command,
            params: self.params,
        }))
    }
}
