//! Console escape sequence parser
//!
//! A stateful parser that converts bytes into console actions. It handles
//! the `ESC [ params final` subset of ANSI control sequences; everything
//! else after an ESC is discarded.

mod action;
mod params;
mod state;

pub use action::{Action, ControlCode, CsiAction, CsiCommand};
pub use params::{Params, MAX_PARAMS};
pub use state::{Parser, State};
