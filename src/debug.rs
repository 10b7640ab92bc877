//! Diagnostic output routing

use serde::{Deserialize, Serialize};

/// `tracing` target for the platform debug channel
pub const PLATFORM_DEBUG_TARGET: &str = "mochi_console::debug";

/// Destination for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugDevice {
    /// Drop everything
    #[default]
    Discard,
    /// Emit on the platform debug channel
    PlatformDebugChannel,
    /// Echo through the current console
    ConsoleEcho,
}

/// Send `bytes` to the platform debug channel, one event per line
pub fn platform_debug_output(bytes: &[u8]) {
    for line in bytes.split(|&b| b == b'\n').filter(|line| !line.is_empty()) {
        tracing::info!(target: PLATFORM_DEBUG_TARGET, "{}", line.escape_ascii());
    }
}
