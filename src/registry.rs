//! Console registry
//!
//! Owns a fixed set of console slots and tracks which one is current.
//! Slot 0 holds the default console, created on first use from the
//! registry's [`Config`]. Consoles are referred to by [`ConsoleId`]; an id
//! that does not name a live console falls back to the current console.

use std::fmt;

use crate::app::Config;
use crate::console::Console;
use crate::core::{DisplayProvider, Font, FrameBuffer, ScreenId};
use crate::debug::{platform_debug_output, DebugDevice};

/// Number of console slots, the default console included
pub const MAX_CONSOLES: usize = 8;

/// Handle to a console in a [`ConsoleRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsoleId(usize);

impl ConsoleId {
    /// The default console
    pub const DEFAULT: ConsoleId = ConsoleId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Default console plus caller-added consoles
#[derive(Debug)]
pub struct ConsoleRegistry<'a> {
    consoles: [Option<Console<'a>>; MAX_CONSOLES],
    current: ConsoleId,
    config: Config,
}

impl Default for ConsoleRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ConsoleRegistry<'a> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a registry whose default console follows `config`
    pub fn with_config(config: Config) -> Self {
        Self {
            consoles: std::array::from_fn(|_| None),
            current: ConsoleId::DEFAULT,
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The default console's id, creating it on first use
    pub fn get_default(&mut self) -> ConsoleId {
        self.console_at(ConsoleId::DEFAULT);
        ConsoleId::DEFAULT
    }

    /// Whether `id` names a live console
    pub fn contains(&self, id: ConsoleId) -> bool {
        id == ConsoleId::DEFAULT || matches!(self.consoles.get(id.0), Some(Some(_)))
    }

    /// Register a console. Returns `None` when every slot is taken.
    pub fn add(&mut self, console: Console<'a>) -> Option<ConsoleId> {
        let Some(index) = (1..MAX_CONSOLES).find(|&i| self.consoles[i].is_none()) else {
            tracing::warn!(max = MAX_CONSOLES, "console registry full");
            return None;
        };
        self.consoles[index] = Some(console);
        Some(ConsoleId(index))
    }

    /// Take a console back out. The default console cannot be removed;
    /// removing the current console selects the default.
    pub fn remove(&mut self, id: ConsoleId) -> Option<Console<'a>> {
        if id == ConsoleId::DEFAULT {
            return None;
        }
        let console = self.consoles.get_mut(id.0)?.take()?;
        if self.current == id {
            self.current = ConsoleId::DEFAULT;
        }
        Some(console)
    }

    /// Look up a console without creating the default
    pub fn console(&self, id: ConsoleId) -> Option<&Console<'a>> {
        self.consoles.get(id.0)?.as_ref()
    }

    /// The console `id` refers to, or the current one
    pub fn console_mut(&mut self, id: Option<ConsoleId>) -> &mut Console<'a> {
        let id = self.resolve(id);
        self.console_at(id)
    }

    pub fn current(&self) -> ConsoleId {
        self.current
    }

    /// Make `id` current (the default for `None`) and return the previous
    /// current console
    pub fn select(&mut self, id: Option<ConsoleId>) -> ConsoleId {
        let next = match id {
            Some(id) if self.contains(id) => id,
            Some(id) => {
                tracing::warn!(?id, "selecting unknown console, using default");
                ConsoleId::DEFAULT
            }
            None => ConsoleId::DEFAULT,
        };
        let previous = std::mem::replace(&mut self.current, next);
        tracing::debug!(?previous, current = ?next, "console selected");
        previous
    }

    /// Bind a console to `screen`, reset it, clear it and make it current.
    ///
    /// `None` re-creates the default console in place. The grid is sized to
    /// the screen; the default console keeps the configured window, clamped
    /// into that grid.
    pub fn init<D>(&mut self, display: &mut D, screen: ScreenId, id: Option<ConsoleId>) -> ConsoleId
    where
        D: DisplayProvider + ?Sized,
    {
        let id = match id {
            Some(id) if self.contains(id) && id != ConsoleId::DEFAULT => id,
            other => {
                if let Some(id) = other.filter(|&id| !self.contains(id)) {
                    tracing::warn!(?id, "initializing unknown console, using default");
                }
                self.consoles[0] = Some(Console::from_state(self.config.console_state()));
                ConsoleId::DEFAULT
            }
        };
        let window = self
            .config
            .console
            .window
            .filter(|_| id == ConsoleId::DEFAULT);
        let console = self.console_at(id);
        with_framebuffer(display, screen, |fb| console.init(fb, screen));
        // The grid now follows the screen; keep the configured window inside it
        if let Some(w) = window {
            console.set_window(
                usize::from(w.x),
                usize::from(w.y),
                usize::from(w.width),
                usize::from(w.height),
            );
        }
        self.current = id;
        id
    }

    /// Interpret `bytes` on console `id` (the current console for `None`).
    /// Returns the number of bytes consumed.
    pub fn write<D>(&mut self, display: &mut D, id: Option<ConsoleId>, bytes: &[u8]) -> usize
    where
        D: DisplayProvider + ?Sized,
    {
        let console = self.console_mut(id);
        let screen = console.state().screen();
        with_framebuffer(display, screen, |fb| console.process(fb, bytes))
    }

    /// Load a font; fonts without glyphs are rejected
    pub fn set_font(&mut self, id: Option<ConsoleId>, font: Font<'a>) -> bool {
        self.console_mut(id).set_font(font)
    }

    pub fn set_window(
        &mut self,
        id: Option<ConsoleId>,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) {
        self.console_mut(id).set_window(x, y, width, height);
    }

    /// Blank the console's window and home its cursor
    pub fn clear<D>(&mut self, display: &mut D, id: Option<ConsoleId>)
    where
        D: DisplayProvider + ?Sized,
    {
        let console = self.console_mut(id);
        let screen = console.state().screen();
        with_framebuffer(display, screen, |fb| console.clear(fb));
    }

    pub fn debug_device(&self) -> DebugDevice {
        self.config.debug_device
    }

    pub fn set_debug_device(&mut self, device: DebugDevice) {
        self.config.debug_device = device;
    }

    /// Route diagnostic output according to the debug device
    pub fn debug_write<D>(&mut self, display: &mut D, bytes: &[u8]) -> usize
    where
        D: DisplayProvider + ?Sized,
    {
        match self.config.debug_device {
            DebugDevice::Discard => bytes.len(),
            DebugDevice::PlatformDebugChannel => {
                platform_debug_output(bytes);
                bytes.len()
            }
            DebugDevice::ConsoleEcho => self.write(display, None, bytes),
        }
    }

    /// Format `args` and interpret the result as one write, so escape
    /// sequences may span format arguments
    pub fn write_formatted<D>(
        &mut self,
        display: &mut D,
        id: Option<ConsoleId>,
        args: fmt::Arguments<'_>,
    ) -> usize
    where
        D: DisplayProvider + ?Sized,
    {
        match args.as_str() {
            Some(text) => self.write(display, id, text.as_bytes()),
            None => self.write(display, id, fmt::format(args).as_bytes()),
        }
    }

    /// A `fmt::Write` adapter for console `id`
    pub fn writer<'r, D>(
        &'r mut self,
        display: &'r mut D,
        id: Option<ConsoleId>,
    ) -> ConsoleWriter<'r, 'a, D>
    where
        D: DisplayProvider + ?Sized,
    {
        ConsoleWriter {
            registry: self,
            display,
            id,
        }
    }

    fn resolve(&self, id: Option<ConsoleId>) -> ConsoleId {
        match id {
            None => self.current,
            Some(id) if self.contains(id) => id,
            Some(id) => {
                tracing::warn!(?id, current = ?self.current, "unknown console, using current");
                self.current
            }
        }
    }

    fn console_at(&mut self, id: ConsoleId) -> &mut Console<'a> {
        let index = if self.contains(id) { id.0 } else { 0 };
        let config = &self.config;
        self.consoles[index].get_or_insert_with(|| Console::from_state(config.console_state()))
    }
}

fn with_framebuffer<D, R>(
    display: &mut D,
    screen: ScreenId,
    f: impl FnOnce(&mut FrameBuffer<'_>) -> R,
) -> R
where
    D: DisplayProvider + ?Sized,
{
    match display.acquire(screen) {
        Some(mut fb) => f(&mut fb),
        None => {
            tracing::trace!(?screen, "no framebuffer, drawing discarded");
            f(&mut FrameBuffer::detached())
        }
    }
}

/// Formatted output into a registry console.
///
/// `write!` formats the whole message before handing it to the console.
/// Bare `write_str` calls are separate writes, and an escape sequence must
/// not be split across them.
pub struct ConsoleWriter<'r, 'a, D: ?Sized> {
    registry: &'r mut ConsoleRegistry<'a>,
    display: &'r mut D,
    id: Option<ConsoleId>,
}

impl<D> fmt::Write for ConsoleWriter<'_, '_, D>
where
    D: DisplayProvider + ?Sized,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.registry.write(&mut *self.display, self.id, s.as_bytes());
        Ok(())
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.registry.write_formatted(&mut *self.display, self.id, args);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CursorPos, TileRect};
    use crate::headless::MemoryDisplay;
    use std::fmt::Write as _;

    #[test]
    fn test_default_is_lazy_and_stable() {
        let mut registry = ConsoleRegistry::new();
        assert!(registry.console(ConsoleId::DEFAULT).is_none());
        let a = registry.get_default();
        let b = registry.get_default();
        assert_eq!(a, b);
        let console = registry.console(a).unwrap();
        assert_eq!(console.state().console_width(), 40);
        assert_eq!(console.state().console_height(), 30);
        assert_eq!(console.state().tab_size(), 3);
    }

    #[test]
    fn test_select_returns_previous() {
        let mut registry = ConsoleRegistry::new();
        let x = registry.add(Console::default()).unwrap();
        let y = registry.add(Console::default()).unwrap();

        assert_eq!(registry.select(Some(x)), ConsoleId::DEFAULT);
        assert_eq!(registry.select(Some(y)), x);
        assert_eq!(registry.select(None), y);
        assert_eq!(registry.current(), ConsoleId::DEFAULT);
    }

    #[test]
    fn test_add_until_full() {
        let mut registry = ConsoleRegistry::new();
        for _ in 1..MAX_CONSOLES {
            assert!(registry.add(Console::default()).is_some());
        }
        assert!(registry.add(Console::default()).is_none());
    }

    #[test]
    fn test_remove_current_selects_default() {
        let mut registry = ConsoleRegistry::new();
        let id = registry.add(Console::default()).unwrap();
        registry.select(Some(id));
        assert!(registry.remove(id).is_some());
        assert_eq!(registry.current(), ConsoleId::DEFAULT);
        assert!(!registry.contains(id));
        assert!(registry.remove(ConsoleId::DEFAULT).is_none());
    }

    #[test]
    fn test_unknown_id_falls_back_to_current() {
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::new();
        let id = registry.add(Console::default()).unwrap();
        registry.remove(id);

        registry.write(&mut display, Some(id), b"ab");
        let default = registry.console(ConsoleId::DEFAULT).unwrap();
        assert_eq!(default.state().cursor(), CursorPos::new(2, 0));
    }

    #[test]
    fn test_init_binds_and_selects() {
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::new();
        let id = registry.add(Console::default()).unwrap();

        assert_eq!(registry.init(&mut display, ScreenId::Top, Some(id)), id);
        assert_eq!(registry.current(), id);
        let state = registry.console(id).unwrap().state();
        assert!(state.is_initialized());
        assert_eq!(state.screen(), ScreenId::Top);
        assert_eq!(state.window(), TileRect::new(0, 0, 50, 30));
    }

    #[test]
    fn test_init_default_in_place() {
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::new();
        registry.write(&mut display, None, b"hello");

        let id = registry.init(&mut display, ScreenId::Bottom, None);
        assert_eq!(id, ConsoleId::DEFAULT);
        let state = registry.console(id).unwrap().state();
        assert_eq!(state.cursor(), CursorPos::new(0, 0));
        assert!(state.is_initialized());
    }

    #[test]
    fn test_debug_write_routing() {
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::new();
        registry.init(&mut display, ScreenId::Bottom, None);

        assert_eq!(registry.debug_write(&mut display, b"dropped"), 7);
        assert_eq!(registry.console_mut(None).state().cursor(), CursorPos::new(0, 0));

        registry.set_debug_device(DebugDevice::PlatformDebugChannel);
        registry.debug_write(&mut display, b"logged\n");
        assert_eq!(registry.console_mut(None).state().cursor(), CursorPos::new(0, 0));

        registry.set_debug_device(DebugDevice::ConsoleEcho);
        registry.debug_write(&mut display, b"echo");
        assert_eq!(registry.console_mut(None).state().cursor(), CursorPos::new(4, 0));
    }

    #[test]
    fn test_writer_formats_into_console() {
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::new();
        registry.init(&mut display, ScreenId::Bottom, None);

        write!(registry.writer(&mut display, None), "{}-{}", 12, 345).unwrap();
        assert_eq!(registry.console_mut(None).state().cursor(), CursorPos::new(6, 0));
    }

    #[test]
    fn test_writer_keeps_sequences_across_arguments() {
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::new();
        registry.init(&mut display, ScreenId::Bottom, None);

        let (row, col) = (std::hint::black_box(5u8), std::hint::black_box(3u8));
        write!(registry.writer(&mut display, None), "\x1b[{};{}H", row, col).unwrap();
        assert_eq!(registry.console_mut(None).state().cursor(), CursorPos::new(2, 4));
        assert_eq!(display.tile(ScreenId::Bottom, 0, 0), display.tile(ScreenId::Bottom, 5, 5));

        let color = std::hint::black_box(31u8);
        registry.write_formatted(&mut display, None, format_args!("\x1b[{}m", color));
        assert_eq!(
            registry.console_mut(None).state().rendition().fg,
            crate::core::Color::RED
        );
        assert_eq!(registry.console_mut(None).state().cursor(), CursorPos::new(2, 4));
    }

    #[test]
    fn test_init_keeps_configured_window() {
        let mut config = Config::default();
        config.console.window = Some(crate::app::WindowConfig {
            x: 2,
            y: 2,
            width: 10,
            height: 5,
        });
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::with_config(config);

        registry.init(&mut display, ScreenId::Bottom, None);
        let state = registry.console_mut(None).state();
        assert_eq!(state.console_width(), 40);
        assert_eq!(state.window(), TileRect::new(2, 2, 10, 5));
        assert_eq!(state.cursor(), CursorPos::new(2, 2));
        assert!(state.is_initialized());
    }

    #[test]
    fn test_init_clamps_configured_window_to_screen() {
        let mut config = Config::default();
        config.console.columns = 60;
        config.console.window = Some(crate::app::WindowConfig {
            x: 30,
            y: 20,
            width: 20,
            height: 20,
        });
        let mut display = MemoryDisplay::default();
        let mut registry = ConsoleRegistry::with_config(config);

        registry.init(&mut display, ScreenId::Bottom, None);
        assert_eq!(
            registry.console_mut(None).state().window(),
            TileRect::new(30, 20, 10, 10)
        );

        // Added consoles are not shaped by the config
        let id = registry.add(Console::default()).unwrap();
        registry.init(&mut display, ScreenId::Bottom, Some(id));
        assert_eq!(
            registry.console(id).unwrap().state().window(),
            TileRect::new(0, 0, 40, 30)
        );
    }

    #[test]
    fn test_with_config_tab_size() {
        let mut config = Config::default();
        config.console.tab_size = 8;
        let mut registry = ConsoleRegistry::with_config(config);
        let mut display = MemoryDisplay::default();
        registry.write(&mut display, None, b"\t");
        assert_eq!(registry.console_mut(None).state().cursor(), CursorPos::new(8, 0));
    }
}
