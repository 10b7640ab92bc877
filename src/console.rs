//! Console Executor
//!
//! Ties together the parser and console state, applying parsed actions to
//! the state and drawing into the framebuffer handed in for each write.
//!
//! An escape sequence must be complete within one [`Console::process`]
//! call. Whatever is left open when the call returns is dropped, so a
//! later write always starts in the normal state.

use crate::core::{
    ConsoleState, EraseMode, Font, FrameBuffer, RenderOverride, ScreenId, Snapshot,
};
use crate::parser::{Action, ControlCode, CsiAction, CsiCommand, Parser};

/// A console: state plus parser
#[derive(Debug)]
pub struct Console<'a> {
    state: ConsoleState<'a>,
    parser: Parser,
}

impl Default for Console<'_> {
    fn default() -> Self {
        Self::from_state(ConsoleState::default())
    }
}

impl<'a> Console<'a> {
    /// Create an uninitialized console with the given font and grid size
    pub fn new(font: Font<'a>, columns: usize, rows: usize) -> Self {
        Self::from_state(ConsoleState::new(font, columns, rows))
    }

    pub fn from_state(state: ConsoleState<'a>) -> Self {
        Self {
            state,
            parser: Parser::new(),
        }
    }

    /// Get a reference to the console state
    pub fn state(&self) -> &ConsoleState<'a> {
        &self.state
    }

    /// Get a mutable reference to the console state
    pub fn state_mut(&mut self) -> &mut ConsoleState<'a> {
        &mut self.state
    }

    /// Bind to `screen`, reset and clear
    pub fn init(&mut self, fb: &mut FrameBuffer<'_>, screen: ScreenId) {
        self.parser.reset();
        self.state.init(fb, screen);
    }

    pub fn set_font(&mut self, font: Font<'a>) -> bool {
        self.state.set_font(font)
    }

    pub fn set_window(&mut self, x: usize, y: usize, width: usize, height: usize) {
        self.state.set_window(x, y, width, height);
    }

    pub fn set_render_override(&mut self, hook: Option<&'a mut dyn RenderOverride>) {
        self.state.set_render_override(hook);
    }

    pub fn clear(&mut self, fb: &mut FrameBuffer<'_>) {
        self.state.clear(fb);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(&self.state)
    }

    /// Interpret `data`, drawing into `fb`. Returns the number of bytes
    /// consumed, which is always `data.len()`.
    pub fn process(&mut self, fb: &mut FrameBuffer<'_>, data: &[u8]) -> usize {
        for &byte in data {
            if let Some(action) = self.parser.advance(byte) {
                self.apply_action(fb, action);
            }
        }
        if self.parser.reset() {
            tracing::trace!("dropping escape sequence left open at end of write");
        }
        data.len()
    }

    /// Apply a single parsed action
    fn apply_action(&mut self, fb: &mut FrameBuffer<'_>, action: Action) {
        match action {
            Action::Print(code) => self.state.put_char(fb, code),
            Action::Control(code) => self.execute_control(fb, code),
            Action::Csi(csi) => self.execute_csi(fb, &csi),
        }
    }

    fn execute_control(&mut self, fb: &mut FrameBuffer<'_>, code: ControlCode) {
        match code {
            ControlCode::Backspace => self.state.backspace(fb),
            ControlCode::Tab => self.state.tab(),
            ControlCode::LineFeed => self.state.newline(fb),
            ControlCode::CarriageReturn => self.state.carriage_return(),
        }
    }

    /// Execute a CSI sequence
    fn execute_csi(&mut self, fb: &mut FrameBuffer<'_>, csi: &CsiAction) {
        match csi.command {
            CsiCommand::CursorUp => {
                let n = csi.param_or_default(0, 1) as usize;
                self.state.move_up(n);
            }
            CsiCommand::CursorDown => {
                let n = csi.param_or_default(0, 1) as usize;
                self.state.move_down(n);
            }
            CsiCommand::CursorForward => {
                let n = csi.param_or_default(0, 1) as usize;
                self.state.move_forward(n);
            }
            CsiCommand::CursorBack => {
                let n = csi.param_or_default(0, 1) as usize;
                self.state.move_back(n);
            }
            CsiCommand::CursorPosition => {
                let row = csi.param_or_default(0, 1) as usize;
                let col = csi.param_or_default(1, 1) as usize;
                self.state.move_to(row, col);
            }
            CsiCommand::EraseInDisplay => match EraseMode::from_param(csi.param(0, 0)) {
                Some(mode) => self.state.erase_in_display(fb, mode),
                None => tracing::trace!(mode = csi.param(0, 0), "unknown erase-in-display mode"),
            },
            CsiCommand::EraseInLine => match EraseMode::from_param(csi.param(0, 0)) {
                Some(mode) => self.state.erase_in_line(fb, mode),
                None => tracing::trace!(mode = csi.param(0, 0), "unknown erase-in-line mode"),
            },
            CsiCommand::SelectGraphicRendition => self.execute_sgr(csi),
            CsiCommand::SaveCursor => self.state.save_cursor(),
            CsiCommand::RestoreCursor => self.state.restore_cursor(),
        }
    }

    /// Execute SGR. The list applies as a whole or not at all.
    fn execute_sgr(&mut self, csi: &CsiAction) {
        let mut rendition = self.state.rendition();
        let params = csi.params.as_slice();
        let params = if params.is_empty() { &[0][..] } else { params };

        for &param in params {
            if !rendition.apply_sgr(param) {
                tracing::trace!(param, ?params, "unsupported SGR parameter, sequence dropped");
                return;
            }
        }
        self.state.set_rendition(rendition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attributes, Color, CursorPos, PixelFormat, TileRect, GLYPH_HEIGHT, GLYPH_WIDTH};

    struct Harness {
        pixels: Vec<u16>,
        cols: usize,
        rows: usize,
    }

    impl Harness {
        fn new(cols: usize, rows: usize) -> Self {
            Self {
                pixels: vec![0; cols * GLYPH_WIDTH * rows * GLYPH_HEIGHT],
                cols,
                rows,
            }
        }

        fn write(&mut self, console: &mut Console<'_>, data: &[u8]) {
            let w = self.cols * GLYPH_WIDTH;
            let mut fb = FrameBuffer::new(
                &mut self.pixels,
                w,
                self.rows * GLYPH_HEIGHT,
                w,
                PixelFormat::Rgb565,
            )
            .unwrap();
            console.process(&mut fb, data);
        }
    }

    #[test]
    fn test_console_print() {
        let mut h = Harness::new(10, 3);
        let mut console = Console::new(Font::builtin(), 10, 3);
        h.write(&mut console, b"Hello");
        assert_eq!(console.state().cursor(), CursorPos::new(5, 0));
        assert_eq!(console.state().prev_cursor(), CursorPos::new(4, 0));
    }

    #[test]
    fn test_console_cursor_movement() {
        let mut h = Harness::new(10, 10);
        let mut console = Console::new(Font::builtin(), 10, 10);
        h.write(&mut console, b"\x1b[5;3H");
        assert_eq!(console.state().cursor(), CursorPos::new(2, 4));
        h.write(&mut console, b"\x1b[2A\x1b[C\x1b[0D\x1b[B");
        assert_eq!(console.state().cursor(), CursorPos::new(2, 3));
        h.write(&mut console, b"\x1b[H");
        assert_eq!(console.state().cursor(), CursorPos::new(0, 0));
    }

    #[test]
    fn test_console_colors() {
        let mut h = Harness::new(10, 3);
        let mut console = Console::new(Font::builtin(), 10, 3);
        h.write(&mut console, b"\x1b[31;1;44m");
        let r = console.state().rendition();
        assert_eq!(r.fg, Color::RED);
        assert_eq!(r.bg, Color::BLUE);
        assert!(r.flags.contains(Attributes::BOLD));
    }

    #[test]
    fn test_console_sgr_all_or_nothing() {
        let mut h = Harness::new(10, 3);
        let mut console = Console::new(Font::builtin(), 10, 3);
        h.write(&mut console, b"\x1b[32m");
        let before = console.state().rendition();
        h.write(&mut console, b"\x1b[1;31;38m");
        assert_eq!(console.state().rendition(), before);
    }

    #[test]
    fn test_console_sgr_reset() {
        let mut h = Harness::new(10, 3);
        let mut console = Console::new(Font::builtin(), 10, 3);
        h.write(&mut console, b"\x1b[1;4;7;33;45m\x1b[m");
        assert_eq!(console.state().rendition(), Default::default());
    }

    #[test]
    fn test_console_partial_sequence_dropped_between_writes() {
        let mut h = Harness::new(10, 3);
        let mut console = Console::new(Font::builtin(), 10, 3);
        h.write(&mut console, b"\x1b[9");
        h.write(&mut console, b"A");
        assert_eq!(console.state().cursor(), CursorPos::new(1, 0));
    }

    #[test]
    fn test_console_erase_line_modes() {
        let mut h = Harness::new(4, 1);
        let mut console = Console::new(Font::builtin(), 4, 1);
        h.write(&mut console, b"\x1b[44mABCD\x1b[0m");
        let blue = PixelFormat::Rgb565.encode(console.state().palette().normal(Color::BLUE));
        // Erasing uses the black background again
        h.write(&mut console, b"\x1b[1;2H\x1b[1K");
        assert_eq!(h.pixels[0], 0);
        assert_eq!(h.pixels[GLYPH_WIDTH], 0);
        assert_eq!(h.pixels[2 * GLYPH_WIDTH], blue);
        assert_eq!(console.state().cursor(), CursorPos::new(1, 0));
    }

    #[test]
    fn test_console_unknown_erase_mode_is_ignored() {
        let mut h = Harness::new(4, 1);
        let mut console = Console::new(Font::builtin(), 4, 1);
        h.write(&mut console, b"\x1b[41mX\x1b[m");
        let before = h.pixels.clone();
        h.write(&mut console, b"\x1b[H\x1b[3J\x1b[7K");
        assert_eq!(h.pixels, before);
    }

    #[test]
    fn test_console_save_restore() {
        let mut h = Harness::new(10, 10);
        let mut console = Console::new(Font::builtin(), 10, 10);
        h.write(&mut console, b"\x1b[3;4H\x1b[s\x1b[H\x1b[u");
        assert_eq!(console.state().cursor(), CursorPos::new(3, 2));
    }

    #[test]
    fn test_console_window_relative_position() {
        let mut h = Harness::new(20, 20);
        let mut console = Console::new(Font::builtin(), 20, 20);
        console.set_window(4, 4, 6, 6);
        h.write(&mut console, b"\x1b[100;100H");
        assert_eq!(console.state().cursor(), CursorPos::new(9, 9));
        assert_eq!(console.state().window(), TileRect::new(4, 4, 6, 6));
    }

    #[test]
    fn test_console_erase_display_all_homes() {
        let mut h = Harness::new(5, 5);
        let mut console = Console::new(Font::builtin(), 5, 5);
        h.write(&mut console, b"abc\ndef\x1b[2J");
        assert_eq!(console.state().cursor(), CursorPos::new(0, 0));
        assert!(h.pixels.iter().all(|&p| p == 0));
    }
}
