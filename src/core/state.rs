//! Console state
//!
//! Cursor, window, rendition and font for one console, plus the operations
//! that move the cursor and realize drawing through the [`TileRenderer`].
//!
//! Positions are absolute tile coordinates in the console grid. The cursor
//! is always inside the window, and the window is always inside the grid.
//! Writing into the last column does not wrap immediately: the cursor stays
//! put with a pending wrap that the next printable byte resolves, so a full
//! window only scrolls once something is actually written below it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::color::{Attributes, Color, Palette};
use super::font::{Font, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::framebuffer::{FrameBuffer, ScreenId};
use super::renderer::{RenderOverride, TileRect, TileRenderer, TileStyle};

/// Default grid width in tiles
pub const DEFAULT_COLUMNS: usize = 40;
/// Default grid height in tiles
pub const DEFAULT_ROWS: usize = 30;
/// Default tab width
pub const DEFAULT_TAB_SIZE: usize = 3;

/// A tile position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorPos {
    pub x: usize,
    pub y: usize,
}

impl CursorPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Erase extent for `J` and `K`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// Cursor to the end (inclusive)
    ToEnd,
    /// Start to the cursor (inclusive)
    ToStart,
    All,
}

impl EraseMode {
    pub fn from_param(param: u16) -> Option<Self> {
        match param {
            0 => Some(EraseMode::ToEnd),
            1 => Some(EraseMode::ToStart),
            2 => Some(EraseMode::All),
            _ => None,
        }
    }
}

/// Colors and attribute flags applied to newly drawn glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendition {
    pub fg: Color,
    pub bg: Color,
    pub flags: Attributes,
}

impl Default for Rendition {
    fn default() -> Self {
        Self {
            fg: Color::DEFAULT_FG,
            bg: Color::DEFAULT_BG,
            flags: Attributes::empty(),
        }
    }
}

impl Rendition {
    /// Apply one SGR parameter. Returns `false` for values this console
    /// does not know, leaving `self` untouched.
    pub fn apply_sgr(&mut self, param: u16) -> bool {
        match param {
            0 => *self = Self::default(),
            1 => self.flags.insert(Attributes::BOLD),
            2 => self.flags.insert(Attributes::FAINT),
            3 => self.flags.insert(Attributes::ITALIC),
            4 => self.flags.insert(Attributes::UNDERLINE),
            5 => {
                self.flags.remove(Attributes::BLINK_FAST);
                self.flags.insert(Attributes::BLINK_SLOW);
            }
            6 => {
                self.flags.remove(Attributes::BLINK_SLOW);
                self.flags.insert(Attributes::BLINK_FAST);
            }
            7 => self.flags.insert(Attributes::REVERSE),
            8 => self.flags.insert(Attributes::CONCEAL),
            9 => self.flags.insert(Attributes::CROSSED_OUT),
            22 => self.flags.remove(Attributes::BOLD | Attributes::FAINT),
            23 => self.flags.remove(Attributes::ITALIC),
            24 => self.flags.remove(Attributes::UNDERLINE),
            25 => self
                .flags
                .remove(Attributes::BLINK_SLOW | Attributes::BLINK_FAST),
            27 => self.flags.remove(Attributes::REVERSE),
            28 => self.flags.remove(Attributes::CONCEAL),
            29 => self.flags.remove(Attributes::CROSSED_OUT),
            30..=37 => {
                self.fg = Color::new((param - 30) as u8);
                self.flags.remove(Attributes::FG_BRIGHT);
            }
            39 => {
                self.fg = Color::DEFAULT_FG;
                self.flags.remove(Attributes::FG_BRIGHT);
            }
            40..=47 => {
                self.bg = Color::new((param - 40) as u8);
                self.flags.remove(Attributes::BG_BRIGHT);
            }
            49 => {
                self.bg = Color::DEFAULT_BG;
                self.flags.remove(Attributes::BG_BRIGHT);
            }
            90..=97 => {
                self.fg = Color::new((param - 90) as u8);
                self.flags.insert(Attributes::FG_BRIGHT);
            }
            100..=107 => {
                self.bg = Color::new((param - 100) as u8);
                self.flags.insert(Attributes::BG_BRIGHT);
            }
            _ => return false,
        }
        true
    }
}

/// State of one console
pub struct ConsoleState<'a> {
    font: Font<'a>,
    screen: ScreenId,
    cursor: CursorPos,
    /// Last position a glyph was rendered at
    prev_cursor: CursorPos,
    saved_cursor: CursorPos,
    pending_wrap: bool,
    console_width: usize,
    console_height: usize,
    window: TileRect,
    tab_size: usize,
    rendition: Rendition,
    palette: Palette,
    render_override: Option<&'a mut dyn RenderOverride>,
    initialized: bool,
}

impl Default for ConsoleState<'_> {
    fn default() -> Self {
        Self::new(Font::builtin(), DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}

impl<'a> ConsoleState<'a> {
    /// Create an uninitialized console with a full-grid window
    pub fn new(font: Font<'a>, columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            font,
            screen: ScreenId::default(),
            cursor: CursorPos::default(),
            prev_cursor: CursorPos::default(),
            saved_cursor: CursorPos::default(),
            pending_wrap: false,
            console_width: columns,
            console_height: rows,
            window: TileRect::new(0, 0, columns, rows),
            tab_size: DEFAULT_TAB_SIZE,
            rendition: Rendition::default(),
            palette: Palette::default(),
            render_override: None,
            initialized: false,
        }
    }

    pub fn font(&self) -> &Font<'a> {
        &self.font
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn cursor(&self) -> CursorPos {
        self.cursor
    }

    pub fn prev_cursor(&self) -> CursorPos {
        self.prev_cursor
    }

    pub fn saved_cursor(&self) -> CursorPos {
        self.saved_cursor
    }

    pub fn pending_wrap(&self) -> bool {
        self.pending_wrap
    }

    pub fn console_width(&self) -> usize {
        self.console_width
    }

    pub fn console_height(&self) -> usize {
        self.console_height
    }

    pub fn window(&self) -> TileRect {
        self.window
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    pub fn rendition(&self) -> Rendition {
        self.rendition
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn has_render_override(&self) -> bool {
        self.render_override.is_some()
    }

    /// Load a font. Fonts without glyphs are rejected and the current font
    /// is kept; returns whether the font was taken.
    pub fn set_font(&mut self, font: Font<'a>) -> bool {
        if !font.is_loadable() {
            tracing::warn!(?font, "rejecting font without glyphs");
            return false;
        }
        self.font = font;
        true
    }

    /// Set the tab width; zero is treated as one
    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.tab_size = tab_size.max(1);
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn set_rendition(&mut self, rendition: Rendition) {
        self.rendition = rendition;
    }

    /// Install or remove the glyph render hook
    pub fn set_render_override(&mut self, hook: Option<&'a mut dyn RenderOverride>) {
        self.render_override = hook;
    }

    /// Resize the grid; the window is reset to cover it
    pub fn set_grid(&mut self, columns: usize, rows: usize) {
        self.console_width = columns.max(1);
        self.console_height = rows.max(1);
        self.window = TileRect::new(0, 0, self.console_width, self.console_height);
        self.home();
    }

    /// Set the clip window, clamped into the grid. The cursor moves to the
    /// window origin.
    pub fn set_window(&mut self, x: usize, y: usize, width: usize, height: usize) {
        let x = x.min(self.console_width - 1);
        let y = y.min(self.console_height - 1);
        let width = width.clamp(1, self.console_width - x);
        let height = height.clamp(1, self.console_height - y);
        self.window = TileRect::new(x, y, width, height);
        tracing::debug!(x, y, width, height, "console window set");
        self.home();
    }

    /// Bind to `screen` and reset to a freshly initialized state.
    ///
    /// The grid is sized to the screen, the window covers the grid, the
    /// rendition is reset and the screen cleared. Font, palette, tab size and
    /// render hook are kept.
    pub fn init(&mut self, fb: &mut FrameBuffer<'_>, screen: ScreenId) {
        self.screen = screen;
        self.set_grid(
            screen.pixel_width() / GLYPH_WIDTH,
            screen.pixel_height() / GLYPH_HEIGHT,
        );
        self.rendition = Rendition::default();
        self.prev_cursor = CursorPos::default();
        self.saved_cursor = self.cursor;
        self.initialized = true;
        self.clear(fb);
        tracing::debug!(?screen, "console initialized");
    }

    fn home(&mut self) {
        self.cursor = CursorPos::new(self.window.x, self.window.y);
        self.pending_wrap = false;
    }

    fn tile_style(&self) -> TileStyle {
        let r = self.rendition;
        TileStyle {
            colors: self.palette.resolve(r.fg, r.bg, r.flags),
            flags: r.flags,
        }
    }

    fn erase_style(&self) -> TileStyle {
        TileStyle {
            flags: Attributes::empty(),
            ..self.tile_style()
        }
    }

    /// Render `code` at tile `(x, y)` with the current rendition
    pub fn draw(&mut self, fb: &mut FrameBuffer<'_>, x: usize, y: usize, code: u8) {
        self.prev_cursor = CursorPos::new(x, y);
        if let Some(hook) = self.render_override.as_deref_mut() {
            if hook.try_render(x, y, code) {
                return;
            }
        }
        let style = self.tile_style();
        TileRenderer::new(fb).draw_glyph(&self.font, x, y, code, style);
    }

    /// Draw a printable byte at the cursor and advance
    pub fn put_char(&mut self, fb: &mut FrameBuffer<'_>, code: u8) {
        if self.pending_wrap {
            self.newline(fb);
        }
        let CursorPos { x, y } = self.cursor;
        self.draw(fb, x, y, code);
        if x + 1 >= self.window.right() {
            self.pending_wrap = true;
        } else {
            self.cursor.x = x + 1;
        }
    }

    /// Move to the left edge of the next row, scrolling at the bottom
    pub fn newline(&mut self, fb: &mut FrameBuffer<'_>) {
        self.pending_wrap = false;
        self.cursor.x = self.window.x;
        if self.cursor.y + 1 >= self.window.bottom() {
            self.scroll(fb);
            self.cursor.y = self.window.bottom() - 1;
        } else {
            self.cursor.y += 1;
        }
    }

    pub fn carriage_return(&mut self) {
        self.pending_wrap = false;
        self.cursor.x = self.window.x;
    }

    /// Advance to the next tab stop; stops past the window edge leave the
    /// cursor in the last column with a pending wrap.
    pub fn tab(&mut self) {
        if self.pending_wrap {
            return;
        }
        let rel = self.cursor.x - self.window.x;
        let target = self.window.x + (rel / self.tab_size + 1) * self.tab_size;
        if target >= self.window.right() {
            self.cursor.x = self.window.right() - 1;
            self.pending_wrap = true;
        } else {
            self.cursor.x = target;
        }
    }

    /// Step back one tile, onto the previous row if needed, and blank it
    pub fn backspace(&mut self, fb: &mut FrameBuffer<'_>) {
        if self.pending_wrap {
            self.pending_wrap = false;
        } else if self.cursor.x > self.window.x {
            self.cursor.x -= 1;
        } else if self.cursor.y > self.window.y {
            self.cursor.y -= 1;
            self.cursor.x = self.window.right() - 1;
        }
        let style = self.erase_style();
        TileRenderer::new(fb).fill_tiles(TileRect::new(self.cursor.x, self.cursor.y, 1, 1), style);
    }

    /// Shift the window up one row and blank the bottom row
    pub fn scroll(&mut self, fb: &mut FrameBuffer<'_>) {
        tracing::debug!(window = ?self.window, "scroll");
        let style = self.erase_style();
        TileRenderer::new(fb).scroll_up(self.window, style);
    }

    /// Blank the whole window and home the cursor
    pub fn clear(&mut self, fb: &mut FrameBuffer<'_>) {
        let style = self.erase_style();
        TileRenderer::new(fb).fill_tiles(self.window, style);
        self.home();
    }

    /// Erase part of the window (`J`)
    pub fn erase_in_display(&mut self, fb: &mut FrameBuffer<'_>, mode: EraseMode) {
        let w = self.window;
        let y = self.cursor.y;
        let style = self.erase_style();
        match mode {
            EraseMode::ToEnd => {
                self.erase_in_line(fb, EraseMode::ToEnd);
                TileRenderer::new(fb).fill_tiles(
                    TileRect::new(w.x, y + 1, w.width, w.bottom() - (y + 1)),
                    style,
                );
            }
            EraseMode::ToStart => {
                TileRenderer::new(fb).fill_tiles(TileRect::new(w.x, w.y, w.width, y - w.y), style);
                self.erase_in_line(fb, EraseMode::ToStart);
            }
            EraseMode::All => self.clear(fb),
        }
    }

    /// Erase part of the cursor row (`K`)
    pub fn erase_in_line(&mut self, fb: &mut FrameBuffer<'_>, mode: EraseMode) {
        let w = self.window;
        let CursorPos { x, y } = self.cursor;
        let span = match mode {
            EraseMode::ToEnd => TileRect::new(x, y, w.right() - x, 1),
            EraseMode::ToStart => TileRect::new(w.x, y, x + 1 - w.x, 1),
            EraseMode::All => TileRect::new(w.x, y, w.width, 1),
        };
        let style = self.erase_style();
        TileRenderer::new(fb).fill_tiles(span, style);
    }

    pub fn move_up(&mut self, n: usize) {
        self.pending_wrap = false;
        self.cursor.y = self.cursor.y.saturating_sub(n).max(self.window.y);
    }

    pub fn move_down(&mut self, n: usize) {
        self.pending_wrap = false;
        self.cursor.y = self
            .cursor
            .y
            .saturating_add(n)
            .min(self.window.bottom() - 1);
    }

    pub fn move_forward(&mut self, n: usize) {
        self.pending_wrap = false;
        self.cursor.x = self
            .cursor
            .x
            .saturating_add(n)
            .min(self.window.right() - 1);
    }

    pub fn move_back(&mut self, n: usize) {
        self.pending_wrap = false;
        self.cursor.x = self.cursor.x.saturating_sub(n).max(self.window.x);
    }

    /// Absolute move, 1-based and relative to the window origin; 0 counts as 1
    pub fn move_to(&mut self, row: usize, col: usize) {
        self.pending_wrap = false;
        let row = row.max(1) - 1;
        let col = col.max(1) - 1;
        self.cursor.y = self.window.y + row.min(self.window.height - 1);
        self.cursor.x = self.window.x + col.min(self.window.width - 1);
    }

    pub fn save_cursor(&mut self) {
        self.saved_cursor = self.cursor;
    }

    /// Return to the saved position, clamped into the current window
    pub fn restore_cursor(&mut self) {
        self.pending_wrap = false;
        let w = self.window;
        self.cursor.x = self.saved_cursor.x.clamp(w.x, w.right() - 1);
        self.cursor.y = self.saved_cursor.y.clamp(w.y, w.bottom() - 1);
    }
}

impl fmt::Debug for ConsoleState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleState")
            .field("font", &self.font)
            .field("screen", &self.screen)
            .field("cursor", &self.cursor)
            .field("prev_cursor", &self.prev_cursor)
            .field("pending_wrap", &self.pending_wrap)
            .field("console_width", &self.console_width)
            .field("console_height", &self.console_height)
            .field("window", &self.window)
            .field("tab_size", &self.tab_size)
            .field("rendition", &self.rendition)
            .field("render_override", &self.render_override.is_some())
            .field("initialized", &self.initialized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PixelFormat;

    fn pixels_for(cols: usize, rows: usize) -> Vec<u16> {
        vec![0u16; cols * GLYPH_WIDTH * rows * GLYPH_HEIGHT]
    }

    fn fb(pixels: &mut [u16], cols: usize, rows: usize) -> FrameBuffer<'_> {
        let w = cols * GLYPH_WIDTH;
        FrameBuffer::new(pixels, w, rows * GLYPH_HEIGHT, w, PixelFormat::Rgb565).unwrap()
    }

    #[test]
    fn test_defaults() {
        let state = ConsoleState::default();
        assert_eq!(state.console_width(), 40);
        assert_eq!(state.console_height(), 30);
        assert_eq!(state.tab_size(), 3);
        assert_eq!(state.window(), TileRect::new(0, 0, 40, 30));
        assert_eq!(state.rendition(), Rendition::default());
        assert!(!state.is_initialized());
    }

    #[test]
    fn test_put_char_advances_and_defers_wrap() {
        let mut pixels = pixels_for(4, 2);
        let mut fb = fb(&mut pixels, 4, 2);
        let mut state = ConsoleState::new(Font::builtin(), 4, 2);

        for _ in 0..4 {
            state.put_char(&mut fb, b'x');
        }
        assert_eq!(state.cursor(), CursorPos::new(3, 0));
        assert!(state.pending_wrap());

        state.put_char(&mut fb, b'y');
        assert_eq!(state.cursor(), CursorPos::new(1, 1));
        assert_eq!(state.prev_cursor(), CursorPos::new(0, 1));
    }

    #[test]
    fn test_tab_stops_relative_to_window() {
        let mut state = ConsoleState::new(Font::builtin(), 20, 5);
        state.set_window(2, 0, 10, 5);
        state.set_tab_size(4);

        state.tab();
        assert_eq!(state.cursor().x, 6);
        state.tab();
        assert_eq!(state.cursor().x, 10);
        state.tab();
        assert_eq!(state.cursor().x, 11);
        assert!(state.pending_wrap());
    }

    #[test]
    fn test_zero_tab_size_is_one() {
        let mut state = ConsoleState::default();
        state.set_tab_size(0);
        assert_eq!(state.tab_size(), 1);
        state.tab();
        assert_eq!(state.cursor().x, 1);
    }

    #[test]
    fn test_newline_scrolls_at_bottom() {
        let mut pixels = pixels_for(2, 2);
        let mut fb = fb(&mut pixels, 2, 2);
        let mut state = ConsoleState::new(Font::builtin(), 2, 2);

        state.newline(&mut fb);
        assert_eq!(state.cursor(), CursorPos::new(0, 1));
        state.newline(&mut fb);
        assert_eq!(state.cursor(), CursorPos::new(0, 1));
    }

    #[test]
    fn test_set_window_clamps() {
        let mut state = ConsoleState::new(Font::builtin(), 10, 10);
        state.set_window(8, 12, 50, 0);
        assert_eq!(state.window(), TileRect::new(8, 9, 2, 1));
        assert_eq!(state.cursor(), CursorPos::new(8, 9));
    }

    #[test]
    fn test_cursor_motion_clamped_to_window() {
        let mut state = ConsoleState::new(Font::builtin(), 20, 20);
        state.set_window(5, 5, 5, 5);

        state.move_up(100);
        state.move_back(100);
        assert_eq!(state.cursor(), CursorPos::new(5, 5));

        state.move_down(100);
        state.move_forward(100);
        assert_eq!(state.cursor(), CursorPos::new(9, 9));

        state.move_to(2, 3);
        assert_eq!(state.cursor(), CursorPos::new(7, 6));

        state.move_to(0, 0);
        assert_eq!(state.cursor(), CursorPos::new(5, 5));
    }

    #[test]
    fn test_save_restore_clamps_into_window() {
        let mut state = ConsoleState::new(Font::builtin(), 20, 20);
        state.move_to(15, 15);
        state.save_cursor();
        state.set_window(0, 0, 10, 10);
        state.restore_cursor();
        assert_eq!(state.cursor(), CursorPos::new(9, 9));
    }

    #[test]
    fn test_backspace_wraps_to_previous_row() {
        let mut pixels = pixels_for(4, 2);
        let mut fb = fb(&mut pixels, 4, 2);
        let mut state = ConsoleState::new(Font::builtin(), 4, 2);

        state.move_to(2, 1);
        state.backspace(&mut fb);
        assert_eq!(state.cursor(), CursorPos::new(3, 0));

        state.move_to(1, 1);
        state.backspace(&mut fb);
        assert_eq!(state.cursor(), CursorPos::new(0, 0));
    }

    #[test]
    fn test_rejects_empty_font() {
        let mut state = ConsoleState::default();
        let before = *state.font();
        let gfx = [0u8; 8];
        assert!(!state.set_font(Font::new(&gfx, 0, 0)));
        assert!(state.font().same_as(&before));
        assert!(state.set_font(Font::new(&gfx, 0, 1)));
        assert_eq!(state.font().num_chars(), 1);
    }

    #[test]
    fn test_sgr_rendition() {
        let mut r = Rendition::default();
        assert!(r.apply_sgr(31));
        assert!(r.apply_sgr(1));
        assert_eq!(r.fg, Color::RED);
        assert!(r.flags.contains(Attributes::BOLD));

        assert!(r.apply_sgr(94));
        assert_eq!(r.fg, Color::BLUE);
        assert!(r.flags.contains(Attributes::FG_BRIGHT));
        assert!(r.apply_sgr(39));
        assert_eq!(r.fg, Color::DEFAULT_FG);
        assert!(!r.flags.contains(Attributes::FG_BRIGHT));

        let before = r;
        assert!(!r.apply_sgr(38));
        assert_eq!(r, before);

        assert!(r.apply_sgr(0));
        assert_eq!(r, Rendition::default());
    }

    #[test]
    fn test_init_sizes_grid_to_screen() {
        let mut state = ConsoleState::default();
        state.move_to(3, 3);
        state.init(&mut FrameBuffer::detached(), ScreenId::Top);
        assert_eq!(state.console_width(), 50);
        assert_eq!(state.console_height(), 30);
        assert_eq!(state.window(), TileRect::new(0, 0, 50, 30));
        assert_eq!(state.cursor(), CursorPos::new(0, 0));
        assert!(state.is_initialized());
        assert_eq!(state.screen(), ScreenId::Top);
    }

    struct Recorder(Vec<(usize, usize, u8)>);

    impl RenderOverride for Recorder {
        fn try_render(&mut self, x: usize, y: usize, code_point: u8) -> bool {
            self.0.push((x, y, code_point));
            code_point == b'!'
        }
    }

    #[test]
    fn test_render_override_consulted_first() {
        let mut pixels = pixels_for(2, 1);
        let mut recorder = Recorder(Vec::new());
        {
            let mut fb = fb(&mut pixels, 2, 1);
            let mut state = ConsoleState::new(Font::builtin(), 2, 1);
            state.set_render_override(Some(&mut recorder));
            state.put_char(&mut fb, b'!');
        }
        // Handled: nothing drawn
        assert!(pixels.iter().all(|&p| p == 0));
        assert_eq!(recorder.0, vec![(0, 0, b'!')]);
    }
}
