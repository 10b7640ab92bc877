//! Framebuffer access
//!
//! The pixel memory belongs to the display subsystem. A [`FrameBuffer`] is a
//! bounds-checked view over one acquired buffer of 16-bit pixels; every
//! write outside the buffer is dropped instead of faulting.
//!
//! [`DisplayProvider`] is the seam to the display subsystem: it hands out a
//! view for a screen and is told when the frame is ready to present.

use serde::{Deserialize, Serialize};

use super::color::Rgb;

/// Logical display target a console is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenId {
    /// 400x240 upper screen
    Top,
    /// 320x240 lower screen
    #[default]
    Bottom,
}

impl ScreenId {
    /// Screen width in pixels
    pub const fn pixel_width(self) -> usize {
        match self {
            ScreenId::Top => 400,
            ScreenId::Bottom => 320,
        }
    }

    /// Screen height in pixels
    pub const fn pixel_height(self) -> usize {
        240
    }
}

/// 16-bit pixel encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 5-6-5, red in the high bits
    #[default]
    Rgb565,
    /// 5-6-5, blue in the high bits
    Bgr565,
}

impl PixelFormat {
    /// Pack a color into a pixel
    pub fn encode(self, color: Rgb) -> u16 {
        let r = u16::from(color.r >> 3);
        let g = u16::from(color.g >> 2);
        let b = u16::from(color.b >> 3);
        match self {
            PixelFormat::Rgb565 => (r << 11) | (g << 5) | b,
            PixelFormat::Bgr565 => (b << 11) | (g << 5) | r,
        }
    }

    /// Unpack a pixel, expanding each channel back to 8 bits
    pub fn decode(self, pixel: u16) -> Rgb {
        let hi = ((pixel >> 11) & 0x1F) as u8;
        let g = ((pixel >> 5) & 0x3F) as u8;
        let lo = (pixel & 0x1F) as u8;
        let (r, b) = match self {
            PixelFormat::Rgb565 => (hi, lo),
            PixelFormat::Bgr565 => (lo, hi),
        };
        Rgb::new((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }
}

/// Bounds-checked view over foreign-owned pixel memory (row-major)
#[derive(Debug)]
pub struct FrameBuffer<'a> {
    pixels: &'a mut [u16],
    width: usize,
    height: usize,
    /// Distance between rows, in pixels
    stride: usize,
    format: PixelFormat,
}

impl<'a> FrameBuffer<'a> {
    /// Wrap an acquired buffer.
    ///
    /// Returns `None` when `stride < width` or the slice is too short to
    /// hold `height` rows.
    pub fn new(
        pixels: &'a mut [u16],
        width: usize,
        height: usize,
        stride: usize,
        format: PixelFormat,
    ) -> Option<Self> {
        if stride < width {
            return None;
        }
        let needed = match height {
            0 => 0,
            h => stride.checked_mul(h - 1)?.checked_add(width)?,
        };
        if pixels.len() < needed {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
            stride,
            format,
        })
    }

    /// A zero-sized buffer that swallows every write
    pub fn detached() -> Self {
        Self {
            pixels: &mut [],
            width: 0,
            height: 0,
            stride: 0,
            format: PixelFormat::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.stride + x)
    }

    /// Read a raw pixel
    pub fn pixel(&self, x: usize, y: usize) -> Option<u16> {
        self.offset(x, y).and_then(|i| self.pixels.get(i).copied())
    }

    /// Read a pixel as a color
    pub fn color_at(&self, x: usize, y: usize) -> Option<Rgb> {
        self.pixel(x, y).map(|p| self.format.decode(p))
    }

    /// Write a raw pixel; out-of-bounds writes are dropped
    pub fn set_pixel(&mut self, x: usize, y: usize, value: u16) {
        if let Some(px) = self.offset(x, y).and_then(|i| self.pixels.get_mut(i)) {
            *px = value;
        }
    }

    /// Fill a rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, value: u16) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        if x >= x_end {
            return;
        }
        for py in y..y_end {
            let start = py * self.stride;
            if let Some(row) = self.pixels.get_mut(start + x..start + x_end) {
                row.fill(value);
            }
        }
    }

    /// Copy `rows` pixel rows of the span `x..x + w` from `src_y` to `dst_y`.
    ///
    /// Overlapping ranges are handled; the span is clipped to the buffer.
    pub fn copy_rows(&mut self, x: usize, w: usize, src_y: usize, dst_y: usize, rows: usize) {
        let x_end = x.saturating_add(w).min(self.width);
        if x >= x_end {
            return;
        }
        let rows = rows
            .min(self.height.saturating_sub(src_y))
            .min(self.height.saturating_sub(dst_y));

        let mut copy_row = |row: usize| {
            let src = (src_y + row) * self.stride + x;
            let dst = (dst_y + row) * self.stride + x;
            let len = x_end - x;
            if src + len <= self.pixels.len() && dst + len <= self.pixels.len() {
                self.pixels.copy_within(src..src + len, dst);
            }
        };

        if dst_y <= src_y {
            (0..rows).for_each(&mut copy_row);
        } else {
            (0..rows).rev().for_each(&mut copy_row);
        }
    }
}

/// Display subsystem seam
pub trait DisplayProvider {
    /// Hand out the pixel buffer for `screen`, if one is available
    fn acquire(&mut self, screen: ScreenId) -> Option<FrameBuffer<'_>>;

    /// The frame for `screen` is complete
    fn present(&mut self, screen: ScreenId);
}
