//! Page-organized frame buffer
//!
//! One byte covers eight vertical pixels of a column, bit 0 at the top,
//! which is the layout SSD1306-class controllers expect on the wire.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Panel width in pixels
pub const WIDTH: usize = 128;

/// Panel height in pixels
pub const HEIGHT: usize = 64;

/// Number of 8-row pages
pub const PAGES: usize = HEIGHT / 8;

/// 128x64 1 bpp buffer with per-page dirty tracking
#[derive(Clone)]
pub struct FrameBuffer {
    pages: [[u8; WIDTH]; PAGES],
    /// Bit `n` set when page `n` changed since the last flush
    dirty: u8,
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
            dirty: 0,
        }
    }

    /// Set or clear one pixel; out-of-range points are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return;
        }

        let page = y as usize / 8;
        let mask = 1u8 << (y as usize % 8);
        let byte = &mut self.pages[page][x as usize];
        let updated = if on { *byte | mask } else { *byte & !mask };

        if updated != *byte {
            *byte = updated;
            self.dirty |= 1 << page;
        }
    }

    /// Read one pixel; out-of-range points read as off
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return false;
        }
        self.pages[y as usize / 8][x as usize] & (1 << (y as usize % 8)) != 0
    }

    /// Raw bytes of one page
    pub fn page(&self, page: usize) -> &[u8; WIDTH] {
        &self.pages[page]
    }

    pub fn is_dirty(&self, page: usize) -> bool {
        self.dirty & (1 << page) != 0
    }

    /// Mark every page for the next flush
    pub fn mark_all_dirty(&mut self) {
        self.dirty = 0xFF;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = 0;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.size == Size::zero() {
            return Ok(());
        }

        for y in area.rows() {
            for x in area.columns() {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_pixel_layout() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(3, 9, true);

        assert!(fb.pixel(3, 9));
        assert_eq!(fb.page(1)[3], 0b0000_0010);
        assert!(fb.is_dirty(1));
        assert!(!fb.is_dirty(0));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(-1, 0, true);
        fb.set_pixel(128, 0, true);
        fb.set_pixel(0, 64, true);

        assert!(!fb.pixel(128, 0));
        assert!((0..PAGES).all(|page| !fb.is_dirty(page)));
    }

    #[test]
    fn test_unchanged_pixel_not_dirty() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(0, 0, false);
        assert!(!fb.is_dirty(0));
    }

    #[test]
    fn test_fill_and_clear() {
        let mut fb = FrameBuffer::new();
        fb.fill_solid(&Rectangle::new(Point::new(0, 8), Size::new(128, 8)), BinaryColor::On)
            .unwrap();
        assert!(fb.page(1).iter().all(|&b| b == 0xFF));
        assert!(fb.page(0).iter().all(|&b| b == 0));

        fb.clear(BinaryColor::Off).unwrap();
        assert!(!fb.pixel(64, 12));
    }

    #[test]
    fn test_draw_line() {
        let mut fb = FrameBuffer::new();
        Line::new(Point::new(0, 40), Point::new(1, 20))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();

        assert!(fb.pixel(0, 40));
        assert!(fb.pixel(1, 20));
    }
}
