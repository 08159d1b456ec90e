//! SSD1306 OLED display driver
//!
//! Driver for 128x64 SSD1306-based OLED displays over blocking I2C.
//! Drawing goes to a local [`FrameBuffer`]; [`Ssd1306::flush`] sends only
//! the pages that changed since the previous flush.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::i2c::I2c;

use crate::backend::{DisplayError, DisplaySurface};
use crate::framebuffer::{FrameBuffer, HEIGHT, PAGES, WIDTH};

/// SSD1306 I2C address (0x3C, or 0x3D with SA0 high)
pub const SSD1306_ADDR: u8 = 0x3C;

/// Control byte: the rest of the transfer is commands
const CONTROL_COMMAND: u8 = 0x00;

/// Control byte: the rest of the transfer is display data
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const RESUME_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Power-on sequence for an internally pumped 128x64 panel
const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80, // Default clock
    cmd::SET_MUX_RATIO,
    (HEIGHT - 1) as u8,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14, // Enable charge pump
    cmd::SET_MEMORY_MODE,
    0x00, // Horizontal addressing
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12, // Alternative COM config
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::RESUME_RAM,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    buffer: FrameBuffer,
}

impl<I2C> Ssd1306<I2C>
where
    I2C: I2c,
{
    /// Create a driver at the default address
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, SSD1306_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            buffer: FrameBuffer::new(),
        }
    }

    /// Initialize the controller and blank the panel
    ///
    /// Fails with [`DisplayError::InitFailed`] if nothing acknowledges the
    /// address.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.commands(INIT_SEQUENCE)
            .map_err(|_| DisplayError::InitFailed)?;

        self.buffer = FrameBuffer::new();
        self.buffer.mark_all_dirty();
        self.flush()
    }

    /// Send a command sequence in one transfer
    fn commands(&mut self, cmds: &[u8]) -> Result<(), I2C::Error> {
        let mut data = [0u8; 32];
        data[0] = CONTROL_COMMAND;
        for chunk in cmds.chunks(data.len() - 1) {
            data[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.address, &data[..=chunk.len()])?;
        }
        Ok(())
    }

    /// Send every dirty page to the panel
    pub fn flush(&mut self) -> Result<(), DisplayError> {
        for page in 0..PAGES {
            if !self.buffer.is_dirty(page) {
                continue;
            }

            self.commands(&[
                cmd::SET_COLUMN_ADDR,
                0,
                (WIDTH - 1) as u8,
                cmd::SET_PAGE_ADDR,
                page as u8,
                page as u8,
            ])
            .map_err(|_| DisplayError::Communication)?;

            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(self.buffer.page(page));
            self.i2c
                .write(self.address, &data)
                .map_err(|_| DisplayError::Communication)?;
        }

        self.buffer.mark_clean();
        Ok(())
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> OriginDimensions for Ssd1306<I2C> {
    fn size(&self) -> Size {
        self.buffer.size()
    }
}

impl<I2C> DrawTarget for Ssd1306<I2C> {
    type Color = BinaryColor;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.buffer.draw_iter(pixels).map_err(|never| match never {})
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.buffer
            .fill_solid(area, color)
            .map_err(|never| match never {})
    }
}

impl<I2C: I2c> DisplaySurface for Ssd1306<I2C> {
    fn commit(&mut self) -> Result<(), DisplayError> {
        self.flush()
    }
}
