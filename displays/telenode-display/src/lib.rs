//! Display support for the telemetry node
//!
//! This crate provides:
//! - `DisplaySurface`: an `embedded-graphics` draw target with an explicit commit
//! - `FrameBuffer`: page-organized 1 bpp buffer matching the SSD1306 layout
//! - `Ssd1306`: blocking I2C driver for 128x64 SSD1306 panels
//! - `TelemetryRenderer`: draws the readout, status glyph, and graph trace
//!
//! # Layout
//!
//! ```text
//! y 0..8    message line (IP address), left untouched while running
//! y 8..16   "Value: <n>"                          status glyph at x 122
//! y 20..60  scrolling graph
//! ```

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod framebuffer;
pub mod renderer;
pub mod ssd1306;

// Re-export key types
pub use backend::{DisplayError, DisplaySurface};
pub use framebuffer::FrameBuffer;
pub use renderer::{TelemetryRenderer, MAX_MESSAGE_LINES};
pub use ssd1306::{Ssd1306, SSD1306_ADDR};
