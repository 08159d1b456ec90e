//! Telemetry frame renderer
//!
//! Draws the numeric readout, the client-status glyph, and the graph
//! trace onto a [`DisplaySurface`], committing once per frame.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use telenode_core::graph::{GraphSegment, PlotWindow};
use telenode_core::traits::FrameRenderer;
use telenode_core::Sample;

use crate::backend::{DisplayError, DisplaySurface};

/// Height of one text line in pixels
const LINE_HEIGHT: i32 = 8;

/// Lines that fit on the panel
pub const MAX_MESSAGE_LINES: usize = 8;

/// Readout band (second text line)
const TEXT_BAND_TOP: i32 = 8;

/// Status glyph geometry
const STATUS_RADIUS: u32 = 3;
const STATUS_CENTER_Y: i32 = 11;
const STATUS_RIGHT_INSET: i32 = 6;

/// Renders telemetry frames and full-screen messages
pub struct TelemetryRenderer<D> {
    surface: D,
    window: PlotWindow,
}

impl<D: DisplaySurface> TelemetryRenderer<D> {
    pub fn new(surface: D, window: PlotWindow) -> Self {
        Self { surface, window }
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    /// Give the surface back
    pub fn release(self) -> D {
        self.surface
    }

    /// Clear the panel and print up to [`MAX_MESSAGE_LINES`] lines from the top
    pub fn show_message(&mut self, lines: &[&str]) -> Result<(), DisplayError> {
        self.surface.clear(BinaryColor::Off)?;

        for (row, line) in lines.iter().take(MAX_MESSAGE_LINES).enumerate() {
            Text::with_baseline(
                line,
                Point::new(0, row as i32 * LINE_HEIGHT),
                text_style(),
                Baseline::Top,
            )
            .draw(&mut self.surface)?;
        }

        self.surface.commit()
    }

    fn width(&self) -> i32 {
        self.surface.bounding_box().size.width as i32
    }

    fn draw_readout(&mut self, reading: Option<Sample>) -> Result<(), DisplayError> {
        let band = Rectangle::new(
            Point::new(0, TEXT_BAND_TOP),
            Size::new(self.width() as u32, LINE_HEIGHT as u32),
        );
        self.surface.fill_solid(&band, BinaryColor::Off)?;

        let mut text: String<16> = String::new();
        let formatted = match reading {
            Some(sample) => write!(text, "Value: {}", sample.value()),
            None => text.write_str("Value: -"),
        };
        formatted.map_err(|_| DisplayError::OutOfBounds)?;

        Text::with_baseline(
            &text,
            Point::new(0, TEXT_BAND_TOP),
            text_style(),
            Baseline::Top,
        )
        .draw(&mut self.surface)?;
        Ok(())
    }

    fn draw_status(&mut self, connected: bool) -> Result<(), DisplayError> {
        let center = Point::new(self.width() - STATUS_RIGHT_INSET, STATUS_CENTER_Y);
        let style = if connected {
            PrimitiveStyle::with_fill(BinaryColor::On)
        } else {
            PrimitiveStyle::with_stroke(BinaryColor::On, 1)
        };

        Circle::with_center(center, STATUS_RADIUS * 2 + 1)
            .into_styled(style)
            .draw(&mut self.surface)
    }

    fn draw_segment(&mut self, segment: &GraphSegment) -> Result<(), DisplayError> {
        if segment.clear_plot {
            // Includes the bottom row, which a zero reading lands on
            let plot = Rectangle::new(
                Point::new(0, self.window.top),
                Size::new(self.window.width as u32, self.window.height as u32 + 1),
            );
            self.surface.fill_solid(&plot, BinaryColor::Off)?;
        }

        Line::new(
            Point::new(segment.from_x, segment.from_y),
            Point::new(segment.to_x, segment.to_y),
        )
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(&mut self.surface)
    }
}

impl<D: DisplaySurface> FrameRenderer for TelemetryRenderer<D> {
    fn render_frame(
        &mut self,
        reading: Option<Sample>,
        connected: bool,
        segment: Option<&GraphSegment>,
    ) -> Result<(), DisplayError> {
        self.draw_readout(reading)?;
        self.draw_status(connected)?;
        if let Some(segment) = segment {
            self.draw_segment(segment)?;
        }
        self.surface.commit()
    }
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_5X8, BinaryColor::On)
}
