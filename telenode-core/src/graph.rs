//! Scrolling graph cursor
//!
//! The graph occupies a horizontal band of the display. Each new sample
//! becomes one line segment from the previous point to the next column.
//! When the cursor reaches the right edge it wraps to column 0 and the
//! next segment carries a request to clear the band first.
//!
//! Coordinates are display pixels with y growing downward, so larger
//! readings produce smaller y values.

use crate::sample::{Sample, SENSOR_MAX};

/// Default first row of the plot band
pub const DEFAULT_PLOT_TOP: i32 = 20;

/// Default height of the plot band in rows
pub const DEFAULT_PLOT_HEIGHT: i32 = 40;

/// Default plot width (full display width)
pub const DEFAULT_PLOT_WIDTH: i32 = 128;

/// Plot band geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlotWindow {
    /// First row (maps [`SENSOR_MAX`])
    pub top: i32,
    /// Height in rows; row `top + height` maps a zero reading
    pub height: i32,
    /// Number of columns
    pub width: i32,
}

impl PlotWindow {
    /// Row that a zero reading maps to
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Vertical midpoint, used as the starting point of a fresh graph
    pub fn mid(&self) -> i32 {
        self.top + self.height / 2
    }

    /// Map a reading to a row in `top..=bottom`
    pub fn map(&self, reading: Sample) -> i32 {
        let scaled = i32::from(reading.value()) * self.height / i32::from(SENSOR_MAX);
        self.bottom() - scaled
    }
}

impl Default for PlotWindow {
    fn default() -> Self {
        Self {
            top: DEFAULT_PLOT_TOP,
            height: DEFAULT_PLOT_HEIGHT,
            width: DEFAULT_PLOT_WIDTH,
        }
    }
}

/// One line segment to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GraphSegment {
    pub from_x: i32,
    pub from_y: i32,
    pub to_x: i32,
    pub to_y: i32,
    /// Blank the plot band before drawing this segment
    pub clear_plot: bool,
}

/// Cursor position after the last segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GraphCursor {
    pub x: i32,
    pub last_y: i32,
}

/// Scrolling graph state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollingGraphBuffer {
    window: PlotWindow,
    x: i32,
    last_y: i32,
    pending_clear: bool,
}

impl ScrollingGraphBuffer {
    /// Start at column 0 with the pen at the band midpoint
    pub fn new(window: PlotWindow) -> Self {
        Self {
            window,
            x: 0,
            last_y: window.mid(),
            pending_clear: false,
        }
    }

    /// Plot band geometry
    pub fn window(&self) -> PlotWindow {
        self.window
    }

    /// Current cursor
    pub fn cursor(&self) -> GraphCursor {
        GraphCursor {
            x: self.x,
            last_y: self.last_y,
        }
    }

    /// Advance by one sample and return the segment to draw
    pub fn advance(&mut self, reading: Sample) -> GraphSegment {
        let y = self.window.map(reading);
        let segment = GraphSegment {
            from_x: self.x,
            from_y: self.last_y,
            to_x: self.x + 1,
            to_y: y,
            clear_plot: self.pending_clear,
        };

        self.pending_clear = false;
        self.last_y = y;
        self.x += 1;

        if self.x >= self.window.width {
            self.x = 0;
            self.pending_clear = true;
        }

        segment
    }
}

impl Default for ScrollingGraphBuffer {
    fn default() -> Self {
        Self::new(PlotWindow::default())
    }
}
