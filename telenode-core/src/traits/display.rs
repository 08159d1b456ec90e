//! Frame rendering trait

use crate::graph::GraphSegment;
use crate::sample::Sample;

/// Errors that can occur while drawing or committing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed (NACK, arbitration loss, timeout)
    Communication,
    /// Controller did not accept the init sequence
    InitFailed,
    /// Drawing outside the surface or into a full buffer
    OutOfBounds,
}

/// Draws one telemetry frame
pub trait FrameRenderer {
    /// Redraw the status area and optionally extend the graph
    ///
    /// - `reading`: latest sample, or `None` for the placeholder readout
    /// - `connected`: at least one client is attached
    /// - `segment`: next graph segment, if this tick produced one
    ///
    /// Implementations commit to the panel exactly once per call.
    fn render_frame(
        &mut self,
        reading: Option<Sample>,
        connected: bool,
        segment: Option<&GraphSegment>,
    ) -> Result<(), DisplayError>;
}
