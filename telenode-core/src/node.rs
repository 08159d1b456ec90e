//! Steady-state loop logic
//!
//! [`TelemetryNode`] owns the button, indicator, sensor, and all loop
//! state. The firmware drives it from a single task: it feeds lifecycle
//! events, forwards client events from the listener tasks, and calls
//! [`TelemetryNode::tick`] once per update interval while running.
//!
//! One tick:
//! 1. Poll the debounced button; a press flips reporting and the indicator
//! 2. Take one sample
//! 3. If reporting and the sample is good: advance the graph, render, and
//!    broadcast the value
//! 4. Otherwise broadcast the no-data sentinel only

use telenode_hal::{AdcError, AnalogInput, InputPin, OutputPin};
use telenode_protocol::ClientEvent;

use crate::broadcast::{BroadcastChannel, ClientNotice, MAX_CLIENTS};
use crate::config::NodeConfig;
use crate::debounce::DebouncedToggle;
use crate::graph::{GraphSegment, ScrollingGraphBuffer};
use crate::sample::Sample;
use crate::state::{Event, NodeState};
use crate::traits::{DisplayError, FrameRenderer, FrameSink};

/// Outcome of one tick, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// New reporting mode if the button toggled it this tick
    pub toggled: Option<bool>,
    /// Reporting mode after this tick
    pub reporting: bool,
    /// Reading that was rendered and broadcast (`None` = sentinel)
    pub reading: Option<Sample>,
    /// Graph segment drawn this tick
    pub segment: Option<GraphSegment>,
    /// Clients the frame was handed to
    pub recipients: usize,
    /// Sensor failure; the tick fell back to the sentinel
    pub sample_error: Option<AdcError>,
    /// Render or commit failure; the broadcast still happened
    pub render_error: Option<DisplayError>,
}

/// Telemetry node
pub struct TelemetryNode<B, L, A, const N: usize = MAX_CLIENTS> {
    button: B,
    indicator: L,
    sensor: A,
    toggle: DebouncedToggle,
    graph: ScrollingGraphBuffer,
    clients: BroadcastChannel<N>,
    state: NodeState,
}

impl<B, L, A, const N: usize> TelemetryNode<B, L, A, N>
where
    B: InputPin,
    L: OutputPin,
    A: AnalogInput,
{
    /// Create a node in `Booting` with reporting off and the indicator LOW
    pub fn new(button: B, mut indicator: L, sensor: A, config: &NodeConfig) -> Self {
        indicator.set_low();

        Self {
            button,
            indicator,
            sensor,
            toggle: DebouncedToggle::new(config.timing.debounce_ms),
            graph: ScrollingGraphBuffer::new(config.graph.window()),
            clients: BroadcastChannel::new(),
            state: NodeState::Booting,
        }
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Apply a lifecycle event and return the new state
    pub fn handle(&mut self, event: Event) -> NodeState {
        self.state = self.state.transition(event);
        self.state
    }

    pub fn reporting(&self) -> bool {
        self.toggle.reporting()
    }

    pub fn clients(&self) -> &BroadcastChannel<N> {
        &self.clients
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    /// Apply one event from a listener task
    pub fn handle_client_event<'a>(&mut self, event: &'a ClientEvent) -> ClientNotice<'a> {
        self.clients.handle_event(event)
    }

    /// Draw the readout with no value and the current connection glyph
    pub fn render_placeholder<R: FrameRenderer>(
        &mut self,
        renderer: &mut R,
    ) -> Result<(), DisplayError> {
        renderer.render_frame(None, self.clients.is_connected(), None)
    }

    /// Run one loop iteration
    ///
    /// Does nothing outside `Running`.
    pub fn tick<R: FrameRenderer, S: FrameSink>(
        &mut self,
        now_ms: u32,
        renderer: &mut R,
        sink: &mut S,
    ) -> TickReport {
        let mut report = TickReport::default();
        if !self.state.sampling_allowed() {
            report.reporting = self.toggle.reporting();
            return report;
        }

        let before = self.toggle.reporting();
        let raw_high = self.button.is_high();
        let reporting = self.toggle.poll(raw_high, now_ms, &mut self.indicator);
        report.reporting = reporting;
        if reporting != before {
            report.toggled = Some(reporting);
        }

        let sample = match self.sensor.read() {
            Ok(raw) => Some(Sample::new(raw)),
            Err(err) => {
                report.sample_error = Some(err);
                None
            }
        };

        let reading = match (reporting, sample) {
            (true, Some(sample)) => {
                let segment = self.graph.advance(sample);
                report.segment = Some(segment);
                report.render_error = renderer
                    .render_frame(Some(sample), self.clients.is_connected(), Some(&segment))
                    .err();
                Some(sample)
            }
            _ => None,
        };

        report.reading = reading;
        report.recipients = self.clients.broadcast(reading, sink);
        report
    }
}
