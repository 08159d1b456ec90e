//! Board-agnostic core logic for the telemetry node
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Push-button debouncing and the reporting-mode toggle
//! - Scrolling graph cursor and sample-to-pixel mapping
//! - Connected-client tracking and per-tick broadcast
//! - Node lifecycle state machine
//! - The steady-state loop tick that ties them together
//! - Configuration types and the `node.toml` parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod broadcast;
pub mod config;
pub mod debounce;
pub mod graph;
pub mod node;
pub mod sample;
pub mod state;
pub mod traits;

pub use broadcast::{BroadcastChannel, ClientNotice, InboundMessage, MAX_CLIENTS};
pub use debounce::DebouncedToggle;
pub use graph::{GraphCursor, GraphSegment, PlotWindow, ScrollingGraphBuffer};
pub use node::{TelemetryNode, TickReport};
pub use sample::{Sample, SENSOR_MAX};
