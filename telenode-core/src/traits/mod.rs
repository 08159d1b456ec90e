//! Collaborator traits
//!
//! The loop talks to the display and the network through these seams so
//! it can be driven by mocks on the host.

pub mod display;
pub mod sink;

pub use display::{DisplayError, FrameRenderer};
pub use sink::FrameSink;
