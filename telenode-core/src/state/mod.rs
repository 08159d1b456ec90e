//! Node lifecycle state machine
//!
//! The node boots, joins the network, then runs the sampling loop until
//! power-off. The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{FaultKind, NodeState};
