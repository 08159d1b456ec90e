//! Outbound frame sink

use telenode_protocol::BroadcastFrame;

/// Fan-out point for broadcast frames
///
/// Publishing is fire-and-forget: a sink never reports delivery, and a
/// slow subscriber loses frames instead of stalling the caller.
pub trait FrameSink {
    fn publish(&mut self, frame: &BroadcastFrame);
}
