//! Inter-task communication channels
//!
//! The main loop is the only owner of node state. Listener tasks reach it
//! through these static queues.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::pubsub::{ImmediatePublisher, PubSubChannel, Subscriber};

use telenode_core::traits::FrameSink;
use telenode_core::MAX_CLIENTS;
use telenode_protocol::{BroadcastFrame, ClientEvent};

/// Channel capacity for client events
const CLIENT_EVENT_DEPTH: usize = 8;

/// Frames buffered per subscriber before it starts missing them
const FRAME_QUEUE_DEPTH: usize = 4;

/// Connect/disconnect/message events from the listener slots
pub static CLIENT_EVENTS: Channel<CriticalSectionRawMutex, ClientEvent, CLIENT_EVENT_DEPTH> =
    Channel::new();

/// Broadcast frames from the main loop, one subscriber per open session
pub static FRAMES: PubSubChannel<
    CriticalSectionRawMutex,
    BroadcastFrame,
    FRAME_QUEUE_DEPTH,
    MAX_CLIENTS,
    0,
> = PubSubChannel::new();

/// Session-side handle on [`FRAMES`]
pub type FrameSubscriber = Subscriber<
    'static,
    CriticalSectionRawMutex,
    BroadcastFrame,
    FRAME_QUEUE_DEPTH,
    MAX_CLIENTS,
    0,
>;

/// Loop-side handle on [`FRAMES`]
pub struct FramePublisher {
    publisher: ImmediatePublisher<
        'static,
        CriticalSectionRawMutex,
        BroadcastFrame,
        FRAME_QUEUE_DEPTH,
        MAX_CLIENTS,
        0,
    >,
}

impl FramePublisher {
    pub fn new() -> Self {
        Self {
            publisher: FRAMES.immediate_publisher(),
        }
    }
}

impl FrameSink for FramePublisher {
    fn publish(&mut self, frame: &BroadcastFrame) {
        // Lagging subscribers drop their oldest frame instead of blocking
        self.publisher.publish_immediate(frame.clone());
    }
}
