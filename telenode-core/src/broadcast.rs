//! Connected-client tracking and broadcast fan-out

use heapless::Vec;
use telenode_protocol::{BroadcastFrame, ClientEvent, ClientId};

use crate::sample::Sample;
use crate::traits::FrameSink;

/// Default number of simultaneous WebSocket clients
pub const MAX_CLIENTS: usize = 4;

/// Classified inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMessage<'a> {
    /// Valid UTF-8 payload
    Text(&'a str),
    /// Anything else, by length
    Binary(usize),
}

impl<'a> InboundMessage<'a> {
    pub fn classify(payload: &'a [u8]) -> Self {
        match core::str::from_utf8(payload) {
            Ok(text) => InboundMessage::Text(text),
            Err(_) => InboundMessage::Binary(payload.len()),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InboundMessage<'_> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            InboundMessage::Text(text) => defmt::write!(f, "text: {=str}", text),
            InboundMessage::Binary(len) => defmt::write!(f, "binary: {} bytes", len),
        }
    }
}

/// What a client event did to the channel, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientNotice<'a> {
    /// Client joined; `clients` is the new total
    Connected { client: ClientId, clients: usize },
    /// Client left; `clients` is the new total
    Disconnected { client: ClientId, clients: usize },
    /// Client sent something (never answered)
    Message {
        client: ClientId,
        message: InboundMessage<'a>,
    },
    /// Duplicate connect, unknown disconnect, or no free slot
    Ignored(ClientId),
}

/// Set of connected clients
#[derive(Debug, Clone, Default)]
pub struct BroadcastChannel<const N: usize = MAX_CLIENTS> {
    clients: Vec<ClientId, N>,
}

impl<const N: usize> BroadcastChannel<N> {
    pub fn new() -> Self {
        Self { clients: Vec::new() }
    }

    /// Record a new client
    ///
    /// Returns `false` if the id was already present or the set is full.
    pub fn on_client_connect(&mut self, client: ClientId) -> bool {
        if self.clients.contains(&client) {
            return false;
        }
        self.clients.push(client).is_ok()
    }

    /// Forget a client
    ///
    /// Returns `false` if the id was not connected.
    pub fn on_client_disconnect(&mut self, client: ClientId) -> bool {
        match self.clients.iter().position(|&id| id == client) {
            Some(index) => {
                self.clients.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Classify an inbound message; nothing is sent back
    pub fn on_client_message<'a>(
        &self,
        client: ClientId,
        payload: &'a [u8],
    ) -> ClientNotice<'a> {
        ClientNotice::Message {
            client,
            message: InboundMessage::classify(payload),
        }
    }

    /// Apply one event from a listener task
    pub fn handle_event<'a>(&mut self, event: &'a ClientEvent) -> ClientNotice<'a> {
        match event {
            ClientEvent::Connected(client) => {
                if self.on_client_connect(*client) {
                    ClientNotice::Connected {
                        client: *client,
                        clients: self.clients.len(),
                    }
                } else {
                    ClientNotice::Ignored(*client)
                }
            }
            ClientEvent::Disconnected(client) => {
                if self.on_client_disconnect(*client) {
                    ClientNotice::Disconnected {
                        client: *client,
                        clients: self.clients.len(),
                    }
                } else {
                    ClientNotice::Ignored(*client)
                }
            }
            ClientEvent::Message { client, payload } => self.on_client_message(*client, payload),
        }
    }

    /// At least one client is attached
    pub fn is_connected(&self) -> bool {
        !self.clients.is_empty()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn contains(&self, client: ClientId) -> bool {
        self.clients.contains(&client)
    }

    /// Publish the reading (or the no-data sentinel) to every client
    ///
    /// Returns the number of clients the frame was handed to. Nothing is
    /// published while no client is attached.
    pub fn broadcast<S: FrameSink>(&self, reading: Option<Sample>, sink: &mut S) -> usize {
        if self.clients.is_empty() {
            return 0;
        }

        let frame = BroadcastFrame::encode(reading.map(Sample::value));
        sink.publish(&frame);
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        frames: std::vec::Vec<std::string::String>,
    }

    impl FrameSink for RecordingSink {
        fn publish(&mut self, frame: &BroadcastFrame) {
            self.frames.push(frame.as_str().into());
        }
    }

    #[test]
    fn test_zero_clients_publishes_nothing() {
        let channel: BroadcastChannel = BroadcastChannel::new();
        let mut sink = RecordingSink::default();

        assert_eq!(channel.broadcast(Some(Sample::new(100)), &mut sink), 0);
        assert_eq!(channel.broadcast(None, &mut sink), 0);
        assert!(sink.frames.is_empty());
        assert!(!channel.is_connected());
    }

    #[test]
    fn test_broadcast_frames() {
        let mut channel: BroadcastChannel = BroadcastChannel::new();
        let mut sink = RecordingSink::default();
        channel.on_client_connect(0);
        channel.on_client_connect(2);

        assert_eq!(channel.broadcast(Some(Sample::new(1234)), &mut sink), 2);
        assert_eq!(channel.broadcast(None, &mut sink), 2);
        assert_eq!(sink.frames, ["{\"value\":\"1234\"}", "{\"value\":\"-\"}"]);
    }

    #[test]
    fn test_one_disconnect_keeps_others() {
        let mut channel: BroadcastChannel = BroadcastChannel::new();
        channel.on_client_connect(0);
        channel.on_client_connect(1);

        assert!(channel.on_client_disconnect(0));
        assert!(channel.is_connected());
        assert!(channel.contains(1));

        assert!(channel.on_client_disconnect(1));
        assert!(!channel.is_connected());
    }

    #[test]
    fn test_duplicate_and_unknown_events_ignored() {
        let mut channel: BroadcastChannel = BroadcastChannel::new();

        assert_eq!(
            channel.handle_event(&ClientEvent::Connected(3)),
            ClientNotice::Connected {
                client: 3,
                clients: 1
            }
        );
        assert_eq!(
            channel.handle_event(&ClientEvent::Connected(3)),
            ClientNotice::Ignored(3)
        );
        assert_eq!(
            channel.handle_event(&ClientEvent::Disconnected(7)),
            ClientNotice::Ignored(7)
        );
        assert_eq!(channel.client_count(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        let mut channel: BroadcastChannel<2> = BroadcastChannel::new();
        assert!(channel.on_client_connect(0));
        assert!(channel.on_client_connect(1));
        assert!(!channel.on_client_connect(2));
        assert_eq!(channel.client_count(), 2);
    }

    #[test]
    fn test_messages_are_classified() {
        let mut channel: BroadcastChannel = BroadcastChannel::new();

        let text = ClientEvent::message(1, b"hello");
        assert_eq!(
            channel.handle_event(&text),
            ClientNotice::Message {
                client: 1,
                message: InboundMessage::Text("hello"),
            }
        );

        let binary = ClientEvent::message(1, &[0xff, 0xfe, 0x00]);
        assert_eq!(
            channel.handle_event(&binary),
            ClientNotice::Message {
                client: 1,
                message: InboundMessage::Binary(3),
            }
        );
        assert_eq!(channel.client_count(), 0);
    }
}
