//! Client session events
//!
//! Listener slots report what happens on their connection; the main loop
//! drains these and applies them to its client set.

use heapless::Vec;

/// Listener slot index, stable for the life of a connection
pub type ClientId = u8;

/// Longest inbound message payload kept for logging
pub const MAX_MESSAGE_LEN: usize = 128;

/// Event raised by a listener slot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientEvent {
    /// Handshake completed, the client now receives broadcasts
    Connected(ClientId),
    /// Session ended (close frame, socket error, or protocol violation)
    Disconnected(ClientId),
    /// Client sent a data frame
    Message {
        client: ClientId,
        payload: Vec<u8, MAX_MESSAGE_LEN>,
    },
}

impl ClientEvent {
    /// Build a message event, keeping at most [`MAX_MESSAGE_LEN`] bytes
    pub fn message(client: ClientId, bytes: &[u8]) -> Self {
        let keep = bytes.len().min(MAX_MESSAGE_LEN);
        let mut payload = Vec::new();
        // Cannot fail: `keep` is within capacity
        let _ = payload.extend_from_slice(&bytes[..keep]);
        ClientEvent::Message { client, payload }
    }

    /// The slot this event came from
    pub fn client(&self) -> ClientId {
        match self {
            ClientEvent::Connected(id) | ClientEvent::Disconnected(id) => *id,
            ClientEvent::Message { client, .. } => *client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_accessor() {
        assert_eq!(ClientEvent::Connected(2).client(), 2);
        assert_eq!(ClientEvent::Disconnected(3).client(), 3);
        assert_eq!(ClientEvent::message(1, b"hi").client(), 1);
    }

    #[test]
    fn test_message_truncates_long_payload() {
        let long = [b'x'; MAX_MESSAGE_LEN + 40];
        match ClientEvent::message(0, &long) {
            ClientEvent::Message { payload, .. } => assert_eq!(payload.len(), MAX_MESSAGE_LEN),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
