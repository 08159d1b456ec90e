//! Telemetry broadcast frames
//!
//! Wire format is a UTF-8 text payload of the literal form
//! `{"value":"<N>"}` for a reading, or `{"value":"-"}` while the node is
//! not reporting. Deployed clients match this shape byte for byte, so the
//! reading is always quoted and never padded.

use core::fmt::Write;

use heapless::String;

/// Placeholder sent in place of a reading
pub const NO_DATA: &str = "-";

/// Capacity of an encoded frame
///
/// The longest payload is `{"value":"65535"}` (17 bytes).
pub const MAX_BROADCAST_LEN: usize = 24;

/// One encoded telemetry payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastFrame {
    text: String<MAX_BROADCAST_LEN>,
}

impl BroadcastFrame {
    /// Encode a reading, or the placeholder when `reading` is `None`
    pub fn encode(reading: Option<u16>) -> Self {
        let mut text = String::new();
        // Cannot overflow: capacity covers the widest u16
        let _ = match reading {
            Some(value) => write!(text, "{{\"value\":\"{}\"}}", value),
            None => write!(text, "{{\"value\":\"{}\"}}", NO_DATA),
        };
        Self { text }
    }

    /// Frame carrying a reading
    pub fn reading(value: u16) -> Self {
        Self::encode(Some(value))
    }

    /// Frame carrying the no-data placeholder
    pub fn no_data() -> Self {
        Self::encode(None)
    }

    /// Payload as text
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Payload as bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// True if this frame carries the placeholder instead of a reading
    pub fn is_no_data(&self) -> bool {
        self.text.as_str() == "{\"value\":\"-\"}"
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BroadcastFrame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.text.as_str());
    }
}
