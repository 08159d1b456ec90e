//! WebSocket frame encoding and decoding (RFC 6455, server side)
//!
//! Frame format:
//! - BYTE 0: FIN flag (bit 7) and opcode (bits 0-3)
//! - BYTE 1: MASK flag (bit 7) and 7-bit payload length
//! - 0 or 2 bytes: extended 16-bit payload length (length byte = 126)
//! - 4 bytes: masking key (client frames only)
//! - PAYLOAD
//!
//! The node only ever sends short unmasked frames. Client data frames are
//! only logged, so anything past [`MAX_INBOUND_PAYLOAD`] bytes is read and
//! dropped; 64-bit lengths are rejected outright.

use heapless::Vec;

use crate::events::MAX_MESSAGE_LEN;

/// Largest server frame header (2 bytes + 16-bit extended length)
pub const MAX_FRAME_HEADER: usize = 4;

/// Largest client payload the decoder keeps
pub const MAX_INBOUND_PAYLOAD: usize = MAX_MESSAGE_LEN;

/// Largest payload allowed in a control frame
const MAX_CONTROL_PAYLOAD: u16 = 125;

const FIN_BIT: u8 = 0x80;
const MASK_BIT: u8 = 0x80;
const OPCODE_MASK: u8 = 0x0F;
const LEN_MASK: u8 = 0x7F;
const LEN_EXTENDED_16: u8 = 126;
const LEN_EXTENDED_64: u8 = 127;

/// Close status: normal closure
pub const CLOSE_NORMAL: u16 = 1000;
/// Close status: protocol error
pub const CLOSE_PROTOCOL_ERROR: u16 = 1002;
/// Close status: message too big
pub const CLOSE_TOO_BIG: u16 = 1009;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WsError {
    /// Payload exceeds what this side is willing to handle
    PayloadTooLarge,
    /// Client frame arrived without a mask
    Unmasked,
    /// Reserved or unknown opcode
    InvalidOpcode,
    /// Structurally invalid frame (fragmented or oversized control frame)
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl WsError {
    /// Close status code to send before dropping the session
    pub fn close_code(self) -> u16 {
        match self {
            WsError::PayloadTooLarge => CLOSE_TOO_BIG,
            _ => CLOSE_PROTOCOL_ERROR,
        }
    }
}

/// Frame opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    /// Parse an opcode from the low nibble of the first header byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Opcode::Continuation),
            0x1 => Some(Opcode::Text),
            0x2 => Some(Opcode::Binary),
            0x8 => Some(Opcode::Close),
            0x9 => Some(Opcode::Ping),
            0xA => Some(Opcode::Pong),
            _ => None,
        }
    }

    /// Wire value
    pub fn to_u8(self) -> u8 {
        match self {
            Opcode::Continuation => 0x0,
            Opcode::Text => 0x1,
            Opcode::Binary => 0x2,
            Opcode::Close => 0x8,
            Opcode::Ping => 0x9,
            Opcode::Pong => 0xA,
        }
    }

    /// Control frames (close, ping, pong) may not be fragmented
    pub fn is_control(self) -> bool {
        matches!(self, Opcode::Close | Opcode::Ping | Opcode::Pong)
    }

}

/// A decoded client frame with its payload already unmasked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsFrame {
    pub opcode: Opcode,
    pub fin: bool,
    pub payload: Vec<u8, MAX_INBOUND_PAYLOAD>,
}

/// Encode an unmasked server frame into `buffer`
///
/// Returns the number of bytes written.
pub fn encode_frame(opcode: Opcode, payload: &[u8], buffer: &mut [u8]) -> Result<usize, WsError> {
    let len = payload.len();
    let header_len = if len < LEN_EXTENDED_16 as usize {
        2
    } else if len <= u16::MAX as usize {
        4
    } else {
        return Err(WsError::PayloadTooLarge);
    };

    if buffer.len() < header_len + len {
        return Err(WsError::BufferTooSmall);
    }

    buffer[0] = FIN_BIT | opcode.to_u8();
    if header_len == 2 {
        buffer[1] = len as u8;
    } else {
        buffer[1] = LEN_EXTENDED_16;
        buffer[2..4].copy_from_slice(&(len as u16).to_be_bytes());
    }
    buffer[header_len..header_len + len].copy_from_slice(payload);

    Ok(header_len + len)
}

/// Encode a text frame
pub fn encode_text(text: &str, buffer: &mut [u8]) -> Result<usize, WsError> {
    encode_frame(Opcode::Text, text.as_bytes(), buffer)
}

/// Encode a close frame carrying a status code
pub fn encode_close(code: u16, buffer: &mut [u8]) -> Result<usize, WsError> {
    encode_frame(Opcode::Close, &code.to_be_bytes(), buffer)
}

/// State machine for decoding client frames
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: ParseState,
    opcode: Opcode,
    fin: bool,
    length: u16,
    /// Payload bytes consumed so far, kept or not
    received: u16,
    mask: [u8; 4],
    /// Index into the extended length or mask currently being read
    cursor: u8,
    payload: Vec<u8, MAX_INBOUND_PAYLOAD>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for FIN/opcode byte
    WaitingForHeader,
    /// Got opcode, waiting for MASK/length byte
    WaitingForLength,
    /// Reading the two-byte extended length
    ReadingExtendedLength,
    /// Reading the four-byte masking key
    ReadingMask,
    /// Reading (and unmasking) payload bytes
    ReadingPayload,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForHeader,
            opcode: Opcode::Continuation,
            fin: false,
            length: 0,
            received: 0,
            mask: [0; 4],
            cursor: 0,
            payload: Vec::new(),
        }
    }

    /// Reset the decoder state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.opcode = Opcode::Continuation;
        self.fin = false;
        self.length = 0;
        self.received = 0;
        self.mask = [0; 4];
        self.cursor = 0;
        self.payload.clear();
    }

    /// Feed a single byte to the decoder
    ///
    /// Returns `Ok(Some(frame))` when a complete frame is decoded,
    /// `Ok(None)` when more bytes are needed, or `Err` on a protocol
    /// violation. After an error the session should be closed; the decoder
    /// itself is reset and ready for reuse.
    pub fn feed(&mut self, byte: u8) -> Result<Option<WsFrame>, WsError> {
        match self.state {
            ParseState::WaitingForHeader => {
                let Some(opcode) = Opcode::from_u8(byte & OPCODE_MASK) else {
                    self.reset();
                    return Err(WsError::InvalidOpcode);
                };
                self.opcode = opcode;
                self.fin = byte & FIN_BIT != 0;
                if opcode.is_control() && !self.fin {
                    self.reset();
                    return Err(WsError::InvalidFrame);
                }
                self.state = ParseState::WaitingForLength;
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if byte & MASK_BIT == 0 {
                    self.reset();
                    return Err(WsError::Unmasked);
                }
                match byte & LEN_MASK {
                    LEN_EXTENDED_64 => {
                        self.reset();
                        Err(WsError::PayloadTooLarge)
                    }
                    LEN_EXTENDED_16 => {
                        self.length = 0;
                        self.cursor = 0;
                        self.state = ParseState::ReadingExtendedLength;
                        Ok(None)
                    }
                    len => self.begin_mask(len as u16),
                }
            }
            ParseState::ReadingExtendedLength => {
                self.length = (self.length << 8) | byte as u16;
                self.cursor += 1;
                if self.cursor == 2 {
                    self.begin_mask(self.length)
                } else {
                    Ok(None)
                }
            }
            ParseState::ReadingMask => {
                self.mask[self.cursor as usize] = byte;
                self.cursor += 1;
                if self.cursor < 4 {
                    return Ok(None);
                }
                if self.length == 0 {
                    return Ok(Some(self.finish()));
                }
                self.payload.clear();
                self.received = 0;
                self.state = ParseState::ReadingPayload;
                Ok(None)
            }
            ParseState::ReadingPayload => {
                let unmasked = byte ^ self.mask[self.received as usize % 4];
                self.received += 1;
                // Full once past MAX_INBOUND_PAYLOAD; the tail is dropped
                let _ = self.payload.push(unmasked);
                if self.received == self.length {
                    Ok(Some(self.finish()))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Validate the payload length and start reading the mask
    ///
    /// Data frames of any 16-bit length are accepted; only the first
    /// [`MAX_INBOUND_PAYLOAD`] bytes reach the decoded frame.
    fn begin_mask(&mut self, length: u16) -> Result<Option<WsFrame>, WsError> {
        if self.opcode.is_control() && length > MAX_CONTROL_PAYLOAD {
            self.reset();
            return Err(WsError::InvalidFrame);
        }
        self.length = length;
        self.cursor = 0;
        self.state = ParseState::ReadingMask;
        Ok(None)
    }

    fn finish(&mut self) -> WsFrame {
        let frame = WsFrame {
            opcode: self.opcode,
            fin: self.fin,
            payload: self.payload.clone(),
        };
        self.reset();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> Result<Option<WsFrame>, WsError> {
        for &byte in bytes {
            if let Some(frame) = decoder.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    #[test]
    fn test_encode_short_text() {
        let mut buffer = [0u8; 32];
        let len = encode_text("Hello", &mut buffer).unwrap();
        assert_eq!(&buffer[..len], &[0x81, 0x05, b'H', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_encode_extended_length() {
        let payload = [b'a'; 200];
        let mut buffer = [0u8; 256];
        let len = encode_frame(Opcode::Binary, &payload, &mut buffer).unwrap();

        assert_eq!(len, 204);
        assert_eq!(buffer[0], 0x82);
        assert_eq!(buffer[1], 126);
        assert_eq!(&buffer[2..4], &200u16.to_be_bytes());
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buffer = [0u8; 4];
        assert_eq!(encode_text("Hello", &mut buffer), Err(WsError::BufferTooSmall));
    }

    #[test]
    fn test_encode_close_carries_code() {
        let mut buffer = [0u8; 8];
        let len = encode_close(CLOSE_NORMAL, &mut buffer).unwrap();
        assert_eq!(&buffer[..len], &[0x88, 0x02, 0x03, 0xE8]);
    }

    #[test]
    fn test_decode_masked_hello() {
        // Masked "Hello" from RFC 6455 section 5.7
        let bytes = [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58];
        let mut decoder = FrameDecoder::new();
        let frame = decode_all(&mut decoder, &bytes).unwrap().unwrap();

        assert_eq!(frame.opcode, Opcode::Text);
        assert!(frame.fin);
        assert_eq!(frame.payload.as_slice(), b"Hello");
    }

    #[test]
    fn test_decode_consecutive_frames() {
        // Masked ping with empty payload followed by the masked "Hello"
        let bytes = [
            0x89, 0x80, 0x01, 0x02, 0x03, 0x04, 0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f,
            0x4d, 0x51, 0x58,
        ];
        let mut decoder = FrameDecoder::new();

        let ping = decode_all(&mut decoder, &bytes[..6]).unwrap().unwrap();
        assert_eq!(ping.opcode, Opcode::Ping);
        assert!(ping.payload.is_empty());

        let text = decode_all(&mut decoder, &bytes[6..]).unwrap().unwrap();
        assert_eq!(text.payload.as_slice(), b"Hello");
    }

    #[test]
    fn test_decode_extended_length() {
        let mask = [0xAA, 0x55, 0x0F, 0xF0];
        let mut bytes = heapless::Vec::<u8, 140>::new();
        bytes.extend_from_slice(&[0x82, 0x80 | 126, 0x00, 126]).unwrap();
        bytes.extend_from_slice(&mask).unwrap();
        for i in 0..126u8 {
            bytes.push(i ^ mask[i as usize % 4]).unwrap();
        }

        let mut decoder = FrameDecoder::new();
        let frame = decode_all(&mut decoder, &bytes).unwrap().unwrap();
        assert_eq!(frame.opcode, Opcode::Binary);
        assert_eq!(frame.payload.len(), 126);
        assert_eq!(frame.payload[125], 125);
    }

    #[test]
    fn test_unmasked_client_frame_rejected() {
        let bytes = [0x81, 0x05, b'H', b'e', b'l', b'l', b'o'];
        let mut decoder = FrameDecoder::new();
        assert_eq!(decode_all(&mut decoder, &bytes), Err(WsError::Unmasked));
    }

    #[test]
    fn test_long_text_truncated_not_rejected() {
        let mask = [0x12, 0x34, 0x56, 0x78];
        let mut bytes = heapless::Vec::<u8, 220>::new();
        bytes.extend_from_slice(&[0x81, 0x80 | 126, 0x00, 200]).unwrap();
        bytes.extend_from_slice(&mask).unwrap();
        for i in 0..200usize {
            bytes.push(b'a' + (i % 26) as u8 ^ mask[i % 4]).unwrap();
        }

        let mut decoder = FrameDecoder::new();
        let frame = decode_all(&mut decoder, &bytes).unwrap().unwrap();
        assert_eq!(frame.opcode, Opcode::Text);
        assert_eq!(frame.payload.len(), MAX_INBOUND_PAYLOAD);
        assert_eq!(frame.payload[0], b'a');
        assert_eq!(frame.payload[127], b'a' + (127 % 26) as u8);

        // The dropped tail must not leak into the next frame
        let hello = [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58];
        let next = decode_all(&mut decoder, &hello).unwrap().unwrap();
        assert_eq!(next.payload.as_slice(), b"Hello");
    }

    #[test]
    fn test_oversized_control_rejected() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(
            decode_all(&mut decoder, &[0x89, 0x80 | 126, 0x00, 126]),
            Err(WsError::InvalidFrame)
        );
    }

    #[test]
    fn test_close_codes() {
        assert_eq!(WsError::PayloadTooLarge.close_code(), CLOSE_TOO_BIG);
        assert_eq!(WsError::Unmasked.close_code(), CLOSE_PROTOCOL_ERROR);
    }

    #[test]
    fn test_64bit_length_rejected() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decode_all(&mut decoder, &[0x82, 0xFF]), Err(WsError::PayloadTooLarge));
    }

    #[test]
    fn test_fragmented_control_rejected() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed(0x09), Err(WsError::InvalidFrame));
    }

    #[test]
    fn test_reserved_opcode_rejected() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed(0x83), Err(WsError::InvalidOpcode));
    }

    #[test]
    fn test_decoder_recovers_after_error() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(0x83).is_err());

        let bytes = [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58];
        let frame = decode_all(&mut decoder, &bytes).unwrap().unwrap();
        assert_eq!(frame.payload.as_slice(), b"Hello");
    }
}
