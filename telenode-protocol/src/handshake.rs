//! WebSocket opening handshake (server side)
//!
//! The listener buffers the client's HTTP request until the blank line,
//! checks it is a WebSocket upgrade, and answers with the derived
//! `Sec-WebSocket-Accept` key. Paths, subprotocols, and extensions are
//! ignored: every upgrade gets the same telemetry stream.

use core::fmt::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use heapless::String;
use sha1::{Digest, Sha1};

/// GUID appended to the client key (RFC 6455 section 1.3)
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Largest request head accepted before giving up
pub const MAX_REQUEST_LEN: usize = 1024;

/// Length of a base64-encoded SHA-1 digest
pub const ACCEPT_KEY_LEN: usize = 28;

/// Response for anything that is not a usable upgrade request
pub const BAD_REQUEST_RESPONSE: &[u8] =
    b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\nContent-Length: 0\r\n\r\n";

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Handshake errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeError {
    /// Request head exceeded [`MAX_REQUEST_LEN`] without terminating
    RequestTooLarge,
    /// Not valid UTF-8, or the request line is not `GET ... HTTP/1.1`
    MalformedRequest,
    /// Plain HTTP request without `Upgrade: websocket`
    NotWebSocket,
    /// Upgrade request without a `Sec-WebSocket-Key`
    MissingKey,
    /// Response does not fit the output buffer
    BufferTooSmall,
}

/// A parsed upgrade request, borrowing from the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeRequest<'a> {
    /// Request target, e.g. `/`
    pub path: &'a str,
    /// Client nonce from `Sec-WebSocket-Key`
    pub key: &'a str,
}

/// Parse an upgrade request from the bytes received so far
///
/// Returns `Ok(None)` while the header terminator has not arrived yet.
pub fn parse_upgrade(request: &[u8]) -> Result<Option<UpgradeRequest<'_>>, HandshakeError> {
    let Some(end) = request
        .windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
    else {
        if request.len() >= MAX_REQUEST_LEN {
            return Err(HandshakeError::RequestTooLarge);
        }
        return Ok(None);
    };

    let head =
        core::str::from_utf8(&request[..end]).map_err(|_| HandshakeError::MalformedRequest)?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().ok_or(HandshakeError::MalformedRequest)?;
    let mut parts = request_line.split(' ');
    let (Some("GET"), Some(path), Some("HTTP/1.1")) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(HandshakeError::MalformedRequest);
    };

    let mut upgrade = false;
    let mut key = None;

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("upgrade") {
            upgrade = value.eq_ignore_ascii_case("websocket");
        } else if name.eq_ignore_ascii_case("sec-websocket-key") && !value.is_empty() {
            key = Some(value);
        }
    }

    if !upgrade {
        return Err(HandshakeError::NotWebSocket);
    }
    let key = key.ok_or(HandshakeError::MissingKey)?;

    Ok(Some(UpgradeRequest { path, key }))
}

/// Derive `Sec-WebSocket-Accept` from the client key
pub fn accept_key(key: &str) -> String<ACCEPT_KEY_LEN> {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    let digest = hasher.finalize();

    let mut encoded = [0u8; ACCEPT_KEY_LEN];
    let mut accept = String::new();
    // 20 digest bytes always encode to exactly 28 base64 characters
    if let Ok(len) = STANDARD.encode_slice(digest, &mut encoded) {
        for &byte in &encoded[..len] {
            let _ = accept.push(byte as char);
        }
    }
    accept
}

/// Write the `101 Switching Protocols` response into `buffer`
///
/// Returns the number of bytes written.
pub fn write_accept_response(key: &str, buffer: &mut [u8]) -> Result<usize, HandshakeError> {
    let mut response: String<160> = String::new();
    write!(
        response,
        "HTTP/1.1 101 Switching Protocols\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Accept: {}\r\n\r\n",
        accept_key(key)
    )
    .map_err(|_| HandshakeError::BufferTooSmall)?;

    let bytes = response.as_bytes();
    if buffer.len() < bytes.len() {
        return Err(HandshakeError::BufferTooSmall);
    }
    buffer[..bytes.len()].copy_from_slice(bytes);
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REQUEST: &[u8] = b"GET /chat HTTP/1.1\r\n\
        Host: server.example.com\r\n\
        Upgrade: websocket\r\n\
        Connection: Upgrade\r\n\
        Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
        Sec-WebSocket-Version: 13\r\n\r\n";

    #[test]
    fn test_accept_key_rfc_example() {
        assert_eq!(
            accept_key("dGhlIHNhbXBsZSBub25jZQ==").as_str(),
            "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
        );
    }

    #[test]
    fn test_parse_complete_request() {
        let request = parse_upgrade(SAMPLE_REQUEST).unwrap().unwrap();
        assert_eq!(request.path, "/chat");
        assert_eq!(request.key, "dGhlIHNhbXBsZSBub25jZQ==");
    }

    #[test]
    fn test_parse_incomplete_request() {
        let partial = &SAMPLE_REQUEST[..SAMPLE_REQUEST.len() - 2];
        assert_eq!(parse_upgrade(partial), Ok(None));
    }

    #[test]
    fn test_header_names_case_insensitive() {
        let request = b"GET / HTTP/1.1\r\nupgrade: WebSocket\r\nsec-websocket-key: abc==\r\n\r\n";
        let parsed = parse_upgrade(request).unwrap().unwrap();
        assert_eq!(parsed.key, "abc==");
    }

    #[test]
    fn test_plain_http_rejected() {
        let request = b"GET / HTTP/1.1\r\nHost: node\r\n\r\n";
        assert_eq!(parse_upgrade(request), Err(HandshakeError::NotWebSocket));
    }

    #[test]
    fn test_missing_key_rejected() {
        let request = b"GET / HTTP/1.1\r\nUpgrade: websocket\r\n\r\n";
        assert_eq!(parse_upgrade(request), Err(HandshakeError::MissingKey));
    }

    #[test]
    fn test_non_get_rejected() {
        let request = b"POST / HTTP/1.1\r\nUpgrade: websocket\r\nSec-WebSocket-Key: a\r\n\r\n";
        assert_eq!(parse_upgrade(request), Err(HandshakeError::MalformedRequest));
    }

    #[test]
    fn test_runaway_request_rejected() {
        let junk = [b'a'; MAX_REQUEST_LEN];
        assert_eq!(parse_upgrade(&junk), Err(HandshakeError::RequestTooLarge));
    }

    #[test]
    fn test_accept_response() {
        let mut buffer = [0u8; 256];
        let len = write_accept_response("dGhlIHNhbXBsZSBub25jZQ==", &mut buffer).unwrap();
        let response = core::str::from_utf8(&buffer[..len]).unwrap();

        assert!(response.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
        assert!(response.contains("Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n"));
        assert!(response.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_accept_response_buffer_too_small() {
        let mut buffer = [0u8; 16];
        assert_eq!(
            write_accept_response("abc", &mut buffer),
            Err(HandshakeError::BufferTooSmall)
        );
    }
}
