//! WebSocket listener slots
//!
//! Each slot owns one TCP socket and serves one client at a time:
//!
//! 1. Accept a connection on the configured port
//! 2. Read the HTTP upgrade request and answer the handshake (or 400)
//! 3. Report `Connected`, then forward broadcast frames until the session ends
//! 4. Report `Disconnected` exactly once and go back to listening
//!
//! Inbound data frames are forwarded to the main loop for logging; pings
//! are answered here; a close frame ends the session.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_net::tcp::{self, TcpSocket};
use embassy_net::Stack;
use embassy_time::Duration;
use embedded_io_async::Write;

use telenode_core::MAX_CLIENTS;
use telenode_protocol::frame::{encode_close, encode_frame, encode_text, CLOSE_NORMAL};
use telenode_protocol::handshake::{parse_upgrade, write_accept_response, BAD_REQUEST_RESPONSE};
use telenode_protocol::{
    ClientEvent, ClientId, FrameDecoder, HandshakeError, Opcode, WsError, WsFrame,
    MAX_BROADCAST_LEN, MAX_FRAME_HEADER, MAX_REQUEST_LEN,
};

use crate::channels::{FrameSubscriber, CLIENT_EVENTS, FRAMES};

/// Time allowed for the client to send its upgrade request
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP keep-alive once the session is up
const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Room for a pong or close reply (control payloads are at most 125 bytes)
const CONTROL_FRAME_LEN: usize = 2 + 125;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
enum SessionError {
    /// Socket error or reset
    Socket(tcp::Error),
    /// Peer closed the TCP connection
    PeerClosed,
    /// Request was not a usable upgrade
    Handshake(HandshakeError),
    /// Client broke the framing rules
    Protocol(WsError),
    /// Every frame subscription is taken
    NoSubscriber,
}

impl From<tcp::Error> for SessionError {
    fn from(err: tcp::Error) -> Self {
        SessionError::Socket(err)
    }
}

impl From<HandshakeError> for SessionError {
    fn from(err: HandshakeError) -> Self {
        SessionError::Handshake(err)
    }
}

impl From<WsError> for SessionError {
    fn from(err: WsError) -> Self {
        SessionError::Protocol(err)
    }
}

/// What to do after handling one inbound frame
enum Flow {
    Continue,
    Close,
}

/// Listener slot task
#[embassy_executor::task(pool_size = MAX_CLIENTS)]
pub async fn ws_server_task(stack: Stack<'static>, slot: ClientId, port: u16) -> ! {
    info!("WebSocket slot {} listening on port {}", slot, port);

    let mut rx_buffer = [0u8; 1024];
    let mut tx_buffer = [0u8; 512];

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(HANDSHAKE_TIMEOUT));

        if let Err(err) = socket.accept(port).await {
            warn!("Slot {}: accept failed: {}", slot, err);
            continue;
        }

        match handshake(&mut socket).await {
            Ok(()) => match session(&mut socket, slot).await {
                Ok(()) => debug!("Slot {}: session closed by client", slot),
                Err(err) => debug!("Slot {}: session ended: {}", slot, err),
            },
            Err(err) => warn!("Slot {}: handshake failed: {}", slot, err),
        }

        socket.close();
        let _ = socket.flush().await;
    }
}

/// Read the upgrade request and answer it
async fn handshake(socket: &mut TcpSocket<'_>) -> Result<(), SessionError> {
    let mut request = [0u8; MAX_REQUEST_LEN];
    let mut len = 0;

    loop {
        let n = socket.read(&mut request[len..]).await?;
        if n == 0 {
            return Err(SessionError::PeerClosed);
        }
        len += n;

        match parse_upgrade(&request[..len]) {
            Ok(Some(upgrade)) => {
                let mut response = [0u8; 160];
                let n = write_accept_response(upgrade.key, &mut response)?;
                socket.write_all(&response[..n]).await?;
                return Ok(());
            }
            Ok(None) => {}
            Err(err) => {
                socket.write_all(BAD_REQUEST_RESPONSE).await?;
                return Err(err.into());
            }
        }
    }
}

/// Run one upgraded session, bracketed by Connected/Disconnected events
async fn session(socket: &mut TcpSocket<'_>, slot: ClientId) -> Result<(), SessionError> {
    let mut frames = FRAMES
        .subscriber()
        .map_err(|_| SessionError::NoSubscriber)?;

    socket.set_timeout(None);
    socket.set_keep_alive(Some(KEEP_ALIVE));

    CLIENT_EVENTS.send(ClientEvent::Connected(slot)).await;
    let result = serve(socket, slot, &mut frames).await;
    CLIENT_EVENTS.send(ClientEvent::Disconnected(slot)).await;

    result
}

async fn serve(
    socket: &mut TcpSocket<'_>,
    slot: ClientId,
    frames: &mut FrameSubscriber,
) -> Result<(), SessionError> {
    let mut decoder = FrameDecoder::new();
    let mut rx = [0u8; 256];
    let mut tx = [0u8; MAX_FRAME_HEADER + MAX_BROADCAST_LEN];
    let mut control = [0u8; CONTROL_FRAME_LEN];

    loop {
        match select(socket.read(&mut rx), frames.next_message_pure()).await {
            Either::First(read) => {
                let n = read?;
                if n == 0 {
                    return Err(SessionError::PeerClosed);
                }

                for &byte in &rx[..n] {
                    match decoder.feed(byte) {
                        Ok(Some(frame)) => {
                            if let Flow::Close =
                                handle_frame(socket, slot, frame, &mut control).await?
                            {
                                return Ok(());
                            }
                        }
                        Ok(None) => {}
                        Err(err) => {
                            let len = encode_close(err.close_code(), &mut control)?;
                            let _ = socket.write_all(&control[..len]).await;
                            return Err(err.into());
                        }
                    }
                }
            }
            Either::Second(frame) => {
                let len = encode_text(frame.as_str(), &mut tx)?;
                socket.write_all(&tx[..len]).await?;
            }
        }
    }
}

async fn handle_frame(
    socket: &mut TcpSocket<'_>,
    slot: ClientId,
    frame: WsFrame,
    control: &mut [u8],
) -> Result<Flow, SessionError> {
    match frame.opcode {
        Opcode::Text | Opcode::Binary | Opcode::Continuation => {
            if CLIENT_EVENTS
                .try_send(ClientEvent::message(slot, &frame.payload))
                .is_err()
            {
                warn!("Slot {}: event queue full, message dropped", slot);
            }
            Ok(Flow::Continue)
        }
        Opcode::Ping => {
            let len = encode_frame(Opcode::Pong, &frame.payload, control)?;
            socket.write_all(&control[..len]).await?;
            Ok(Flow::Continue)
        }
        Opcode::Pong => Ok(Flow::Continue),
        Opcode::Close => {
            let len = encode_close(CLOSE_NORMAL, control)?;
            socket.write_all(&control[..len]).await?;
            socket.flush().await?;
            Ok(Flow::Close)
        }
    }
}
