//! Telenode broadcast protocol
//!
//! This crate defines everything that crosses the network between the node
//! and its clients. Clients connect with a plain WebSocket upgrade and then
//! only listen; the node pushes one text frame per loop tick.
//!
//! # Protocol Overview
//!
//! ```text
//! client                                   node
//!   │  GET / HTTP/1.1                        │
//!   │  Upgrade: websocket                    │
//!   │  Sec-WebSocket-Key: ...      ───────▶  │
//!   │                                        │
//!   │  ◀───────  101 Switching Protocols     │
//!   │                                        │
//!   │  ◀───────  text {"value":"2048"}       │  reporting
//!   │  ◀───────  text {"value":"-"}          │  not reporting
//!   │  text/binary (logged, ignored) ──────▶ │
//! ```
//!
//! The payload shape is the whole contract: no versioning, no compression,
//! no acknowledgements.

#![no_std]
#![deny(unsafe_code)]

pub mod events;
pub mod frame;
pub mod handshake;
pub mod telemetry;

pub use events::{ClientEvent, ClientId, MAX_MESSAGE_LEN};
pub use frame::{FrameDecoder, Opcode, WsError, WsFrame, MAX_FRAME_HEADER};
pub use handshake::{HandshakeError, UpgradeRequest, MAX_REQUEST_LEN};
pub use telemetry::{BroadcastFrame, MAX_BROADCAST_LEN, NO_DATA};
