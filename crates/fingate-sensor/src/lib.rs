//! AS608 fingerprint sensor protocol for the Fingate door controller.
//!
//! This crate implements the sensor's binary serial protocol: request
//! framing with an additive checksum, response-window parsing, confirmation
//! decoding, and the command surface the session machine drives
//! (`GetImage`, `Img2Tz`, `Search`, `Verify`, `RegModel`, `Store`, and the
//! paginated index-table scan used for free-slot discovery).
//!
//! # Architecture
//!
//! ```text
//! SensorCodec ──execute()──> SensorTransport (serial link, injected)
//!      │
//!      └─ encode_command() / ResponsePacket::parse()
//! ```
//!
//! The codec is strictly request/response: one command is sent, one
//! fixed-size response window is read, and no partial-packet state survives
//! across calls. Retry policy belongs to the caller's state machine, never
//! to this layer.
//!
//! Byte-level serial I/O is out of scope: the [`SensorTransport`] trait is
//! the seam, and [`MockTransport`] provides a scriptable stand-in for tests
//! and development without hardware.

#![allow(async_fn_in_trait)]

pub mod codec;
pub mod command;
pub mod packet;
pub mod testing;
pub mod transport;

pub use codec::{SearchResult, SensorCodec};
pub use command::{AckOutcome, CharBuffer, Instruction};
pub use packet::{ResponsePacket, encode_command};
pub use transport::{MockTransport, SensorTransport};
