//! Wire framing for the sensor's serial protocol.
//!
//! Every frame carries a fixed start code, the module address, a packet
//! identifier, a big-endian length covering payload plus checksum, the
//! payload itself, and an additive 16-bit checksum over packet id, length,
//! and payload. Responses arrive in fixed-size windows per instruction, so
//! parsing never needs to resynchronize a byte stream.

use bytes::{BufMut, Bytes, BytesMut};
use fingate_core::{Error, Result};

use crate::command::Instruction;

/// Two-byte frame start code.
pub const START_CODE: u16 = 0xEF01;

/// Broadcast module address used when no per-device address is assigned.
pub const BROADCAST_ADDRESS: u32 = 0xFFFF_FFFF;

/// Packet identifier of a command frame.
pub const PACKET_ID_COMMAND: u8 = 0x01;

/// Packet identifier of an acknowledgment frame.
pub const PACKET_ID_ACK: u8 = 0x07;

/// Largest parameter payload a command of this command set carries.
pub const MAX_PARAMS: usize = 29;

/// Offset of the confirmation byte inside a raw response window.
const CONFIRMATION_OFFSET: usize = 9;

/// Offset of the first parameter byte after the confirmation.
const PARAMS_OFFSET: usize = 10;

/// Header bytes before the checksummed region (start code + address).
const CHECKSUM_REGION_OFFSET: usize = 6;

/// Smallest well-formed response: header, confirmation, checksum.
const MIN_RESPONSE_LEN: usize = 12;

/// Additive checksum over packet id, length field, and payload.
///
/// Wrapping sum modulo 2^16, exactly as the sensor computes it.
fn checksum(packet_id: u8, length: u16, payload: &[u8]) -> u16 {
    let mut sum = u16::from(packet_id);
    sum = sum.wrapping_add(length >> 8);
    sum = sum.wrapping_add(length & 0x00FF);
    for &b in payload {
        sum = sum.wrapping_add(u16::from(b));
    }
    sum
}

/// Encode a command frame for the broadcast address.
///
/// The length field covers the instruction byte, the parameters, and the
/// two checksum bytes.
///
/// # Errors
/// Returns `Error::Protocol` if `params` exceeds [`MAX_PARAMS`]; oversized
/// parameters indicate a caller bug, not a link condition.
pub fn encode_command(instruction: Instruction, params: &[u8]) -> Result<Bytes> {
    if params.len() > MAX_PARAMS {
        return Err(Error::Protocol(format!(
            "command parameters too long: {} > {MAX_PARAMS}",
            params.len()
        )));
    }

    // instruction + params + 2 checksum bytes
    let length = (params.len() + 3) as u16;

    let mut payload = Vec::with_capacity(params.len() + 1);
    payload.push(instruction.code());
    payload.extend_from_slice(params);
    let sum = checksum(PACKET_ID_COMMAND, length, &payload);

    let mut frame = BytesMut::with_capacity(MIN_RESPONSE_LEN + params.len());
    frame.put_u16(START_CODE);
    frame.put_u32(BROADCAST_ADDRESS);
    frame.put_u8(PACKET_ID_COMMAND);
    frame.put_u16(length);
    frame.put_slice(&payload);
    frame.put_u16(sum);
    Ok(frame.freeze())
}

/// A parsed response frame.
///
/// Holds only what the session machines consume: the confirmation byte and
/// any parameter bytes between it and the checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePacket {
    pub packet_id: u8,
    pub confirmation: u8,
    params: Vec<u8>,
}

impl ResponsePacket {
    /// Parse a raw response window.
    ///
    /// Validates the start code, the declared length against the window
    /// size, and the checksum. Any mismatch is a recoverable link error
    /// that the caller surfaces as a failed pass, never a panic.
    ///
    /// # Errors
    /// `Error::Protocol` for structural problems, `Error::ChecksumMismatch`
    /// when the frame is structurally sound but corrupt.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < MIN_RESPONSE_LEN {
            return Err(Error::Protocol(format!(
                "response window too short: {} bytes",
                raw.len()
            )));
        }

        let start = u16::from_be_bytes([raw[0], raw[1]]);
        if start != START_CODE {
            return Err(Error::Protocol(format!(
                "bad start code 0x{start:04X}"
            )));
        }

        let packet_id = raw[CHECKSUM_REGION_OFFSET];
        let length = u16::from_be_bytes([raw[7], raw[8]]);

        // Declared length covers confirmation + params + checksum and must
        // land exactly on the end of the window.
        let declared_end = CHECKSUM_REGION_OFFSET + 3 + usize::from(length);
        if declared_end != raw.len() {
            return Err(Error::Protocol(format!(
                "declared length {length} does not match {}-byte window",
                raw.len()
            )));
        }

        let payload = &raw[CONFIRMATION_OFFSET..raw.len() - 2];
        let expected = checksum(packet_id, length, payload);
        let actual = u16::from_be_bytes([raw[raw.len() - 2], raw[raw.len() - 1]]);
        if expected != actual {
            return Err(Error::ChecksumMismatch { expected, actual });
        }

        Ok(ResponsePacket {
            packet_id,
            confirmation: raw[CONFIRMATION_OFFSET],
            params: raw[PARAMS_OFFSET..raw.len() - 2].to_vec(),
        })
    }

    /// Parameter bytes following the confirmation byte.
    #[must_use]
    pub fn params(&self) -> &[u8] {
        &self.params
    }

    /// Read a big-endian u16 from the parameter bytes.
    ///
    /// # Errors
    /// `Error::Protocol` if the parameters are shorter than `offset + 2`.
    pub fn param_u16(&self, offset: usize) -> Result<u16> {
        let bytes = self
            .params
            .get(offset..offset + 2)
            .ok_or_else(|| {
                Error::Protocol(format!(
                    "response parameters too short for u16 at offset {offset}"
                ))
            })?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }
}
