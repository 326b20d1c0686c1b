//! Frame builders for tests and hardware-free development.
//!
//! Shipped unconditionally, like [`crate::MockTransport`], so downstream
//! crates can script sensor conversations without re-deriving the framing.

use crate::packet::{BROADCAST_ADDRESS, PACKET_ID_ACK, START_CODE};

/// Build a well-formed response window with the given confirmation and
/// parameter bytes, checksummed the way the sensor does it.
#[must_use]
pub fn build_ack(confirmation: u8, params: &[u8]) -> Vec<u8> {
    let length = (params.len() + 3) as u16;
    let mut sum = u16::from(PACKET_ID_ACK);
    sum = sum.wrapping_add(length >> 8);
    sum = sum.wrapping_add(length & 0x00FF);
    sum = sum.wrapping_add(u16::from(confirmation));
    for &b in params {
        sum = sum.wrapping_add(u16::from(b));
    }

    let mut raw = Vec::with_capacity(12 + params.len());
    raw.extend_from_slice(&START_CODE.to_be_bytes());
    raw.extend_from_slice(&BROADCAST_ADDRESS.to_be_bytes());
    raw.push(PACKET_ID_ACK);
    raw.extend_from_slice(&length.to_be_bytes());
    raw.push(confirmation);
    raw.extend_from_slice(params);
    raw.extend_from_slice(&sum.to_be_bytes());
    raw
}

/// Build a 44-byte index-table response carrying `bitmap`.
#[must_use]
pub fn build_index_page(bitmap: &[u8; 32]) -> Vec<u8> {
    build_ack(0x00, bitmap)
}
