//! Sensor instruction set and confirmation decoding.
//!
//! The controller supports the subset of the AS608 instruction table the
//! door flow needs. This is deliberately not a general sensor SDK.

use std::fmt;

/// Confirmation code for a successful command.
pub const ACK_OK: u8 = 0x00;

/// Confirmation code reported while no finger is on the window.
pub const ACK_NO_FINGER: u8 = 0x02;

/// Confirmation code for a search/verify that found no matching template.
pub const ACK_NO_MATCH: u8 = 0x09;

/// Instructions issued by the door controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Instruction {
    /// Capture the current image into the sensor's image buffer.
    GetImage = 0x01,

    /// Convert the image buffer into a character file in a template buffer.
    ImageToTemplate = 0x02,

    /// Precise-match the template buffer against one stored slot.
    Verify = 0x03,

    /// 1:N search of the template buffer across a page range.
    Search = 0x04,

    /// Combine both template buffers into a storable model.
    CreateModel = 0x05,

    /// Store the model at a library slot.
    StoreTemplate = 0x06,

    /// Read one 32-byte occupancy bitmap page of the template index.
    ReadIndexTable = 0x1F,
}

impl Instruction {
    /// Wire code of the instruction.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Size of the fixed response window this instruction produces.
    ///
    /// Plain acks are 12 bytes (header + confirmation + checksum); search
    /// adds page id and score; an index read adds the 32-byte bitmap.
    #[must_use]
    pub fn response_len(self) -> usize {
        match self {
            Instruction::Search => 16,
            Instruction::ReadIndexTable => 44,
            _ => 12,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Instruction::GetImage => "GetImage",
            Instruction::ImageToTemplate => "Img2Tz",
            Instruction::Verify => "Verify",
            Instruction::Search => "Search",
            Instruction::CreateModel => "RegModel",
            Instruction::StoreTemplate => "Store",
            Instruction::ReadIndexTable => "ReadIndexTable",
        };
        write!(f, "{name}")
    }
}

/// Template character buffer selector.
///
/// The sensor holds two character files; enrollment converts one capture
/// into each before combining them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CharBuffer {
    First = 1,
    Second = 2,
}

impl CharBuffer {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Decoded confirmation byte of a response packet.
///
/// The decode is total: every byte value maps to exactly one variant, and
/// anything the controller does not recognize maps to `Error` (fail-safe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckOutcome {
    /// Command executed.
    Ok,

    /// No finger present on the sensor window.
    NoFinger,

    /// No stored template matched.
    NoMatch,

    /// Any failure or unrecognized confirmation code.
    Error,
}

impl AckOutcome {
    /// Decode a raw confirmation byte.
    #[must_use]
    pub fn from_confirmation(code: u8) -> Self {
        match code {
            ACK_OK => AckOutcome::Ok,
            ACK_NO_FINGER => AckOutcome::NoFinger,
            ACK_NO_MATCH => AckOutcome::NoMatch,
            _ => AckOutcome::Error,
        }
    }
}

impl fmt::Display for AckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AckOutcome::Ok => "Ok",
            AckOutcome::NoFinger => "NoFinger",
            AckOutcome::NoMatch => "NoMatch",
            AckOutcome::Error => "Error",
        };
        write!(f, "{s}")
    }
}
