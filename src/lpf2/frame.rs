//! # LPF2 Message Framer
//!
//! Builds single wire messages: header byte, payload, checksum.
//!
//! ```text
//! +-----------------------------+-----------+----------+
//! | header                      | payload   | checksum |
//! | CCCCC... | LLL << 3 | III   | N bytes   | 1 byte   |
//! +-----------------------------+-----------+----------+
//! ```
//!
//! `LLL` is the length-class exponent (message length 2^LLL) and `III` the
//! field index (mode number) the message concerns.

use bytes::Bytes;

use super::checksum::append_checksum;
use super::protocol::*;
use crate::error::{Lpf2Error, Result};

/// One complete wire message (header + payload + checksum)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    bytes: Bytes,
}

impl Message {
    /// Build a message from its header byte and payload, appending the checksum
    pub fn new(header: u8, payload: &[u8]) -> Self {
        let mut body = Vec::with_capacity(payload.len() + 2);
        body.push(header);
        body.extend_from_slice(payload);
        Self {
            bytes: Bytes::from(append_checksum(body)),
        }
    }

    /// Header byte
    pub fn header(&self) -> u8 {
        self.bytes[0]
    }

    /// Bytes between header and checksum
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..self.bytes.len() - 1]
    }

    /// Trailing checksum byte
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// Complete wire bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total length on the wire, checksum included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a message carries at least a header and checksum
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Build the header byte `command_base | (length_class << 3) | field_index`
///
/// # Errors
///
/// Returns `LengthClassOutOfRange` if `length_class > 4` and
/// `FieldIndexOutOfRange` if `field_index > 7`.
pub fn header_byte(command_base: u8, length_class: u8, field_index: u8) -> Result<u8> {
    if length_class > MAX_LENGTH_CLASS {
        return Err(Lpf2Error::LengthClassOutOfRange(length_class));
    }

    if field_index > MAX_FIELD_INDEX {
        return Err(Lpf2Error::FieldIndexOutOfRange(field_index));
    }

    Ok(command_base | (length_class << CMD_LLL_SHIFT) | field_index)
}

/// Frame a payload into a complete message
///
/// # Arguments
///
/// * `command_base` - Command class (e.g. `CMD_INFO`, `CMD_DATA`)
/// * `length_class` - Length-class exponent (0-4)
/// * `field_index` - Mode the message concerns (0-7)
/// * `payload` - Bytes following the header
///
/// # Examples
///
/// ```
/// use lpf2_device::lpf2::frame::frame;
/// use lpf2_device::lpf2::protocol::CMD_DATA;
///
/// let msg = frame(CMD_DATA, 0, 1, &[0x2A]).unwrap();
/// assert_eq!(msg.as_bytes(), &[0xC1, 0x2A, 0xC1 ^ 0x2A ^ 0xFF]);
/// ```
pub fn frame(command_base: u8, length_class: u8, field_index: u8, payload: &[u8]) -> Result<Message> {
    let header = header_byte(command_base, length_class, field_index)?;
    Ok(Message::new(header, payload))
}

/// Smallest exponent `k` with `2^k >= len` (0 for empty input)
pub fn ceil_log2(len: usize) -> u8 {
    if len <= 1 {
        0
    } else {
        (usize::BITS - (len - 1).leading_zeros()) as u8
    }
}

/// Largest exponent `k` with `2^k <= len`; `len` must be non-zero
pub fn floor_log2(len: usize) -> u8 {
    len.ilog2() as u8
}
