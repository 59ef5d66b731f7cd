//! # LPF2 Data Telegram Encoder
//!
//! Encodes live readings into data messages sent at the sampling rate.
//!
//! Arrays that do not fill a power-of-two length exactly are cut down to the
//! largest power-of-two capacity below them (at most 16 bytes); the dropped
//! tail elements are never sent.

use bytes::BytesMut;

use super::codec::encode_into;
use super::frame::{floor_log2, frame, Message};
use super::protocol::*;
use crate::error::{Lpf2Error, Result};

/// Length class and element count used to send `count` elements of `ty`
///
/// Returns `(length_class, elements_kept)`.
///
/// # Errors
///
/// Returns `EmptySample` if `count` is zero.
pub fn array_layout(ty: NumericType, count: usize) -> Result<(u8, usize)> {
    if count == 0 {
        return Err(Lpf2Error::EmptySample);
    }

    let required = ty.width() * count;
    let exp = floor_log2(required).min(MAX_LENGTH_CLASS);
    let capacity = (1usize << exp) / ty.width();
    Ok((exp, count.min(capacity)))
}

/// Encode a reading for mode `mode` into a data message
///
/// # Arguments
///
/// * `ty` - Numeric type of every element
/// * `sample` - Scalar or array reading
/// * `mode` - Field index of the mode the reading belongs to (0-7)
///
/// # Errors
///
/// Returns:
/// - `InvalidType` if an element is not of type `ty`
/// - `EmptySample` for an empty array
/// - `FieldIndexOutOfRange` if `mode > 7`
///
/// # Examples
///
/// ```
/// use lpf2_device::lpf2::telegram::encode_data;
/// use lpf2_device::lpf2::protocol::{NumericType, Sample, Value};
///
/// let msg = encode_data(NumericType::Int16, &Sample::Scalar(Value::Int16(-1234)), 2).unwrap();
/// assert_eq!(msg.as_bytes(), &[0xCA, 0x2E, 0xFB, 0xCA ^ 0x2E ^ 0xFB ^ 0xFF]);
/// ```
pub fn encode_data(ty: NumericType, sample: &Sample, mode: u8) -> Result<Message> {
    match sample {
        Sample::Scalar(value) => {
            let exp = floor_log2(ty.width());
            let mut payload = BytesMut::with_capacity(ty.width());
            encode_into(ty, *value, &mut payload)?;
            frame(CMD_DATA, exp, mode, &payload)
        }
        Sample::Array(values) => {
            let (exp, kept) = array_layout(ty, values.len())?;
            let mut payload = BytesMut::with_capacity(kept * ty.width());
            for value in &values[..kept] {
                encode_into(ty, *value, &mut payload)?;
            }
            frame(CMD_DATA, exp, mode, &payload)
        }
    }
}
