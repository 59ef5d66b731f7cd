//! # Numeric Codec
//!
//! Maps numeric types to their little-endian wire encoding.

use bytes::{BufMut, BytesMut};

use super::protocol::{NumericType, Value};
use crate::error::{Lpf2Error, Result};

/// Append the encoding of `value` to `buf`
///
/// # Errors
///
/// Returns `InvalidType` if `value` is not of type `ty`.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use lpf2_device::lpf2::codec::encode_into;
/// use lpf2_device::lpf2::protocol::{NumericType, Value};
///
/// let mut buf = BytesMut::new();
/// encode_into(NumericType::Int16, Value::Int16(-1234), &mut buf).unwrap();
/// assert_eq!(&buf[..], &[0x2E, 0xFB]);
/// ```
pub fn encode_into(ty: NumericType, value: Value, buf: &mut BytesMut) -> Result<()> {
    if value.numeric_type() != ty {
        return Err(Lpf2Error::InvalidType(format!(
            "expected {}, got {}",
            ty,
            value.numeric_type()
        )));
    }

    match value {
        Value::Int8(v) => buf.put_i8(v),
        Value::UInt8(v) => buf.put_u8(v),
        Value::Int16(v) => buf.put_i16_le(v),
        Value::UInt16(v) => buf.put_u16_le(v),
        Value::Int32(v) => buf.put_i32_le(v),
        Value::UInt32(v) => buf.put_u32_le(v),
        Value::Float32(v) => buf.put_f32_le(v),
    }

    Ok(())
}
