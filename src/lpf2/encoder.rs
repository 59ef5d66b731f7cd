//! # LPF2 Handshake and Mode Descriptor Encoder
//!
//! Encodes the messages a device sends once at connection setup: its
//! identity (type, speed, mode table, versions) followed by seven
//! descriptor messages per mode.

use bytes::{BufMut, BytesMut};

use super::codec::encode_into;
use super::frame::{ceil_log2, frame, Message};
use super::protocol::*;
use crate::error::{Lpf2Error, Result};

/// Number of messages emitted per mode descriptor
pub const MESSAGES_PER_MODE: usize = 7;

/// Number of identity messages preceding the mode descriptors
pub const IDENTITY_MESSAGES: usize = 4;

/// Sensor type message: `[0x40, type_code]`
pub fn encode_type(type_code: u8) -> Message {
    Message::new(CMD_TYPE, &[type_code])
}

/// Speed proposal message: `[0x52]` followed by the little-endian baud rate
pub fn encode_speed(baud_rate: u32) -> Message {
    Message::new(CMD_SPEED, &baud_rate.to_le_bytes())
}

/// Mode table message: `[0x49, mode_count - 1, view_count - 1]`
///
/// Both counts wrap at one byte, so a device without views announces 0xFF.
///
/// # Errors
///
/// Returns `TooManyModes` if more than 8 modes are declared.
pub fn encode_mode_table(modes: &[Mode]) -> Result<Message> {
    if modes.len() > MAX_MODES {
        return Err(Lpf2Error::TooManyModes(modes.len()));
    }

    let views = modes.iter().filter(|mode| mode.has_view).count();

    Ok(Message::new(
        CMD_MODES,
        &[(modes.len() as u8).wrapping_sub(1), (views as u8).wrapping_sub(1)],
    ))
}

/// Version message: `[0x5F]` followed by big-endian hardware and software versions
pub fn encode_version(hw_version: u32, sw_version: u32) -> Message {
    let mut payload = BytesMut::with_capacity(8);
    payload.put_u32(hw_version);
    payload.put_u32(sw_version);
    Message::new(CMD_VERSION, &payload)
}

/// String info message (name or units), zero-padded to the next power of two
///
/// # Errors
///
/// Returns `LengthClassOutOfRange` for text longer than 16 bytes.
pub fn encode_string(num: u8, info_type: u8, text: &str) -> Result<Message> {
    let bytes = text.as_bytes();
    let exp = ceil_log2(bytes.len());
    let size = 1usize << exp;

    let mut payload = BytesMut::with_capacity(1 + size);
    payload.put_u8(info_type);
    payload.put_slice(bytes);
    payload.put_bytes(0, size.saturating_sub(bytes.len()));

    frame(CMD_INFO, exp, num, &payload)
}

/// Range info message: sub-id followed by little-endian float min and max
pub fn encode_range(num: u8, info_type: u8, range: ValueRange) -> Result<Message> {
    let mut payload = BytesMut::with_capacity(9);
    payload.put_u8(info_type);
    encode_into(NumericType::Float32, Value::Float32(range.min), &mut payload)?;
    encode_into(NumericType::Float32, Value::Float32(range.max), &mut payload)?;

    frame(CMD_INFO, 3, num, &payload)
}

/// Function map info message: `[INFO_MAPPING, input, output]`
pub fn encode_mapping(num: u8, mapping: FunctionMap) -> Result<Message> {
    frame(CMD_INFO, 1, num, &[INFO_MAPPING, mapping.input, mapping.output])
}

/// Numeric format message: `[INFO_FORMAT, samples, type code, figures, decimals]`
///
/// Sent with the mode-format command base (0x51), whose low bit overlaps the
/// field index bits.
pub fn encode_format(num: u8, format: ValueFormat) -> Result<Message> {
    frame(
        CMD_MODE_FORMAT,
        2,
        num,
        &[
            INFO_FORMAT,
            format.sample_count,
            format.data_type.format_code(),
            format.figures,
            format.decimals,
        ],
    )
}

/// Encode the seven descriptor messages of mode `num`, in wire order
///
/// Nothing is returned unless all seven encode successfully.
///
/// # Errors
///
/// Returns `FieldIndexOutOfRange` if `num > 7`, or `LengthClassOutOfRange`
/// if the name or units do not fit a 16-byte string field.
pub fn encode_mode(num: u8, mode: &Mode) -> Result<Vec<Message>> {
    Ok(vec![
        encode_string(num, INFO_NAME, &mode.name)?,
        encode_range(num, INFO_RAW, mode.raw)?,
        encode_range(num, INFO_PCT, mode.pct)?,
        encode_range(num, INFO_SI, mode.si)?,
        encode_string(num, INFO_UNITS, &mode.units)?,
        encode_mapping(num, mode.mapping)?,
        encode_format(num, mode.format)?,
    ])
}

/// Encode the complete handshake for a device
///
/// Order: type, speed, mode table, version, then each mode's descriptor in
/// index order.
///
/// # Errors
///
/// Returns `TooManyModes` for more than 8 modes, or any error from
/// [`encode_mode`].
pub fn encode_handshake(identity: &DeviceIdentity, modes: &[Mode]) -> Result<Vec<Message>> {
    let mode_table = encode_mode_table(modes)?;

    let mut messages = Vec::with_capacity(IDENTITY_MESSAGES + modes.len() * MESSAGES_PER_MODE);
    messages.push(encode_type(identity.type_code));
    messages.push(encode_speed(identity.baud_rate));
    messages.push(mode_table);
    messages.push(encode_version(identity.hw_version, identity.sw_version));

    for (num, mode) in modes.iter().enumerate() {
        messages.extend(encode_mode(num as u8, mode)?);
    }

    Ok(messages)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lpf2::checksum::verify;

    pub(crate) fn sample_mode(name: &str) -> Mode {
        Mode {
            name: name.to_string(),
            format: ValueFormat {
                sample_count: 1,
                data_type: NumericType::Int16,
                figures: 4,
                decimals: 0,
            },
            raw: ValueRange::new(0.0, 1023.0),
            pct: ValueRange::new(0.0, 100.0),
            si: ValueRange::new(0.0, 1023.0),
            units: "RAW".to_string(),
            mapping: FunctionMap { input: 0x10, output: 0x00 },
            has_view: true,
        }
    }

    #[test]
    fn test_encode_type() {
        let msg = encode_type(65);
        assert_eq!(msg.as_bytes(), &[0x40, 0x41, 0x40 ^ 0x41 ^ 0xFF]);
    }

    #[test]
    fn test_encode_speed_little_endian() {
        // 115200 = 0x0001C200
        let msg = encode_speed(115_200);
        assert_eq!(&msg.as_bytes()[..5], &[0x52, 0x00, 0xC2, 0x01, 0x00]);
        assert!(verify(msg.as_bytes()));
    }

    #[test]
    fn test_encode_version_big_endian() {
        let msg = encode_version(0x0000_0001, 0x1000_0002);
        assert_eq!(
            &msg.as_bytes()[..9],
            &[0x5F, 0x00, 0x00, 0x00, 0x01, 0x10, 0x00, 0x00, 0x02]
        );
        assert_eq!(msg.len(), 10);
        assert!(verify(msg.as_bytes()));
    }

    #[test]
    fn test_encode_mode_table_counts_views() {
        let mut modes = vec![sample_mode("A"), sample_mode("B"), sample_mode("C")];
        modes[1].has_view = false;

        let msg = encode_mode_table(&modes).unwrap();
        assert_eq!(&msg.as_bytes()[..3], &[0x49, 2, 1]);
    }

    #[test]
    fn test_encode_mode_table_without_views_wraps() {
        let mut mode = sample_mode("A");
        mode.has_view = false;

        let msg = encode_mode_table(&[mode]).unwrap();
        assert_eq!(&msg.as_bytes()[..3], &[0x49, 0x00, 0xFF]);
    }

    #[test]
    fn test_encode_mode_table_limit() {
        let eight: Vec<Mode> = (0..8).map(|i| sample_mode(&format!("M{}", i))).collect();
        assert!(encode_mode_table(&eight).is_ok());

        let nine: Vec<Mode> = (0..9).map(|i| sample_mode(&format!("M{}", i))).collect();
        assert!(matches!(encode_mode_table(&nine), Err(Lpf2Error::TooManyModes(9))));
    }

    #[test]
    fn test_name_single_char_not_padded() {
        let msg = encode_string(0, INFO_NAME, "A").unwrap();
        assert_eq!(msg.header(), 0x80);
        assert_eq!(msg.payload(), &[INFO_NAME, b'A']);
    }

    #[test]
    fn test_name_padded_to_power_of_two() {
        let msg = encode_string(2, INFO_NAME, "ABC").unwrap();
        assert_eq!(msg.header(), 0x80 | (2 << 3) | 2);
        assert_eq!(msg.payload(), &[INFO_NAME, b'A', b'B', b'C', 0x00]);
    }

    #[test]
    fn test_empty_units() {
        let msg = encode_string(1, INFO_UNITS, "").unwrap();
        assert_eq!(msg.header(), 0x81);
        assert_eq!(msg.payload(), &[INFO_UNITS, 0x00]);
    }

    #[test]
    fn test_name_of_sixteen_fits() {
        let msg = encode_string(0, INFO_NAME, "ABCDEFGHIJKLMNOP").unwrap();
        assert_eq!(msg.header(), 0x80 | (4 << 3));
        assert_eq!(msg.payload().len(), 17);
    }

    #[test]
    fn test_name_too_long() {
        let result = encode_string(0, INFO_NAME, "ABCDEFGHIJKLMNOPQ");
        assert!(matches!(result, Err(Lpf2Error::LengthClassOutOfRange(5))));
    }

    #[test]
    fn test_encode_range() {
        let msg = encode_range(1, INFO_PCT, ValueRange::new(0.0, 100.0)).unwrap();
        assert_eq!(msg.header(), 0x80 | (3 << 3) | 1);
        assert_eq!(
            msg.payload(),
            &[INFO_PCT, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC8, 0x42]
        );
    }

    #[test]
    fn test_encode_mapping() {
        let msg = encode_mapping(4, FunctionMap { input: 0x10, output: 0x04 }).unwrap();
        assert_eq!(&msg.as_bytes()[..4], &[0x80 | 0x08 | 0x04, INFO_MAPPING, 0x10, 0x04]);
    }

    #[test]
    fn test_encode_format() {
        let format = ValueFormat {
            sample_count: 4,
            data_type: NumericType::Float32,
            figures: 5,
            decimals: 1,
        };
        let msg = encode_format(2, format).unwrap();
        assert_eq!(msg.header(), 0x51 | 0x10 | 0x02);
        assert_eq!(msg.payload(), &[INFO_FORMAT, 4, DATAF, 5, 1]);
    }

    #[test]
    fn test_encode_mode_order() {
        let messages = encode_mode(3, &sample_mode("DIST")).unwrap();
        assert_eq!(messages.len(), MESSAGES_PER_MODE);

        let sub_ids: Vec<u8> = messages.iter().map(|m| m.payload()[0]).collect();
        assert_eq!(
            sub_ids,
            vec![INFO_NAME, INFO_RAW, INFO_PCT, INFO_SI, INFO_UNITS, INFO_MAPPING, INFO_FORMAT]
        );

        for msg in &messages {
            assert_eq!(msg.header() & FIELD_INDEX_MASK, 3);
            assert!(verify(msg.as_bytes()));
        }
    }

    #[test]
    fn test_encode_mode_invalid_index() {
        let result = encode_mode(8, &sample_mode("A"));
        assert!(matches!(result, Err(Lpf2Error::FieldIndexOutOfRange(8))));
    }

    #[test]
    fn test_encode_handshake_sequence() {
        let identity = DeviceIdentity {
            type_code: 65,
            baud_rate: 115_200,
            hw_version: 1,
            sw_version: 2,
        };
        let modes = vec![sample_mode("DIST"), sample_mode("LIGHT")];

        let messages = encode_handshake(&identity, &modes).unwrap();
        assert_eq!(messages.len(), IDENTITY_MESSAGES + 2 * MESSAGES_PER_MODE);

        assert_eq!(messages[0].header(), CMD_TYPE);
        assert_eq!(messages[1].header(), CMD_SPEED);
        assert_eq!(messages[2].header(), CMD_MODES);
        assert_eq!(messages[3].header(), CMD_VERSION);

        // Mode 0 descriptors precede mode 1 descriptors
        assert_eq!(messages[4].header() & FIELD_INDEX_MASK, 0);
        assert_eq!(messages[4 + MESSAGES_PER_MODE].header() & FIELD_INDEX_MASK, 1);
        assert_eq!(&messages[4 + MESSAGES_PER_MODE].payload()[1..], b"LIGHT\0\0\0");
    }

    #[test]
    fn test_encode_handshake_rejects_nine_modes() {
        let modes: Vec<Mode> = (0..9).map(|i| sample_mode(&format!("M{}", i))).collect();
        let result = encode_handshake(&DeviceIdentity::default(), &modes);
        assert!(matches!(result, Err(Lpf2Error::TooManyModes(9))));
    }

    #[test]
    fn test_encode_handshake_with_eight_modes() {
        let modes: Vec<Mode> = (0..8).map(|i| sample_mode(&format!("M{}", i))).collect();
        let messages = encode_handshake(&DeviceIdentity::default(), &modes).unwrap();
        assert_eq!(messages.len(), IDENTITY_MESSAGES + 8 * MESSAGES_PER_MODE);
    }
}
