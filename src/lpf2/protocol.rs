//! # LPF2 Protocol Constants and Types
//!
//! Core protocol definitions for the LPF2 (Powered Up) UART sensor protocol.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Lpf2Error, Result};

/// Sensor type announcement
pub const CMD_TYPE: u8 = 0x40;

/// Mode select (host to device)
pub const CMD_SELECT: u8 = 0x43;

/// Mode write (host to device)
pub const CMD_WRITE: u8 = 0x44;

/// Text message
pub const CMD_MSG: u8 = 0x46;

/// Mode count / view count table
pub const CMD_MODES: u8 = 0x49;

/// Mode numeric format
pub const CMD_MODE_FORMAT: u8 = 0x51;

/// UART speed proposal
pub const CMD_SPEED: u8 = 0x52;

/// Firmware / hardware version
pub const CMD_VERSION: u8 = 0x5F;

/// Mode information (name, ranges, units, mapping)
pub const CMD_INFO: u8 = 0x80;

/// Live data sample
pub const CMD_DATA: u8 = 0xC0;

/// Bit position of the length-class exponent in the header byte
pub const CMD_LLL_SHIFT: u8 = 3;

/// Mask of the field-index bits in the header byte
pub const FIELD_INDEX_MASK: u8 = 0x07;

/// Largest length-class exponent (2^4 = 16 bytes)
pub const MAX_LENGTH_CLASS: u8 = 4;

/// Largest field index (3 bits)
pub const MAX_FIELD_INDEX: u8 = 7;

/// Maximum number of modes a device can declare
pub const MAX_MODES: usize = 8;

/// Byte written once before the handshake to wake the host
pub const WAKE_BYTE: u8 = 0x00;

pub const INFO_NAME: u8 = 0x00;
pub const INFO_RAW: u8 = 0x01;
pub const INFO_PCT: u8 = 0x02;
pub const INFO_SI: u8 = 0x03;
pub const INFO_UNITS: u8 = 0x04;
pub const INFO_MAPPING: u8 = 0x05;
pub const INFO_MODE_COMBOS: u8 = 0x06;
pub const INFO_FORMAT: u8 = 0x80;

/// Format data-type codes carried in the numeric format message
pub const DATA8: u8 = 0x00;
pub const DATA16: u8 = 0x01;
pub const DATA32: u8 = 0x02;
pub const DATAF: u8 = 0x03;

/// Numeric sample types supported on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum NumericType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
}

impl NumericType {
    /// All numeric types, in width order
    pub const ALL: [NumericType; 7] = [
        NumericType::Int8,
        NumericType::UInt8,
        NumericType::Int16,
        NumericType::UInt16,
        NumericType::Int32,
        NumericType::UInt32,
        NumericType::Float32,
    ];

    /// Encoded width in bytes
    pub fn width(self) -> usize {
        match self {
            NumericType::Int8 | NumericType::UInt8 => 1,
            NumericType::Int16 | NumericType::UInt16 => 2,
            NumericType::Int32 | NumericType::UInt32 | NumericType::Float32 => 4,
        }
    }

    /// Data-type code sent in the mode format message
    pub fn format_code(self) -> u8 {
        match self {
            NumericType::Int8 | NumericType::UInt8 => DATA8,
            NumericType::Int16 | NumericType::UInt16 => DATA16,
            NumericType::Int32 | NumericType::UInt32 => DATA32,
            NumericType::Float32 => DATAF,
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericType::Int8 => "Int8",
            NumericType::UInt8 => "uInt8",
            NumericType::Int16 => "Int16",
            NumericType::UInt16 => "uInt16",
            NumericType::Int32 => "Int32",
            NumericType::UInt32 => "uInt32",
            NumericType::Float32 => "float",
        };
        f.write_str(name)
    }
}

impl FromStr for NumericType {
    type Err = Lpf2Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Int8" => Ok(NumericType::Int8),
            "uInt8" | "UInt8" => Ok(NumericType::UInt8),
            "Int16" => Ok(NumericType::Int16),
            "uInt16" | "UInt16" => Ok(NumericType::UInt16),
            "Int32" => Ok(NumericType::Int32),
            "uInt32" | "UInt32" => Ok(NumericType::UInt32),
            "float" | "Float32" => Ok(NumericType::Float32),
            other => Err(Lpf2Error::InvalidType(other.to_string())),
        }
    }
}

impl TryFrom<String> for NumericType {
    type Error = Lpf2Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A single typed reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Float32(f32),
}

impl Value {
    /// Numeric type of this value
    pub fn numeric_type(&self) -> NumericType {
        match self {
            Value::Int8(_) => NumericType::Int8,
            Value::UInt8(_) => NumericType::UInt8,
            Value::Int16(_) => NumericType::Int16,
            Value::UInt16(_) => NumericType::UInt16,
            Value::Int32(_) => NumericType::Int32,
            Value::UInt32(_) => NumericType::UInt32,
            Value::Float32(_) => NumericType::Float32,
        }
    }

    /// Convert a float reading to `ty`, saturating at the type bounds
    ///
    /// Integer targets truncate toward zero; NaN becomes 0.
    pub fn from_f64(ty: NumericType, value: f64) -> Self {
        match ty {
            NumericType::Int8 => Value::Int8(value as i8),
            NumericType::UInt8 => Value::UInt8(value as u8),
            NumericType::Int16 => Value::Int16(value as i16),
            NumericType::UInt16 => Value::UInt16(value as u16),
            NumericType::Int32 => Value::Int32(value as i32),
            NumericType::UInt32 => Value::UInt32(value as u32),
            NumericType::Float32 => Value::Float32(value as f32),
        }
    }
}

/// A reading sent in one data telegram: a scalar or a fixed-size array
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Scalar(Value),
    Array(Vec<Value>),
}

impl From<Value> for Sample {
    fn from(value: Value) -> Self {
        Sample::Scalar(value)
    }
}

impl From<Vec<Value>> for Sample {
    fn from(values: Vec<Value>) -> Self {
        Sample::Array(values)
    }
}

/// Min/max pair describing one value range of a mode
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(f32, f32)")]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl From<(f32, f32)> for ValueRange {
    fn from((min, max): (f32, f32)) -> Self {
        Self { min, max }
    }
}

/// Input/output type tags of a mode's function map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "(u8, u8)")]
pub struct FunctionMap {
    pub input: u8,
    pub output: u8,
}

impl From<(u8, u8)> for FunctionMap {
    fn from((input, output): (u8, u8)) -> Self {
        Self { input, output }
    }
}

/// Numeric format of a mode's samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ValueFormat {
    /// Number of values per data telegram
    #[serde(rename = "samples", default = "default_samples")]
    pub sample_count: u8,

    pub data_type: NumericType,

    /// Display width in characters
    #[serde(default = "default_figures")]
    pub figures: u8,

    #[serde(default)]
    pub decimals: u8,
}

fn default_samples() -> u8 { 1 }
fn default_figures() -> u8 { 4 }

/// One measurement channel exposed by the device
///
/// A device owns an ordered list of modes; a mode's position in that list is
/// its field index on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Mode {
    pub name: String,

    #[serde(flatten)]
    pub format: ValueFormat,

    pub raw: ValueRange,
    pub pct: ValueRange,
    pub si: ValueRange,

    #[serde(default)]
    pub units: String,

    #[serde(default)]
    pub mapping: FunctionMap,

    #[serde(rename = "view", default = "default_has_view")]
    pub has_view: bool,
}

fn default_has_view() -> bool { true }

/// Identity announced during the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeviceIdentity {
    #[serde(default = "default_type_code")]
    pub type_code: u8,

    /// Baud rate proposed to the host
    #[serde(rename = "speed", default = "default_speed")]
    pub baud_rate: u32,

    #[serde(default)]
    pub hw_version: u32,

    #[serde(default)]
    pub sw_version: u32,
}

fn default_type_code() -> u8 { 65 }
fn default_speed() -> u32 { 115_200 }

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            type_code: default_type_code(),
            baud_rate: default_speed(),
            hw_version: 0,
            sw_version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_constants() {
        assert_eq!(CMD_TYPE, 0x40);
        assert_eq!(CMD_SPEED, 0x52);
        assert_eq!(CMD_MODES, 0x49);
        assert_eq!(CMD_VERSION, 0x5F);
        assert_eq!(CMD_INFO, 0x80);
        assert_eq!(CMD_MODE_FORMAT, 0x51);
        assert_eq!(CMD_DATA, 0xC0);
    }

    #[test]
    fn test_widths_match_table() {
        let expected = [1, 1, 2, 2, 4, 4, 4];
        for (ty, width) in NumericType::ALL.iter().zip(expected) {
            assert_eq!(ty.width(), width, "width of {}", ty);
        }
    }

    #[test]
    fn test_format_codes() {
        assert_eq!(NumericType::Int8.format_code(), DATA8);
        assert_eq!(NumericType::UInt16.format_code(), DATA16);
        assert_eq!(NumericType::Int32.format_code(), DATA32);
        assert_eq!(NumericType::Float32.format_code(), DATAF);
    }

    #[test]
    fn test_parse_type_names() {
        assert_eq!("uInt8".parse::<NumericType>().unwrap(), NumericType::UInt8);
        assert_eq!("UInt32".parse::<NumericType>().unwrap(), NumericType::UInt32);
        assert_eq!("float".parse::<NumericType>().unwrap(), NumericType::Float32);

        for ty in NumericType::ALL {
            assert_eq!(ty.to_string().parse::<NumericType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        match "double".parse::<NumericType>() {
            Err(Lpf2Error::InvalidType(name)) => assert_eq!(name, "double"),
            other => panic!("Expected InvalidType, got: {:?}", other),
        }
    }

    #[test]
    fn test_value_from_f64_saturates() {
        assert_eq!(Value::from_f64(NumericType::Int8, 300.0), Value::Int8(127));
        assert_eq!(Value::from_f64(NumericType::UInt8, -5.0), Value::UInt8(0));
        assert_eq!(Value::from_f64(NumericType::Int16, -12.7), Value::Int16(-12));
        assert_eq!(Value::from_f64(NumericType::Float32, 1.5), Value::Float32(1.5));
        assert_eq!(Value::from_f64(NumericType::UInt32, f64::NAN), Value::UInt32(0));
    }

    #[test]
    fn test_value_numeric_type() {
        assert_eq!(Value::Int16(-1).numeric_type(), NumericType::Int16);
        assert_eq!(Value::Float32(0.0).numeric_type(), NumericType::Float32);
    }
}
