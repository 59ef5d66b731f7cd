//! # Error Types
//!
//! Custom error types for the LPF2 device emulator using `thiserror`.

use thiserror::Error;

/// Main error type for the LPF2 device emulator
#[derive(Debug, Error)]
pub enum Lpf2Error {
    /// Unknown numeric type name, or a value that does not match the requested type
    #[error("Invalid numeric type: {0}")]
    InvalidType(String),

    /// Field index does not fit the 3-bit header field
    #[error("Field index {0} out of range (must be 0-7)")]
    FieldIndexOutOfRange(u8),

    /// Device declares more modes than the header can address
    #[error("Too many modes: {0} (maximum is 8)")]
    TooManyModes(usize),

    /// Length class exponent above 4 (message longer than 16 bytes)
    #[error("Length class {0} out of range (must be 0-4)")]
    LengthClassOutOfRange(u8),

    /// Data telegram with no elements
    #[error("Cannot encode an empty sample array")]
    EmptySample,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial transport errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial ports could be opened
    #[error("No serial port found (tried: {0})")]
    SerialPortNotFound(String),
}

/// Result type alias for the LPF2 device emulator
pub type Result<T> = std::result::Result<T, Lpf2Error>;
