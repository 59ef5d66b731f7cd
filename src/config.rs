//! # Configuration Module
//!
//! Loads the simulated device description and runtime settings from TOML.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{Lpf2Error, Result};
use crate::lpf2::frame::ceil_log2;
use crate::lpf2::protocol::{DeviceIdentity, Mode, ValueRange, MAX_LENGTH_CLASS, MAX_MODES};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub device: DeviceIdentity,

    pub modes: Vec<Mode>,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// How long the line is held low before the wake byte
    #[serde(default = "default_wake_delay_ms")]
    pub wake_delay_ms: u64,
}

/// Data streaming configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SamplingConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,

    /// Mode the emulator streams readings for
    #[serde(default)]
    pub mode: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<String>,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyAMA0".to_string() }
fn default_baud_rate() -> u32 { 115_200 }
fn default_wake_delay_ms() -> u64 { 500 }

fn default_rate_hz() -> u32 { 50 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            wake_delay_ms: default_wake_delay_ms(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            mode: 0,
        }
    }
}

/// Build a validation error in the same shape as a parse error
fn invalid(msg: impl std::fmt::Display) -> Lpf2Error {
    Lpf2Error::Config(toml::de::Error::custom(msg))
}

/// Check a name or units string fits a 16-byte string field
fn validate_text(field: &str, index: usize, text: &str) -> Result<()> {
    if !text.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        return Err(invalid(format!(
            "modes[{}].{} must be printable ASCII",
            index, field
        )));
    }

    if ceil_log2(text.len()) > MAX_LENGTH_CLASS {
        return Err(invalid(format!(
            "modes[{}].{} must be at most 16 bytes",
            index, field
        )));
    }

    Ok(())
}

fn validate_range(field: &str, index: usize, range: &ValueRange) -> Result<()> {
    if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
        return Err(invalid(format!(
            "modes[{}].{} must be finite with min < max",
            index, field
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails (including unknown data types)
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lpf2_device::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if self.serial.baud_rate == 0 {
            return Err(invalid("baud_rate must be greater than 0"));
        }

        if self.serial.wake_delay_ms > 10000 {
            return Err(invalid("wake_delay_ms must be at most 10000"));
        }

        if self.device.baud_rate == 0 {
            return Err(invalid("device speed must be greater than 0"));
        }

        if self.modes.is_empty() {
            return Err(invalid("at least one mode must be defined"));
        }

        if self.modes.len() > MAX_MODES {
            return Err(Lpf2Error::TooManyModes(self.modes.len()));
        }

        for (index, mode) in self.modes.iter().enumerate() {
            validate_text("name", index, &mode.name)?;
            validate_text("units", index, &mode.units)?;

            if mode.name.is_empty() {
                return Err(invalid(format!("modes[{}].name cannot be empty", index)));
            }

            if mode.format.sample_count == 0 {
                return Err(invalid(format!("modes[{}].samples must be at least 1", index)));
            }

            validate_range("raw", index, &mode.raw)?;
            validate_range("pct", index, &mode.pct)?;
            validate_range("si", index, &mode.si)?;
        }

        if self.sampling.rate_hz == 0 || self.sampling.rate_hz > 1000 {
            return Err(invalid("sampling rate_hz must be between 1 and 1000"));
        }

        if self.sampling.mode as usize >= self.modes.len() {
            return Err(invalid(format!(
                "sampling mode {} does not exist ({} modes defined)",
                self.sampling.mode,
                self.modes.len()
            )));
        }

        if let Some(file) = &self.logging.file {
            if file.is_empty() {
                return Err(invalid("logging file cannot be empty"));
            }
        }

        Ok(())
    }
}
