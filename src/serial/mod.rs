//! # Serial Communication Module
//!
//! Handles the UART link to the LPF2 hub.
//!
//! This module handles:
//! - Opening the serial port (8N1, no flow control)
//! - Holding the line low to wake the hub before the handshake
//! - Ordered, blocking writes of framed messages

pub mod port_trait;

use std::time::Duration;

use async_trait::async_trait;
use tokio_serial::{SerialPort, SerialPortBuilderExt};
use tracing::{debug, info, warn};

use crate::error::{Lpf2Error, Result};
pub use port_trait::SerialSink;

/// Baud rate the hub listens at before any speed change
pub const LPF2_DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default UART device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyAMA0", // Raspberry Pi primary UART
    "/dev/ttyS0",   // Mini UART / PC serial
    "/dev/ttyUSB0", // USB-to-serial adapters
];

/// LPF2 serial port handler
pub struct Lpf2Serial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyAMA0)
    device_path: String,
}

impl std::fmt::Debug for Lpf2Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lpf2Serial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Lpf2Serial {
    /// Open the UART by trying the default device paths
    ///
    /// # Errors
    ///
    /// Returns `SerialPortNotFound` if no device could be opened
    pub fn open(baud_rate: u32) -> Result<Self> {
        Self::open_with_paths(DEFAULT_DEVICE_PATHS, baud_rate)
    }

    /// Open the UART with custom device paths
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyAMA0"])
    /// * `baud_rate` - Line speed
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened LPF2 UART at {} ({} baud)", path, baud_rate);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(Lpf2Error::SerialPortNotFound(paths.join(", ")))
    }

    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| Lpf2Error::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Hold TX low for `delay`, then release it so the hub notices the device
    pub async fn wake(&mut self, delay: Duration) -> Result<()> {
        self.port
            .set_break()
            .map_err(|e| Lpf2Error::Serial(format!("Failed to assert break: {}", e)))?;

        tokio::time::sleep(delay).await;

        self.port
            .clear_break()
            .map_err(|e| Lpf2Error::Serial(format!("Failed to clear break: {}", e)))?;

        debug!("Line released after {:?}", delay);
        Ok(())
    }

    /// Path of the opened device
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl SerialSink for Lpf2Serial {
    async fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }
}
