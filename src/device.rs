//! # LPF2 Device
//!
//! Drives the protocol over a serial sink: a wake byte, the one-time
//! handshake, then data telegrams for as long as the link is up.

use tracing::{debug, info};

use crate::error::{Lpf2Error, Result};
use crate::lpf2::encoder::encode_handshake;
use crate::lpf2::frame::Message;
use crate::lpf2::protocol::{DeviceIdentity, Mode, Sample, MAX_MODES, WAKE_BYTE};
use crate::lpf2::telegram::encode_data;
use crate::serial::SerialSink;

/// A simulated LPF2 sensor bound to one serial sink
///
/// The device has exclusive use of its sink, which keeps messages in the
/// order the hub expects.
pub struct Lpf2Device<S: SerialSink> {
    sink: S,
    identity: DeviceIdentity,
    modes: Vec<Mode>,
    connected: bool,
}

impl<S: SerialSink> Lpf2Device<S> {
    /// Create a device
    ///
    /// # Errors
    ///
    /// Returns `TooManyModes` if more than 8 modes are given.
    pub fn new(sink: S, identity: DeviceIdentity, modes: Vec<Mode>) -> Result<Self> {
        if modes.len() > MAX_MODES {
            return Err(Lpf2Error::TooManyModes(modes.len()));
        }

        Ok(Self {
            sink,
            identity,
            modes,
            connected: false,
        })
    }

    /// Write the single wake byte that precedes the handshake
    pub async fn send_wake_byte(&mut self) -> Result<()> {
        self.sink.write_all(&[WAKE_BYTE]).await?;
        self.sink.flush().await?;
        Ok(())
    }

    /// Announce identity and every mode to the hub
    ///
    /// The whole sequence is encoded before the first byte is written, so an
    /// encoding error leaves the sink untouched.
    pub async fn handshake(&mut self) -> Result<()> {
        self.connected = false;

        let messages = encode_handshake(&self.identity, &self.modes)?;
        for message in &messages {
            self.write_message(message).await?;
        }
        self.sink.flush().await?;

        self.connected = true;
        info!(
            "Handshake sent: type {}, {} modes, {} messages",
            self.identity.type_code,
            self.modes.len(),
            messages.len()
        );
        Ok(())
    }

    /// Send a reading for mode `mode`, encoded with that mode's data type
    ///
    /// # Errors
    ///
    /// Returns `FieldIndexOutOfRange` if the device has no such mode, or any
    /// error from [`encode_data`].
    pub async fn send_data(&mut self, mode: u8, sample: &Sample) -> Result<()> {
        let data_type = self
            .modes
            .get(mode as usize)
            .map(|m| m.format.data_type)
            .ok_or(Lpf2Error::FieldIndexOutOfRange(mode))?;

        let message = encode_data(data_type, sample, mode)?;
        self.write_message(&message).await?;
        self.sink.flush().await?;
        Ok(())
    }

    async fn write_message(&mut self, message: &Message) -> Result<()> {
        self.sink.write_all(message.as_bytes()).await?;
        debug!("Sent LPF2 message 0x{:02X} ({} bytes)", message.header(), message.len());
        Ok(())
    }

    /// True once the handshake has been written
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Mutable access to the underlying sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
