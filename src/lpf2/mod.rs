//! # LPF2 Protocol Module
//!
//! Device-side encoder for the LPF2 (LEGO Powered Up) UART sensor protocol.
//!
//! This module handles:
//! - Numeric value encoding (8/16/32-bit integers, 32-bit floats)
//! - Complemented XOR checksums
//! - Message framing (command class, length class, field index)
//! - Handshake and mode descriptor sequences
//! - Live data telegrams

pub mod protocol;
pub mod codec;
pub mod checksum;
pub mod frame;
pub mod encoder;
pub mod telegram;
