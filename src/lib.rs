//! # LPF2 Device Library
//!
//! Impersonate an LPF2 (LEGO Powered Up) UART sensor.
//!
//! This library provides the protocol encoder that announces a device's type,
//! modes, ranges and units to a hub, then streams live data samples over a
//! serial link.

pub mod config;
pub mod error;
pub mod lpf2;
pub mod device;
pub mod serial;
