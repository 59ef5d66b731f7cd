//! # LPF2 Device
//!
//! Impersonate an LPF2 (LEGO Powered Up) UART sensor.
//!
//! Loads a device description, announces it to the hub and streams a
//! synthetic reading for one mode until interrupted.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod device;
mod error;
mod lpf2;
mod serial;

use config::{Config, LoggingConfig};
use device::Lpf2Device;
use error::Lpf2Error;
use lpf2::protocol::{Mode, Sample, Value};
use serial::Lpf2Serial;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of data telegrams between status log messages
const LOG_INTERVAL_SAMPLES: u64 = 500;

/// Steps in one sweep of the synthetic sawtooth
const SAWTOOTH_STEPS: u64 = 100;

/// Main entry point for the LPF2 device emulator
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Open the UART, hold the line low, write the wake byte
///
/// 2. **Handshake**
///    - Type, speed, mode table, version
///    - Seven descriptor messages per mode
///
/// 3. **Main Loop**
///    - Send a sawtooth reading over the streamed mode's raw range at `rate_hz`
///    - Handle Ctrl+C for graceful shutdown
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);

    info!("LPF2 device v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut serial = Lpf2Serial::open_with_paths(&[config.serial.port.as_str()], config.serial.baud_rate)?;
    serial
        .wake(Duration::from_millis(config.serial.wake_delay_ms))
        .await?;

    let mut device = Lpf2Device::new(serial, config.device, config.modes.clone())?;
    device.send_wake_byte().await?;
    device.handshake().await?;

    let mode_index = config.sampling.mode;
    let mode = &config.modes[mode_index as usize];
    let period_ms = (1000 / config.sampling.rate_hz).max(1);
    let mut sample_interval = interval(Duration::from_millis(period_ms as u64));

    info!(
        "Streaming mode {} ({}) at {}Hz",
        mode_index, mode.name, config.sampling.rate_hz
    );
    info!("Press Ctrl+C to exit");

    let mut sample_count: u64 = 0;

    loop {
        tokio::select! {
            _ = sample_interval.tick() => {
                let sample = synthetic_sample(mode, sample_count);

                if let Err(e) = device.send_data(mode_index, &sample).await {
                    warn!("Failed to send sample: {}", e);
                    if is_link_failure(&e) {
                        return Err(e).context("Serial link lost");
                    }
                    continue;
                }

                sample_count += 1;

                if sample_count % LOG_INTERVAL_SAMPLES == 0 {
                    info!("Sent {} samples for mode {}", sample_count, mode_index);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total samples sent: {}", sample_count);
                break;
            }
        }
    }

    Ok(())
}

/// Transport failures end the stream; encoding failures only skip one sample
fn is_link_failure(error: &Lpf2Error) -> bool {
    matches!(error, Lpf2Error::Io(_) | Lpf2Error::Serial(_))
}

/// Install the console subscriber, plus a file writer when configured
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let (file_layer, guard) = match &logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or(OsStr::new("lpf2-device.log"));

            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Sawtooth over the mode's raw range; array elements are phase-shifted
fn synthetic_sample(mode: &Mode, tick: u64) -> Sample {
    let ty = mode.format.data_type;
    let span = (mode.raw.max - mode.raw.min) as f64;

    let value_at = |offset: u64| {
        let step = (tick + offset) % SAWTOOTH_STEPS;
        let x = mode.raw.min as f64 + span * step as f64 / SAWTOOTH_STEPS as f64;
        Value::from_f64(ty, x)
    };

    match mode.format.sample_count {
        0 | 1 => Sample::Scalar(value_at(0)),
        n => Sample::Array(
            (0..n as u64)
                .map(|i| value_at(i * SAWTOOTH_STEPS / n as u64))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpf2::protocol::{FunctionMap, NumericType, ValueFormat, ValueRange};

    fn mode(data_type: NumericType, sample_count: u8) -> Mode {
        Mode {
            name: "TEST".to_string(),
            format: ValueFormat {
                sample_count,
                data_type,
                figures: 4,
                decimals: 0,
            },
            raw: ValueRange::new(0.0, 100.0),
            pct: ValueRange::new(0.0, 100.0),
            si: ValueRange::new(0.0, 100.0),
            units: String::new(),
            mapping: FunctionMap::default(),
            has_view: true,
        }
    }

    #[test]
    fn test_log_interval_constant() {
        assert_eq!(LOG_INTERVAL_SAMPLES, 500);
    }

    #[test]
    fn test_io_errors_stop_the_stream() {
        let broken = Lpf2Error::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"));
        assert!(is_link_failure(&broken));
        assert!(is_link_failure(&Lpf2Error::Serial("unplugged".to_string())));

        assert!(!is_link_failure(&Lpf2Error::EmptySample));
        assert!(!is_link_failure(&Lpf2Error::InvalidType("double".to_string())));
    }

    #[tokio::test]
    async fn test_dead_sink_reports_io_error() {
        use serial::port_trait::mocks::MockSerialPort;

        let port = MockSerialPort::new();
        port.set_write_error(std::io::ErrorKind::BrokenPipe);
        let m = mode(NumericType::UInt8, 1);
        let mut device = Lpf2Device::new(port, Default::default(), vec![m.clone()]).unwrap();

        let err = device.send_data(0, &synthetic_sample(&m, 0)).await.unwrap_err();
        assert!(is_link_failure(&err));
    }

    #[test]
    fn test_synthetic_scalar_follows_sawtooth() {
        let m = mode(NumericType::UInt8, 1);
        assert_eq!(synthetic_sample(&m, 0), Sample::Scalar(Value::UInt8(0)));
        assert_eq!(synthetic_sample(&m, 42), Sample::Scalar(Value::UInt8(42)));
        assert_eq!(synthetic_sample(&m, SAWTOOTH_STEPS), Sample::Scalar(Value::UInt8(0)));
    }

    #[test]
    fn test_synthetic_array_has_sample_count_elements() {
        let m = mode(NumericType::Float32, 4);
        match synthetic_sample(&m, 0) {
            Sample::Array(values) => {
                assert_eq!(values.len(), 4);
                assert_eq!(values[0], Value::Float32(0.0));
                assert_eq!(values[1], Value::Float32(25.0));
                assert!(values.iter().all(|v| v.numeric_type() == NumericType::Float32));
            }
            other => panic!("Expected array, got: {:?}", other),
        }
    }

    #[test]
    fn test_default_config_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = Config::load(path).unwrap();
        assert!(!config.modes.is_empty());
    }
}
