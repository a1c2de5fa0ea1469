//! # Serial Communication Module
//!
//! Handles the two serial links of the tracker board.
//!
//! This module handles:
//! - Opening the GNSS receiver and NB-IoT modem ports (8N1, no flow control)
//! - Timed reads, including idle-terminated reads for variable-length replies
//! - Driving the DTR/RTS lines used as device enable and wake pins

pub mod port_trait;

pub use port_trait::{ControlLine, SerialTransport, TokioSerialPort};

use crate::error::{Result, TrackerError};
use std::time::Duration;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

/// Default baud rate of both attached devices
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Open a serial link with the tracker's line settings
///
/// # Arguments
///
/// * `path` - Device path (e.g., "/dev/ttyUSB0")
/// * `baud_rate` - Line speed
/// * `idle_gap` - Silence that terminates an idle-terminated read
///
/// # Errors
///
/// Returns `TrackerError::Serial` if the port cannot be opened
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use nbiot_tracker::serial::open_port;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let port = open_port("/dev/ttyUSB1", 9600, Duration::from_millis(20))?;
///     Ok(())
/// }
/// ```
pub fn open_port(path: &str, baud_rate: u32, idle_gap: Duration) -> Result<TokioSerialPort> {
    debug!("Opening serial port {} at {} baud", path, baud_rate);

    let stream = tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(|e| TrackerError::Serial(format!("Failed to open {}: {}", path, e)))?;

    info!("Opened serial port {}", path);
    Ok(TokioSerialPort::new(stream, idle_gap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_baud_rate() {
        assert_eq!(DEFAULT_BAUD_RATE, 9600);
    }

    #[tokio::test]
    async fn test_open_port_with_invalid_path_returns_error() {
        let result = open_port(
            "/dev/nonexistent_serial_device_12345",
            DEFAULT_BAUD_RATE,
            Duration::from_millis(20),
        );

        match result {
            Err(TrackerError::Serial(msg)) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            Err(other) => panic!("Expected Serial error, got: {:?}", other),
            Ok(_) => panic!("Opening a nonexistent device should fail"),
        }
    }

    // Only runs with a receiver attached
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_open_with_real_hardware() {
        match open_port("/dev/ttyUSB0", DEFAULT_BAUD_RATE, Duration::from_millis(20)) {
            Ok(_) => println!("Opened /dev/ttyUSB0"),
            Err(e) => println!("No hardware detected (this is OK for CI/CD): {}", e),
        }
    }
}
