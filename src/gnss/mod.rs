//! # GNSS Module
//!
//! Satellite-fix acquisition from the multi-constellation receiver.
//!
//! This module handles:
//! - Capturing the receiver's once-per-second sentence burst
//! - Integrity (GGA + TXT present) and validity (RMC status `A`) checks
//! - Decoding RMC time, date and coordinates, then shifting to local time
//! - The bounded acquisition loop
//! - Receiver configuration commands and enable-line power control

pub mod acquire;
pub mod command;
pub mod fix;
pub mod sentence;

pub use acquire::{acquire_fix, AcquirePolicy, FixSource};
pub use fix::{CalendarDate, SatelliteFix, TimeOfDay, ZONE_OFFSET_HOURS};

use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, TrackerError};
use crate::power::LowPowerDevice;
use crate::serial::{ControlLine, SerialTransport};

/// Receive buffer capacity (one full sentence burst)
pub const RX_BUFFER_SIZE: usize = 1024;

/// Time the receiver needs to answer a batch of info queries
const INFO_SETTLE: Duration = Duration::from_millis(500);

/// Session with the GNSS receiver over its serial link
///
/// Owns the receive buffer and the last decoded fix; parsing reads the buffer
/// through `&self`, capture refills it through `&mut self`. Decoded fields
/// are kept in UTC and only the returned copy is zone-shifted.
pub struct GnssSession<T: SerialTransport> {
    port: T,
    rx_buffer: [u8; RX_BUFFER_SIZE],
    rx_len: usize,
    utc: SatelliteFix,
    time_known: bool,
    date_known: bool,
    fix: SatelliteFix,
    read_timeout: Duration,
    zone_offset_hours: u8,
}

impl<T: SerialTransport> GnssSession<T> {
    /// Create a session over `port`
    ///
    /// # Arguments
    ///
    /// * `port` - Serial link to the receiver
    /// * `read_timeout` - Upper bound of one capture
    pub fn new(port: T, read_timeout: Duration) -> Self {
        Self {
            port,
            rx_buffer: [0; RX_BUFFER_SIZE],
            rx_len: 0,
            utc: SatelliteFix::default(),
            time_known: false,
            date_known: false,
            fix: SatelliteFix::default(),
            read_timeout,
            zone_offset_hours: ZONE_OFFSET_HOURS,
        }
    }

    /// Replace the receive buffer with the next sentence burst
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of bytes captured
    pub async fn capture(&mut self) -> Result<usize> {
        self.rx_len = 0;
        let n = self
            .port
            .receive_until_idle(&mut self.rx_buffer, self.read_timeout)
            .await
            .map_err(|e| TrackerError::Serial(format!("GNSS read failed: {}", e)))?;
        self.rx_len = n;
        debug!("Captured {} bytes of receiver output", n);
        Ok(n)
    }

    /// Latest receiver output as text
    pub fn buffer_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.rx_buffer[..self.rx_len])
    }

    /// Both required sentence markers are present in the buffer
    pub fn check_integrity(&self) -> bool {
        sentence::check_integrity(&self.buffer_text())
    }

    /// The RMC sentence is present and its status is `A`
    pub fn check_validity(&self) -> bool {
        sentence::check_validity(&self.buffer_text())
    }

    /// Decode the buffered RMC sentence
    ///
    /// Fields missing from the sentence keep their previous UTC values, and
    /// the zone shift is applied to a copy, so a stale date is never carried
    /// twice. Until a time and a date have both been decoded the fix is
    /// marked invalid. Without an RMC sentence the previous fix is returned
    /// unchanged.
    pub fn parse_fix(&mut self) -> SatelliteFix {
        let text = String::from_utf8_lossy(&self.rx_buffer[..self.rx_len]);

        if let Some(rmc) = sentence::find_sentence(&text, sentence::RMC_MARKER) {
            let decoded = sentence::parse_rmc(rmc, &mut self.utc);
            self.time_known |= decoded.time;
            self.date_known |= decoded.date;

            let mut local = self.utc;
            if self.time_known && self.date_known {
                local.shift_zone(self.zone_offset_hours);
            } else {
                debug!("RMC without a known time and date, fix unusable");
                local.valid = false;
            }
            self.fix = local;
        } else {
            debug!("No RMC sentence in receiver output");
        }

        self.fix
    }

    /// Last decoded fix
    pub fn fix(&self) -> &SatelliteFix {
        &self.fix
    }

    /// Send the output-rate and constellation configuration
    pub async fn configure(&mut self) -> Result<()> {
        for body in [command::SET_OUTPUT_RATE_1HZ, command::SET_MODE_GPS_BDS] {
            self.send_command(body).await?;
        }
        Ok(())
    }

    /// Query firmware and hardware identity
    ///
    /// # Returns
    ///
    /// * `Result<String>` - Raw receiver output following the queries
    pub async fn query_info(&mut self) -> Result<String> {
        for body in command::INFO_QUERIES {
            self.send_command(body).await?;
        }
        tokio::time::sleep(INFO_SETTLE).await;
        self.capture().await?;

        let info = self.buffer_text().into_owned();
        info!("Receiver info:\n{}", info);
        Ok(info)
    }

    async fn send_command(&mut self, body: &str) -> Result<()> {
        let framed = command::frame_command(body);
        debug!("GNSS <- {}", framed.trim_end());
        self.port
            .send(framed.as_bytes())
            .await
            .map_err(|e| TrackerError::Serial(format!("GNSS write failed: {}", e)))
    }
}

#[async_trait]
impl<T: SerialTransport> FixSource for GnssSession<T> {
    async fn refresh(&mut self) -> Result<()> {
        self.capture().await.map(|_| ())
    }

    fn check_integrity(&self) -> bool {
        GnssSession::check_integrity(self)
    }

    fn check_validity(&self) -> bool {
        GnssSession::check_validity(self)
    }

    fn parse_fix(&mut self) -> SatelliteFix {
        GnssSession::parse_fix(self)
    }
}

#[async_trait]
impl<T: SerialTransport> LowPowerDevice for GnssSession<T> {
    /// Raise the enable line and reapply the configuration
    async fn wake(&mut self) -> Result<()> {
        self.port.set_line(ControlLine::Dtr, true)?;
        self.configure().await?;
        debug!("GNSS receiver awake");
        Ok(())
    }

    /// Drop the enable line
    async fn enter_low_power(&mut self) -> Result<()> {
        self.port.set_line(ControlLine::Dtr, false)?;
        debug!("GNSS receiver powered down");
        Ok(())
    }
}
