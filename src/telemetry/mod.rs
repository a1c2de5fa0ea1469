//! # Telemetry Module
//!
//! Builds the per-cycle telemetry record and its text payload.
//!
//! This module handles:
//! - The fixed-length device identifier
//! - Combining a local-time fix with the step count (24-bit wrap)
//! - JSON encoding of the record
//! - The bounded payload handed to the modem, and the no-fix fallback

use serde::Serialize;
use std::fmt;

use crate::error::{Result, TrackerError};
use crate::gnss::fix::{CalendarDate, SatelliteFix, TimeOfDay, HEMISPHERE_NEGATIVE};

/// Maximum length of the device identifier in bytes
pub const DEVICE_ID_MAX_LEN: usize = 32;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_LEN: usize = 512;

/// Payload sent when no valid fix could be acquired
pub const FALLBACK_PAYLOAD: &str = "No valid GPS data available";

/// The step counter is 24 bits wide
pub const STEP_COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Reduce a raw count to the counter's 24-bit range
pub fn wrap_steps(raw: u32) -> u32 {
    raw & STEP_COUNTER_MASK
}

/// Device identifier: 1 to 32 printable ASCII bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(String);

impl DeviceId {
    /// Validate and wrap an identifier
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Payload` if the identifier is empty, longer than
    /// 32 bytes, or contains non-printable / non-ASCII characters
    pub fn new(id: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(TrackerError::Payload("device id cannot be empty".to_string()));
        }
        if id.len() > DEVICE_ID_MAX_LEN {
            return Err(TrackerError::Payload(format!(
                "device id is {} bytes, maximum is {}",
                id.len(),
                DEVICE_ID_MAX_LEN
            )));
        }
        if !id.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(TrackerError::Payload(
                "device id must be printable ASCII without spaces".to_string(),
            ));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounded text payload handed to the modem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryPayload(Vec<u8>);

impl TelemetryPayload {
    /// Wrap `bytes`, failing if they exceed `MAX_PAYLOAD_LEN`
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() > MAX_PAYLOAD_LEN {
            return Err(TrackerError::Payload(format!(
                "payload is {} bytes, maximum is {}",
                bytes.len(),
                MAX_PAYLOAD_LEN
            )));
        }
        Ok(Self(bytes))
    }

    /// The fixed no-fix payload
    pub fn fallback() -> Self {
        Self(FALLBACK_PAYLOAD.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One cycle's telemetry
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub device_id: DeviceId,
    /// Local (zone-shifted) time of the fix
    pub time: TimeOfDay,
    pub date: CalendarDate,
    pub latitude: f64,
    pub latitude_hemisphere: u8,
    pub longitude: f64,
    pub longitude_hemisphere: u8,
    /// Step count, wrapped to 24 bits
    pub steps: u32,
}

/// Wire layout of the record
#[derive(Serialize)]
struct RecordJson<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    datetime: String,
    latitude: f64,
    lat_dir: &'static str,
    longitude: f64,
    lon_dir: &'static str,
    steps: u32,
}

impl TelemetryRecord {
    /// Combine a zone-shifted fix with a step count
    pub fn new(device_id: DeviceId, fix: &SatelliteFix, steps: u32) -> Self {
        Self {
            device_id,
            time: fix.time,
            date: fix.date,
            latitude: fix.latitude,
            latitude_hemisphere: fix.latitude_hemisphere,
            longitude: fix.longitude,
            longitude_hemisphere: fix.longitude_hemisphere,
            steps: wrap_steps(steps),
        }
    }

    /// Timestamp as `YYYY-M-D HH:MM:SS`
    pub fn datetime(&self) -> String {
        format!(
            "{}-{}-{} {:02}:{:02}:{:02}",
            2000 + self.date.year as u16,
            self.date.month,
            self.date.day,
            self.time.hour,
            self.time.minute,
            self.time.second
        )
    }

    /// Encode the record as a compact JSON payload
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the result exceeds
    /// `MAX_PAYLOAD_LEN`
    pub fn to_payload(&self) -> Result<TelemetryPayload> {
        let json = RecordJson {
            id: self.device_id.as_str(),
            datetime: self.datetime(),
            latitude: self.latitude,
            lat_dir: if self.latitude_hemisphere == HEMISPHERE_NEGATIVE { "S" } else { "N" },
            longitude: self.longitude,
            lon_dir: if self.longitude_hemisphere == HEMISPHERE_NEGATIVE { "W" } else { "E" },
            steps: self.steps,
        };

        TelemetryPayload::new(serde_json::to_vec(&json)?)
    }
}
