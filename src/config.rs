//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, TrackerError};
use crate::gnss::AcquirePolicy;
use crate::modem::TransmitPolicy;
use crate::serial::DEFAULT_BAUD_RATE;
use crate::steps::{
    ConfiguredStepCounter, IioStepCounter, RegisterStepCounter, DEFAULT_IIO_STEPS_PATH,
};
use crate::telemetry::DeviceId;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub power: PowerConfig,
    #[serde(default)]
    pub gnss: GnssConfig,
    #[serde(default)]
    pub modem: ModemConfig,
    #[serde(default)]
    pub step_counter: StepCounterConfig,
}

/// Device identity
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_device_id")]
    pub id: String,
}

/// Telemetry destination
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Duty-cycle timing
#[derive(Debug, Deserialize, Clone)]
pub struct PowerConfig {
    #[serde(default = "default_sleep_seconds")]
    pub sleep_seconds: u32,
}

/// GNSS receiver link and acquisition budget
#[derive(Debug, Deserialize, Clone)]
pub struct GnssConfig {
    #[serde(default = "default_gnss_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_gnss_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_idle_gap_ms")]
    pub idle_gap_ms: u64,

    #[serde(default = "default_acquire_attempts")]
    pub acquire_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Modem link and socket lifecycle budget
#[derive(Debug, Deserialize, Clone)]
pub struct ModemConfig {
    #[serde(default = "default_modem_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_modem_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_idle_gap_ms")]
    pub idle_gap_ms: u64,

    #[serde(default = "default_sequence")]
    pub sequence: u8,

    #[serde(default = "default_step_attempts")]
    pub step_attempts: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_send_settle_ms")]
    pub send_settle_ms: u64,

    #[serde(default = "default_resend_settle_ms")]
    pub resend_settle_ms: u64,
}

/// How the pedometer exposes its count
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepCounterKind {
    /// Decimal IIO attribute
    #[default]
    Iio,
    /// Raw register map, count in three little-endian bytes
    Registers,
}

/// Pedometer source
#[derive(Debug, Deserialize, Clone)]
pub struct StepCounterConfig {
    #[serde(default)]
    pub kind: StepCounterKind,

    #[serde(default = "default_step_counter_path")]
    pub path: String,

    /// Offset of the low count byte, `registers` only
    #[serde(default)]
    pub register_offset: u64,
}

// Default value functions
fn default_device_id() -> String { "tracker-0001".to_string() }

fn default_server_host() -> String { "112.125.89.8".to_string() }
fn default_server_port() -> u16 { 43458 }

fn default_sleep_seconds() -> u32 { 20 }

fn default_gnss_port() -> String { "/dev/ttyS1".to_string() }
fn default_modem_port() -> String { "/dev/ttyS2".to_string() }
fn default_baud_rate() -> u32 { DEFAULT_BAUD_RATE }
fn default_gnss_timeout_ms() -> u64 { 2000 }
fn default_modem_timeout_ms() -> u64 { 2000 }
fn default_idle_gap_ms() -> u64 { 50 }
fn default_acquire_attempts() -> u32 { 10 }
fn default_retry_delay_ms() -> u64 { 1000 }

fn default_sequence() -> u8 { 5 }
fn default_step_attempts() -> u32 { 10 }
fn default_backoff_ms() -> u64 { 1000 }
fn default_send_settle_ms() -> u64 { 5000 }
fn default_resend_settle_ms() -> u64 { 10000 }

fn default_step_counter_path() -> String { DEFAULT_IIO_STEPS_PATH.to_string() }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { id: default_device_id() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self { sleep_seconds: default_sleep_seconds() }
    }
}

impl Default for GnssConfig {
    fn default() -> Self {
        Self {
            port: default_gnss_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_gnss_timeout_ms(),
            idle_gap_ms: default_idle_gap_ms(),
            acquire_attempts: default_acquire_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            port: default_modem_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_modem_timeout_ms(),
            idle_gap_ms: default_idle_gap_ms(),
            sequence: default_sequence(),
            step_attempts: default_step_attempts(),
            backoff_ms: default_backoff_ms(),
            send_settle_ms: default_send_settle_ms(),
            resend_settle_ms: default_resend_settle_ms(),
        }
    }
}

impl Default for StepCounterConfig {
    fn default() -> Self {
        Self {
            kind: StepCounterKind::default(),
            path: default_step_counter_path(),
            register_offset: 0,
        }
    }
}

impl GnssConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn idle_gap(&self) -> Duration {
        Duration::from_millis(self.idle_gap_ms)
    }

    pub fn acquire_policy(&self) -> AcquirePolicy {
        AcquirePolicy {
            max_attempts: self.acquire_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl ModemConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn idle_gap(&self) -> Duration {
        Duration::from_millis(self.idle_gap_ms)
    }

    pub fn transmit_policy(&self) -> TransmitPolicy {
        TransmitPolicy {
            step_attempts: self.step_attempts,
            backoff: Duration::from_millis(self.backoff_ms),
            send_settle: Duration::from_millis(self.send_settle_ms),
            resend_settle: Duration::from_millis(self.resend_settle_ms),
        }
    }
}

impl StepCounterConfig {
    pub fn counter(&self) -> ConfiguredStepCounter {
        match self.kind {
            StepCounterKind::Iio => ConfiguredStepCounter::Iio(IioStepCounter::new(&self.path)),
            StepCounterKind::Registers => ConfiguredStepCounter::Registers(
                RegisterStepCounter::new(&self.path, self.register_offset),
            ),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> TrackerError {
    TrackerError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nbiot_tracker::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validated device identifier
    pub fn device_id(&self) -> Result<DeviceId> {
        DeviceId::new(&self.device.id).map_err(|e| invalid(format!("device id: {}", e)))
    }

    /// Check every value is in its valid range
    pub fn validate(&self) -> Result<()> {
        self.device_id()?;

        if self.server.host.is_empty() {
            return Err(invalid("server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(invalid("server port must be greater than 0"));
        }

        if self.power.sleep_seconds == 0 {
            return Err(invalid("sleep_seconds must be greater than 0"));
        }

        for (name, port, baud_rate, timeout_ms, idle_gap_ms) in [
            (
                "gnss",
                &self.gnss.port,
                self.gnss.baud_rate,
                self.gnss.timeout_ms,
                self.gnss.idle_gap_ms,
            ),
            (
                "modem",
                &self.modem.port,
                self.modem.baud_rate,
                self.modem.timeout_ms,
                self.modem.idle_gap_ms,
            ),
        ] {
            if port.is_empty() {
                return Err(invalid(format!("{} port cannot be empty", name)));
            }
            if baud_rate == 0 {
                return Err(invalid(format!("{} baud_rate must be greater than 0", name)));
            }
            if timeout_ms == 0 || timeout_ms > 60000 {
                return Err(invalid(format!(
                    "{} timeout_ms must be between 1 and 60000",
                    name
                )));
            }
            if idle_gap_ms == 0 || idle_gap_ms > timeout_ms {
                return Err(invalid(format!(
                    "{} idle_gap_ms must be between 1 and timeout_ms",
                    name
                )));
            }
        }

        if self.gnss.acquire_attempts == 0 {
            return Err(invalid("acquire_attempts must be greater than 0"));
        }

        if self.modem.sequence == 0 {
            return Err(invalid("sequence must be between 1 and 255"));
        }

        if self.step_counter.path.is_empty() {
            return Err(invalid("step_counter path cannot be empty"));
        }

        Ok(())
    }
}
