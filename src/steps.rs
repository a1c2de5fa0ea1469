//! # Step Counter
//!
//! The pedometer is an external collaborator behind the `StepCounter` trait.
//! On Linux hosts the counter is exposed either by the IIO subsystem as an
//! integer attribute (`in_steps_input`), or as the raw register map of the
//! sensor where the count sits in three little-endian bytes.

use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::telemetry::wrap_steps;

/// Default IIO attribute holding the step count
pub const DEFAULT_IIO_STEPS_PATH: &str = "/sys/bus/iio/devices/iio:device0/in_steps_input";

/// Single bounded read of the current step count
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StepCounter: Send {
    async fn read_steps(&mut self) -> Result<u32>;
}

/// Assemble the counter's little-endian register triple (low, mid, high)
pub fn steps_from_registers(registers: [u8; 3]) -> u32 {
    u32::from_le_bytes([registers[0], registers[1], registers[2], 0])
}

/// Step counter read from a Linux IIO attribute
#[derive(Debug, Clone)]
pub struct IioStepCounter {
    path: PathBuf,
}

impl IioStepCounter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl StepCounter for IioStepCounter {
    async fn read_steps(&mut self) -> Result<u32> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let raw: u64 = text.trim().parse().map_err(|e| {
            TrackerError::StepCounter(format!(
                "invalid step count {:?} in {}: {}",
                text.trim(),
                self.path.display(),
                e
            ))
        })?;

        let steps = wrap_steps(raw as u32);
        debug!("Current step count: {}", steps);
        Ok(steps)
    }
}

/// Step counter read from the sensor's register map
///
/// `offset` is the position of the low byte of the count.
#[derive(Debug, Clone)]
pub struct RegisterStepCounter {
    path: PathBuf,
    offset: u64,
}

impl RegisterStepCounter {
    pub fn new<P: AsRef<Path>>(path: P, offset: u64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            offset,
        }
    }
}

#[async_trait]
impl StepCounter for RegisterStepCounter {
    async fn read_steps(&mut self) -> Result<u32> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.offset)).await?;

        let mut registers = [0u8; 3];
        file.read_exact(&mut registers).await.map_err(|e| {
            TrackerError::StepCounter(format!(
                "short register read at {:#x} in {}: {}",
                self.offset,
                self.path.display(),
                e
            ))
        })?;

        let steps = steps_from_registers(registers);
        debug!("Current step count: {}", steps);
        Ok(steps)
    }
}

/// Whichever counter the configuration selected
#[derive(Debug, Clone)]
pub enum ConfiguredStepCounter {
    Iio(IioStepCounter),
    Registers(RegisterStepCounter),
}

#[async_trait]
impl StepCounter for ConfiguredStepCounter {
    async fn read_steps(&mut self) -> Result<u32> {
        match self {
            Self::Iio(counter) => counter.read_steps().await,
            Self::Registers(counter) => counter.read_steps().await,
        }
    }
}
