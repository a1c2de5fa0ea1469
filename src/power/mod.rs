//! # Wake/Sleep Control
//!
//! Thin layer over the wake alarm and the low-power states of the attached
//! devices.
//!
//! This module handles:
//! - Signalling devices in and out of low-power state
//! - Arming the wake alarm and halting until it fires
//! - Alarm time-of-day arithmetic (seconds carry into minutes and hours)

use async_trait::async_trait;
use chrono::Timelike;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::gnss::fix::TimeOfDay;

/// A device with a low-power state
#[async_trait]
pub trait LowPowerDevice: Send {
    /// Leave low-power state
    async fn wake(&mut self) -> Result<()>;

    /// Enter low-power state
    async fn enter_low_power(&mut self) -> Result<()>;
}

/// Hardware wake alarm
///
/// The alarm carries no payload; control simply resumes after
/// `halt_until_alarm` returns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WakeAlarm: Send {
    /// Program the alarm `seconds` from now
    async fn arm(&mut self, seconds: u32) -> Result<()>;

    /// Halt until the armed alarm fires
    async fn halt_until_alarm(&mut self) -> Result<()>;
}

/// Time of day `seconds` after `now`, wrapping at midnight
///
/// # Examples
///
/// ```
/// use nbiot_tracker::gnss::fix::TimeOfDay;
/// use nbiot_tracker::power::alarm_time;
///
/// let alarm = alarm_time(TimeOfDay::new(23, 59, 50), 20);
/// assert_eq!(alarm, TimeOfDay::new(0, 0, 10));
/// ```
pub fn alarm_time(now: TimeOfDay, seconds: u32) -> TimeOfDay {
    let total_seconds = now.second as u64 + seconds as u64;
    let total_minutes = now.minute as u64 + total_seconds / 60;
    let total_hours = now.hour as u64 + total_minutes / 60;

    TimeOfDay::new(
        (total_hours % 24) as u8,
        (total_minutes % 60) as u8,
        (total_seconds % 60) as u8,
    )
}

/// Wake alarm backed by the tokio timer
///
/// Stands in for the RTC alarm on hosts without one; halting is a sleep until
/// the armed deadline.
#[derive(Debug, Default)]
pub struct TokioWakeAlarm {
    deadline: Option<Instant>,
}

impl TokioWakeAlarm {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WakeAlarm for TokioWakeAlarm {
    async fn arm(&mut self, seconds: u32) -> Result<()> {
        let now = chrono::Local::now();
        let wall = TimeOfDay::new(now.hour() as u8, now.minute() as u8, now.second() as u8);
        let alarm = alarm_time(wall, seconds);

        info!(
            "Wake alarm set for {:02}:{:02}:{:02} ({}s)",
            alarm.hour, alarm.minute, alarm.second, seconds
        );

        self.deadline = Some(Instant::now() + Duration::from_secs(seconds as u64));
        Ok(())
    }

    async fn halt_until_alarm(&mut self) -> Result<()> {
        match self.deadline.take() {
            Some(deadline) => {
                debug!("Halting until wake alarm");
                tokio::time::sleep_until(deadline).await;
                debug!("Wake alarm fired");
            }
            None => warn!("Halt requested with no alarm armed, resuming immediately"),
        }
        Ok(())
    }
}
