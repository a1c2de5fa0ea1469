//! # Fix Acquisition Loop
//!
//! Bounded retry around the integrity and validity checks, so a cold-starting
//! receiver (or one with no sky view) cannot block the duty cycle forever.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::fix::SatelliteFix;
use crate::error::Result;

/// Default number of acquisition attempts
pub const DEFAULT_ACQUIRE_ATTEMPTS: u32 = 10;

/// Default wait after a failed attempt
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Source of satellite fixes the acquisition loop can poll
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FixSource: Send {
    /// Capture the latest receiver output
    async fn refresh(&mut self) -> Result<()>;

    /// Both required sentence markers are present
    fn check_integrity(&self) -> bool;

    /// The RMC sentence is present and flagged valid
    fn check_validity(&self) -> bool;

    /// Decode the RMC sentence into a zone-shifted fix
    fn parse_fix(&mut self) -> SatelliteFix;
}

/// Retry bounds of the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquirePolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for AcquirePolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ACQUIRE_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Poll `source` until it holds a complete and valid fix
///
/// Each attempt refreshes the source, checks integrity and, only when that
/// passes, validity. A failed attempt waits `retry_delay` before the next one.
///
/// # Returns
///
/// * `bool` - true as soon as one attempt passes both checks, false after
///   `max_attempts` failures
pub async fn acquire_fix<S: FixSource + ?Sized>(source: &mut S, policy: &AcquirePolicy) -> bool {
    for attempt in 1..=policy.max_attempts {
        if let Err(e) = source.refresh().await {
            warn!("Failed to read receiver output: {}", e);
        }

        if !source.check_integrity() {
            debug!("Incomplete receiver output (attempt {}/{})", attempt, policy.max_attempts);
        } else if !source.check_validity() {
            debug!("No valid fix yet (attempt {}/{})", attempt, policy.max_attempts);
        } else {
            info!("Valid fix acquired on attempt {}", attempt);
            return true;
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    warn!("Failed to get a valid fix after {} attempts", policy.max_attempts);
    false
}
