//! # Duty-Cycle Orchestrator
//!
//! Sequences one telemetry cycle: wake the devices, acquire a fix, read the
//! step counter, transmit, then sleep until the wake alarm.
//!
//! No step aborts a cycle. Failures degrade the payload (fallback text,
//! zero steps) or are logged and skipped.

use tracing::{debug, error, info, warn};

use crate::gnss::{acquire_fix, AcquirePolicy, FixSource};
use crate::modem::{AtEngine, LifecycleReport, StepOutcome};
use crate::power::{LowPowerDevice, WakeAlarm};
use crate::serial::SerialTransport;
use crate::steps::StepCounter;
use crate::telemetry::{DeviceId, TelemetryPayload, TelemetryRecord};

/// Phase of the duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyCycleState {
    Sleeping,
    Waking,
    Acquiring,
    Transmitting,
}

/// Per-device settings of the cycle
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub device_id: DeviceId,
    pub acquire_policy: AcquirePolicy,
    /// Seconds between the end of one cycle and the next wake
    pub sleep_seconds: u32,
}

/// Runs the wake, acquire, transmit, sleep sequence
pub struct Orchestrator<G, T, S, A>
where
    G: FixSource + LowPowerDevice,
    T: SerialTransport,
    S: StepCounter,
    A: WakeAlarm,
{
    gnss: G,
    modem: AtEngine<T>,
    step_counter: S,
    alarm: A,
    settings: CycleSettings,
    state: DutyCycleState,
}

impl<G, T, S, A> Orchestrator<G, T, S, A>
where
    G: FixSource + LowPowerDevice,
    T: SerialTransport,
    S: StepCounter,
    A: WakeAlarm,
{
    pub fn new(gnss: G, modem: AtEngine<T>, step_counter: S, alarm: A, settings: CycleSettings) -> Self {
        Self {
            gnss,
            modem,
            step_counter,
            alarm,
            settings,
            state: DutyCycleState::Sleeping,
        }
    }

    pub fn state(&self) -> DutyCycleState {
        self.state
    }

    fn enter(&mut self, state: DutyCycleState) {
        debug!("Duty cycle: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Wake, acquire and transmit once
    ///
    /// # Returns
    ///
    /// * `LifecycleReport` - Per-step outcome of the transmission
    pub async fn run_cycle(&mut self) -> LifecycleReport {
        self.enter(DutyCycleState::Waking);
        self.wake_devices().await;

        self.enter(DutyCycleState::Acquiring);
        let payload = self.acquire_payload().await;

        self.enter(DutyCycleState::Transmitting);
        info!("Transmitting {} byte payload", payload.len());
        let report = self.modem.send_payload(payload.as_bytes()).await;
        log_report(&report);

        report
    }

    /// Arm the alarm, power down both devices and halt until it fires
    pub async fn sleep(&mut self) {
        self.enter(DutyCycleState::Sleeping);

        if let Err(e) = self.alarm.arm(self.settings.sleep_seconds).await {
            error!("Failed to arm wake alarm: {}", e);
        }
        if let Err(e) = self.gnss.enter_low_power().await {
            warn!("GNSS receiver did not enter low power: {}", e);
        }
        if let Err(e) = self.modem.enter_low_power().await {
            warn!("Modem did not enter low power: {}", e);
        }
        if let Err(e) = self.alarm.halt_until_alarm().await {
            error!("Halt interrupted: {}", e);
        }
    }

    /// One full cycle followed by the sleep phase
    pub async fn run_once(&mut self) -> LifecycleReport {
        let report = self.run_cycle().await;
        self.sleep().await;
        report
    }

    async fn wake_devices(&mut self) {
        if let Err(e) = self.gnss.wake().await {
            warn!("GNSS receiver did not wake: {}", e);
        }
        if let Err(e) = self.modem.wake().await {
            warn!("Modem did not wake: {}", e);
        }
    }

    /// Payload for this cycle: the encoded record, or the fallback text
    async fn acquire_payload(&mut self) -> TelemetryPayload {
        if !acquire_fix(&mut self.gnss, &self.settings.acquire_policy).await {
            warn!("No valid fix this cycle, sending fallback payload");
            return TelemetryPayload::fallback();
        }

        let fix = self.gnss.parse_fix();
        if !fix.valid {
            warn!("Fix has no usable date or time, sending fallback payload");
            return TelemetryPayload::fallback();
        }

        let steps = match self.step_counter.read_steps().await {
            Ok(steps) => steps,
            Err(e) => {
                warn!("Step counter read failed, reporting 0 steps: {}", e);
                0
            }
        };

        let record = TelemetryRecord::new(self.settings.device_id.clone(), &fix, steps);
        match record.to_payload() {
            Ok(payload) => {
                debug!("Record for {}: {} steps", record.datetime(), record.steps);
                payload
            }
            Err(e) => {
                warn!("Failed to encode record, sending fallback payload: {}", e);
                TelemetryPayload::fallback()
            }
        }
    }
}

fn log_report(report: &LifecycleReport) {
    if report.all_succeeded() {
        info!("Payload delivered on socket {}", report.socket);
        return;
    }

    for (step, outcome) in [
        ("attach", report.attach),
        ("create", report.create),
        ("connect", report.connect),
        ("send", report.send),
        ("close", report.close),
    ] {
        match outcome {
            StepOutcome::Succeeded => {}
            StepOutcome::ExhaustedRetries => warn!("Transmit step {} did not succeed", step),
        }
    }
}
