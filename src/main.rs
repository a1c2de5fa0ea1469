//! # NB-IoT Tracker
//!
//! Wakes on a timer, takes a GNSS fix and the pedometer count, and reports
//! them to a remote server over an NB-IoT modem before going back to sleep.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber (non-blocking stdout)
//!    - Load configuration (first CLI argument, default `config/default.toml`)
//!    - Open both serial links, enable modem echo, log device identities
//!
//! 2. **Main Loop**
//!    - Run one duty cycle (wake, acquire, transmit)
//!    - Sleep until the wake alarm
//!    - Ctrl+C is honored during the sleep phase
//!
//! # Examples
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- config/default.toml
//! ```

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nbiot_tracker::config::Config;
use nbiot_tracker::cycle::{CycleSettings, Orchestrator};
use nbiot_tracker::gnss::GnssSession;
use nbiot_tracker::modem::AtEngine;
use nbiot_tracker::power::{LowPowerDevice, TokioWakeAlarm};
use nbiot_tracker::serial::open_port;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();

    info!("NB-IoT Tracker v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    let device_id = config.device_id()?;
    info!("Device {} reporting to {}:{}", device_id, config.server.host, config.server.port);

    let gnss_port = open_port(&config.gnss.port, config.gnss.baud_rate, config.gnss.idle_gap())?;
    let modem_port = open_port(
        &config.modem.port,
        config.modem.baud_rate,
        config.modem.idle_gap(),
    )?;

    let mut gnss = GnssSession::new(gnss_port, config.gnss.timeout());
    let mut modem = AtEngine::new(
        modem_port,
        config.modem.timeout(),
        config.server.host.clone(),
        config.server.port,
        config.modem.sequence,
    )
    .with_policy(config.modem.transmit_policy());

    if let Err(e) = gnss.wake().await {
        warn!("GNSS receiver setup failed: {}", e);
    } else if let Err(e) = gnss.query_info().await {
        warn!("GNSS info query failed: {}", e);
    }

    if let Err(e) = modem.initialize().await {
        warn!("Modem setup failed: {}", e);
    }
    if let Err(e) = modem.identify().await {
        warn!("Modem identity query failed: {}", e);
    }

    let settings = CycleSettings {
        device_id,
        acquire_policy: config.gnss.acquire_policy(),
        sleep_seconds: config.power.sleep_seconds,
    };
    let mut orchestrator = Orchestrator::new(
        gnss,
        modem,
        config.step_counter.counter(),
        TokioWakeAlarm::new(),
        settings,
    );

    info!("Starting duty cycle, {}s between reports", config.power.sleep_seconds);
    info!("Press Ctrl+C to exit");

    let mut cycles: u64 = 0;
    loop {
        let report = orchestrator.run_cycle().await;
        cycles += 1;
        info!(
            "Cycle {} complete ({})",
            cycles,
            if report.all_succeeded() { "delivered" } else { "degraded" }
        );

        tokio::select! {
            _ = orchestrator.sleep() => {}

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total cycles run: {}", cycles);
                break;
            }
        }
    }

    Ok(())
}
