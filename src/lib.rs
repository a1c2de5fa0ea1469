//! # NB-IoT Tracker Library
//!
//! Duty-cycled GNSS and step-count tracker that reports over an NB-IoT modem.
//!
//! This library provides the telemetry duty-cycle engine: fix acquisition
//! from the GNSS receiver, the AT-command socket pipeline of the cellular
//! modem, and the orchestrator that sequences wake, acquire, transmit and
//! sleep.

pub mod config;
pub mod cycle;
pub mod error;
pub mod gnss;
pub mod modem;
pub mod power;
pub mod serial;
pub mod steps;
pub mod telemetry;
