//! ThermoRx receiver firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alarm;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod severity;
pub mod thresholds;
pub mod zone;

pub mod pins;

// Hardware-facing modules.  Their ESP-IDF parts are cfg-gated inside, the
// rest is generic over embedded-hal and runs on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
