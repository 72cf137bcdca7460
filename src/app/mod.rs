//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the receiver's runtime rules: page navigation,
//! zone confirmation, alarm escalation and the severity indicator.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
