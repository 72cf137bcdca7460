//! Inbound commands to the application service.
//!
//! These represent actions requested from outside the tick loop (serial
//! console, provisioning, tests) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::MonitorConfig;
use crate::fsm::PageId;
use crate::thresholds::Thresholds;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Replace the thresholds (rejected unless strictly ordered).
    SetThresholds(Thresholds),

    /// Hot-reload the monitor configuration (rejected if invalid).
    UpdateConfig(MonitorConfig),

    /// Persist the current thresholds immediately, even if unchanged.
    SaveThresholds,

    /// Silence the sounding alarm as if a button had been clicked.
    Acknowledge,

    /// Jump to a page (debug / testing only).
    ShowPage(PageId),
}
