//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, JSON line, etc.).

use serde::Serialize;

use crate::alarm::AlarmPhase;
use crate::fsm::PageId;
use crate::severity::Rgb;
use crate::thresholds::Thresholds;
use crate::zone::Zone;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries the initial page).
    Started(PageId),

    /// The page FSM moved.
    PageChanged { from: PageId, to: PageId },

    /// The classifier latched a new zone.
    ZoneConfirmed { zone: Zone, celsius: i16 },

    /// The alarm escalator changed phase.
    AlarmChanged { from: AlarmPhase, to: AlarmPhase },

    /// An editor page or external command changed the thresholds.
    ThresholdsChanged(Thresholds),

    /// Thresholds were written to persistent storage.
    ThresholdsSaved(Thresholds),

    /// Consecutive radio misses reached the no-signal limit.
    SignalLost { misses: u32 },

    /// A packet arrived after the link was reported lost.
    SignalRestored,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub uptime_ms: u64,
    pub page: PageId,
    /// Latest plausible reading.
    pub celsius: Option<i16>,
    pub zone: Option<Zone>,
    pub alarm: AlarmPhase,
    pub rgb: Option<Rgb>,
    pub radio_misses: u32,
    pub thresholds: Thresholds,
}
