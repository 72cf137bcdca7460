//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device).  Telemetry goes out as a
//! single JSON line so a host script can scrape it from the console.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | encode failed: {}", e),
            },
            AppEvent::Started(page) => {
                info!("START | page={:?}", page);
            }
            AppEvent::PageChanged { from, to } => {
                info!("PAGE  | {:?} -> {:?}", from, to);
            }
            AppEvent::ZoneConfirmed { zone, celsius } => {
                info!("ZONE  | {} at {}\u{00b0}C", zone, celsius);
            }
            AppEvent::AlarmChanged { from, to } => {
                info!("ALARM | {:?} -> {:?}", from, to);
            }
            AppEvent::ThresholdsChanged(t) => {
                info!(
                    "THRSH | min={} normal={} high={} critical={}",
                    t.minimal, t.normal, t.high, t.critical
                );
            }
            AppEvent::ThresholdsSaved(_) => {
                info!("THRSH | saved");
            }
            AppEvent::SignalLost { misses } => {
                warn!("RADIO | signal lost after {} misses", misses);
            }
            AppEvent::SignalRestored => {
                info!("RADIO | signal restored");
            }
        }
    }
}
