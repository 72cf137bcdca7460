//! Monitor configuration parameters
//!
//! All timing constants used by the core state machines.  Defaults match
//! the reference receiver build; values can be overridden from NVS.

use serde::{Deserialize, Serialize};

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Zone classification ---
    /// Time a reading must stay inside a zone band before it is confirmed (seconds)
    pub dwell_secs: u32,

    // --- Alarm escalation ---
    /// Delay before an acknowledged critical alarm sounds again (seconds)
    pub repeat_critical_secs: u32,
    /// Buzzer toggle period for the high alarm (milliseconds)
    pub high_toggle_ms: u32,
    /// Buzzer toggle period for the first critical alarm (milliseconds)
    pub critical_toggle_ms: u32,
    /// Buzzer toggle period for the repeated critical alarm (milliseconds)
    pub critical_repeat_toggle_ms: u32,
    /// Critical blink: red indicator on, display awake (milliseconds)
    pub blink_on_ms: u32,
    /// Critical blink: red indicator off, display in power-save (milliseconds)
    pub blink_off_ms: u32,

    // --- Buzzer feedback ---
    /// Click feedback beep length (milliseconds)
    pub short_beep_ms: u32,
    /// Long-press feedback beep length (milliseconds)
    pub long_beep_ms: u32,

    // --- Receiver ---
    /// Radio poll interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Consecutive missed polls before "no signal" is shown
    pub no_signal_misses: u32,
    /// Readings above this are implausible (°C)
    pub max_plausible_c: i16,

    // --- Telemetry ---
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            dwell_secs: 60,
            repeat_critical_secs: 300, // 5 min nag

            high_toggle_ms: 800,
            critical_toggle_ms: 300,
            critical_repeat_toggle_ms: 150,
            blink_on_ms: 300,
            blink_off_ms: 1000,

            short_beep_ms: 50,
            long_beep_ms: 150,

            poll_interval_ms: 1000, // 1 Hz
            no_signal_misses: 30,
            max_plausible_c: 200,

            telemetry_interval_secs: 60,
        }
    }
}

impl MonitorConfig {
    /// Dwell duration in milliseconds.
    pub fn dwell_ms(&self) -> u64 {
        u64::from(self.dwell_secs) * 1000
    }

    /// Critical repeat delay in milliseconds.
    pub fn repeat_critical_ms(&self) -> u64 {
        u64::from(self.repeat_critical_secs) * 1000
    }

    /// Range-check every field.  Used before persisting a config received
    /// from outside the core.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=3600).contains(&self.dwell_secs) {
            return Err("dwell_secs must be 1–3600");
        }
        if !(10..=86_400).contains(&self.repeat_critical_secs) {
            return Err("repeat_critical_secs must be 10–86400");
        }
        for period in [
            self.high_toggle_ms,
            self.critical_toggle_ms,
            self.critical_repeat_toggle_ms,
        ] {
            if !(50..=5000).contains(&period) {
                return Err("alarm toggle periods must be 50–5000 ms");
            }
        }
        if self.blink_on_ms == 0 || self.blink_off_ms == 0 {
            return Err("blink phases must be non-zero");
        }
        if self.short_beep_ms == 0 || self.long_beep_ms < self.short_beep_ms {
            return Err("long_beep_ms must be >= short_beep_ms > 0");
        }
        if !(100..=10_000).contains(&self.poll_interval_ms) {
            return Err("poll_interval_ms must be 100–10000");
        }
        if self.no_signal_misses == 0 {
            return Err("no_signal_misses must be non-zero");
        }
        if self.max_plausible_c <= 0 {
            return Err("max_plausible_c must be positive");
        }
        if !(5..=3600).contains(&self.telemetry_interval_secs) {
            return Err("telemetry_interval_secs must be 5–3600");
        }
        Ok(())
    }
}
