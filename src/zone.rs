//! Temperature zone classifier.
//!
//! Runs every main-page tick **before** the alarm escalator.  Each zone
//! band has its own dwell timer; a band is only confirmed once the reading
//! has stayed inside it for the configured dwell time without interruption.
//!
//! ## Bands
//!
//! | Zone     | In band when                |
//! |----------|-----------------------------|
//! | Minimum  | `t <= minimal`              |
//! | Normal   | `minimal < t < high`        |
//! | High     | `high <= t < critical`      |
//! | Critical | `t >= critical`             |
//!
//! The bands are disjoint, so at most one dwell timer can be running at a
//! time.  The `normal` threshold is not a band edge: it only shapes the
//! severity colour ramp.
//!
//! ## Dwell lifecycle
//!
//! 1. Reading leaves the band → the timer resets immediately.
//! 2. Reading enters the band with no timer running → timer starts at `now`.
//! 3. Timer running and `now - start >= dwell` → band confirmed; the
//!    classifier latches it as the current zone and keeps reporting it
//!    every tick for as long as the reading stays in the band.
//!
//! Leaving and re-entering restarts the dwell from zero.

use core::fmt;

use log::info;
use serde::Serialize;

use crate::thresholds::Thresholds;

/// Severity zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Zone {
    Minimum = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Minimum, Zone::Normal, Zone::High, Zone::Critical];

    /// Whether `temp` falls inside this zone's band.
    pub fn contains(self, temp: i16, t: &Thresholds) -> bool {
        let minimal = i16::from(t.minimal);
        let high = i16::from(t.high);
        let critical = i16::from(t.critical);
        match self {
            Self::Minimum => temp <= minimal,
            Self::Normal => temp > minimal && temp < high,
            Self::High => temp >= high && temp < critical,
            Self::Critical => temp >= critical,
        }
    }

    /// Minimum and Normal clear alarms; High and Critical raise them.
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Minimum | Self::Normal)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimum => write!(f, "minimum"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Pending/dwell bookkeeping for one band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DwellTimer {
    /// `Some(start)` while the reading has been continuously in band.
    started_ms: Option<u64>,
}

impl DwellTimer {
    /// Feed one sample.  Returns `true` once the dwell has elapsed.
    pub fn update(&mut self, in_band: bool, now_ms: u64, dwell_ms: u64) -> bool {
        if !in_band {
            self.started_ms = None;
            return false;
        }
        match self.started_ms {
            None => {
                self.started_ms = Some(now_ms);
                false
            }
            Some(start) => now_ms.saturating_sub(start) >= dwell_ms,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.started_ms.is_some()
    }

    pub fn started_ms(&self) -> Option<u64> {
        self.started_ms
    }

    pub fn reset(&mut self) {
        self.started_ms = None;
    }
}

/// Four independent dwell timers plus the latched current zone.
pub struct ZoneClassifier {
    dwell_ms: u64,
    timers: [DwellTimer; 4],
    current: Option<Zone>,
}

impl ZoneClassifier {
    pub fn new(dwell_ms: u64) -> Self {
        Self {
            dwell_ms,
            timers: [DwellTimer::default(); 4],
            current: None,
        }
    }

    /// Classify one reading.
    ///
    /// Returns the confirmed zone, if the reading's band has satisfied its
    /// dwell; `None` while a dwell is still running.
    pub fn update(&mut self, temp: i16, thresholds: &Thresholds, now_ms: u64) -> Option<Zone> {
        let mut confirmed = None;
        for zone in Zone::ALL {
            let in_band = zone.contains(temp, thresholds);
            if self.timers[zone as usize].update(in_band, now_ms, self.dwell_ms) {
                confirmed = Some(zone);
            }
        }

        if let Some(zone) = confirmed {
            if self.current != Some(zone) {
                info!(
                    "Zone: {} confirmed at {}°C (was {:?})",
                    zone, temp, self.current
                );
                self.current = Some(zone);
            }
        }
        confirmed
    }

    /// Last confirmed zone (`None` until the first confirmation).
    pub fn current_zone(&self) -> Option<Zone> {
        self.current
    }

    /// Dwell timer for one band (read-only, for telemetry and tests).
    pub fn timer(&self, zone: Zone) -> &DwellTimer {
        &self.timers[zone as usize]
    }

    /// Change the dwell duration; running timers keep their start time.
    pub fn set_dwell_ms(&mut self, dwell_ms: u64) {
        self.dwell_ms = dwell_ms;
    }

    /// Drop all pending dwells (e.g. after thresholds were edited).
    pub fn reset_pending(&mut self) {
        for timer in &mut self.timers {
            timer.reset();
        }
    }
}
