//! Temperature thresholds and the edit rules that keep them ordered.
//!
//! The four boundaries must satisfy `minimal < normal < high < critical`
//! after every operation.  Edits happen one degree at a time from the
//! threshold editor pages; each field may only move inside the window its
//! neighbours leave open, so an edit that would break the ordering is
//! rejected and the value stays where it was.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Lowest value the minimal threshold can be edited down to (°C).
pub const MINIMAL_FLOOR: u8 = 10;
/// Highest value the critical threshold can be edited up to (°C).
pub const CRITICAL_CEILING: u8 = 150;

/// Persisted blob length: one byte per threshold.
pub const BLOB_LEN: usize = 4;

/// The four ordered zone boundaries, in °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub minimal: u8,
    pub normal: u8,
    pub high: u8,
    pub critical: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            minimal: 25,
            normal: 35,
            high: 55,
            critical: 70,
        }
    }
}

/// Which threshold an editor page is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdField {
    Minimal,
    Normal,
    High,
    Critical,
}

impl ThresholdField {
    /// Editor page heading.
    pub fn label(self) -> &'static str {
        match self {
            Self::Minimal => "MIN TEMP",
            Self::Normal => "NORMAL TEMP",
            Self::High => "HIGH TEMP",
            Self::Critical => "CRITICAL TEMP",
        }
    }
}

impl fmt::Display for ThresholdField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of a single-degree edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Down,
    Up,
}

impl Thresholds {
    /// Build from explicit values, rejecting anything not strictly ordered.
    pub fn new(minimal: u8, normal: u8, high: u8, critical: u8) -> Option<Self> {
        let t = Self {
            minimal,
            normal,
            high,
            critical,
        };
        t.is_ordered().then_some(t)
    }

    /// `minimal < normal < high < critical`.
    pub fn is_ordered(&self) -> bool {
        self.minimal < self.normal && self.normal < self.high && self.high < self.critical
    }

    pub fn get(&self, field: ThresholdField) -> u8 {
        match field {
            ThresholdField::Minimal => self.minimal,
            ThresholdField::Normal => self.normal,
            ThresholdField::High => self.high,
            ThresholdField::Critical => self.critical,
        }
    }

    /// Inclusive edit window for `field` given the current neighbours.
    pub fn bounds(&self, field: ThresholdField) -> (u8, u8) {
        match field {
            ThresholdField::Minimal => (MINIMAL_FLOOR, self.normal - 1),
            ThresholdField::Normal => (self.minimal + 1, self.high - 1),
            ThresholdField::High => (self.normal + 1, self.critical - 1),
            ThresholdField::Critical => (self.high + 1, CRITICAL_CEILING),
        }
    }

    /// Move `field` one degree in `step` direction.
    ///
    /// Returns `true` if the value changed.  At the edge of the window the
    /// edit is refused and the thresholds are left untouched.
    pub fn adjust(&mut self, field: ThresholdField, step: Step) -> bool {
        let (min, max) = self.bounds(field);
        let value = self.get(field);
        let next = match step {
            Step::Down if value > min => value - 1,
            Step::Up if value < max => value + 1,
            _ => return false,
        };
        match field {
            ThresholdField::Minimal => self.minimal = next,
            ThresholdField::Normal => self.normal = next,
            ThresholdField::High => self.high = next,
            ThresholdField::Critical => self.critical = next,
        }
        true
    }

    /// Serialise to the persisted byte layout.
    pub fn to_bytes(self) -> [u8; BLOB_LEN] {
        [self.minimal, self.normal, self.high, self.critical]
    }

    /// Decode a stored blob.
    ///
    /// Each byte that is out of its plausible range is replaced with its
    /// factory value; if the result is still not ordered (e.g. erased
    /// flash, partial write) the defaults are returned.
    pub fn from_stored(bytes: &[u8]) -> Self {
        let Some(&[minimal, normal, high, critical]) = bytes.get(..BLOB_LEN) else {
            return Self::default();
        };
        let decoded = Self {
            minimal: if minimal >= 100 { 25 } else { minimal },
            normal: if normal >= 100 { 40 } else { normal },
            high: if high >= 150 { 55 } else { high },
            critical: if critical >= 200 { 70 } else { critical },
        };
        if decoded.is_ordered() {
            decoded
        } else {
            log::warn!("Thresholds: stored blob {:?} not ordered, using defaults", bytes);
            Self::default()
        }
    }
}
