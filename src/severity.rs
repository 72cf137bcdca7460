//! RGB severity indicator mapping.
//!
//! Pure function from the instantaneous temperature and thresholds to a
//! colour.  Recomputed every main-page tick; it looks at the raw reading,
//! not the confirmed zone, so the colour moves immediately while the alarm
//! path waits for the dwell.
//!
//! | Range                  | Red        | Green      | Blue      |
//! |------------------------|------------|------------|-----------|
//! | below minimal          | 0          | 0          | 0         |
//! | minimal .. normal      | 0          | 0 → 20     | 10 → 0    |
//! | exactly normal         | 0          | 20         | 0         |
//! | normal .. high         | 0 → 10     | 20 → 0     | 0         |
//! | exactly high           | 10         | 0          | 0         |
//! | high .. critical       | 10 → 100   | 0          | 0         |
//! | critical and above     | (abstains: the critical blink owns red)  |
//!
//! Intensities are 0–100.

use serde::Serialize;

use crate::thresholds::Thresholds;

/// Indicator colour, each channel 0–100 (percent of full brightness).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    /// Maximum channel value.
    pub const FULL: u8 = 100;

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Linear re-scale with integer truncation, the way the classic
/// microcontroller `map()` helper does it.
fn map_range(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> u8 {
    if in_max == in_min {
        return out_min.clamp(0, i32::from(Rgb::FULL)) as u8;
    }
    let v = (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min;
    v.clamp(0, i32::from(Rgb::FULL)) as u8
}

/// Colour for `temp`, or `None` at/above the critical threshold.
pub fn map(temp: i16, t: &Thresholds) -> Option<Rgb> {
    let x = i32::from(temp);
    let minimal = i32::from(t.minimal);
    let normal = i32::from(t.normal);
    let high = i32::from(t.high);
    let critical = i32::from(t.critical);

    if x >= critical {
        return None;
    }

    let rgb = if x < minimal {
        Rgb::OFF
    } else if x < normal {
        Rgb::new(
            0,
            map_range(x, minimal, normal, 0, 20),
            map_range(x, minimal, normal, 10, 0),
        )
    } else if x == normal {
        Rgb::new(0, 20, 0)
    } else if x < high {
        Rgb::new(
            map_range(x, normal, high, 0, 10),
            map_range(x, normal, high, 20, 0),
            0,
        )
    } else if x == high {
        Rgb::new(10, 0, 0)
    } else {
        Rgb::new(map_range(x, high, critical, 10, 100), 0, 0)
    };
    Some(rgb)
}
