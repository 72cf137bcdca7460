//! Log-backed display adapter.
//!
//! Implements [`DisplayPort`] by writing each new frame to the logger as
//! the text the panel would show.  Identical consecutive frames are not
//! repeated, so the console stays readable at the 1 Hz sample rate.
//!
//! TODO: add an SH1106 128×64 I²C panel driver behind the same port once
//! an `embedded-hal` I²C transport is wired in `main`.

use core::fmt::Write;

use heapless::String;
use log::info;

use crate::app::ports::{DisplayFrame, DisplayPort};

/// Longest line: "CRITICAL TEMP: 150 C".
pub const LINE_CAPACITY: usize = 24;

/// The single text line a frame renders as.
pub fn frame_text(frame: &DisplayFrame) -> String<LINE_CAPACITY> {
    let mut line = String::new();
    // Every variant fits in LINE_CAPACITY.
    let _ = match frame {
        DisplayFrame::Splash { version } => write!(line, "ThermoRx v{}", version),
        DisplayFrame::Temperature(c) => write!(line, "Temp: {} C", c),
        DisplayFrame::Invalid => line.push_str("Invalid reading").map_err(|_| core::fmt::Error),
        DisplayFrame::NoSignal => line.push_str("NO SIGNAL").map_err(|_| core::fmt::Error),
        DisplayFrame::ThresholdEditor { field, value } => {
            write!(line, "{}: {} C", field.label(), value)
        }
    };
    line
}

#[derive(Default)]
pub struct LogDisplay {
    last: Option<DisplayFrame>,
    power_save: bool,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<DisplayFrame> {
        self.last
    }

    pub fn is_power_save(&self) -> bool {
        self.power_save
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, frame: &DisplayFrame) {
        if self.last.as_ref() == Some(frame) {
            return;
        }
        self.last = Some(*frame);
        info!("LCD   | {}", frame_text(frame));
    }

    fn set_power_save(&mut self, enabled: bool) {
        if self.power_save != enabled {
            self.power_save = enabled;
            info!("LCD   | power save {}", if enabled { "on" } else { "off" });
        }
    }
}
