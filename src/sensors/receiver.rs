//! Wireless temperature receiver.
//!
//! The remote transmitter sends one signed integer (°C) per packet.  The
//! receiver is polled at a fixed interval while the main page is active;
//! each poll either yields a reading or counts as a miss.
//!
//! ## Plausibility
//!
//! | Raw value      | Treatment                                         |
//! |----------------|---------------------------------------------------|
//! | `<= 0`         | implausible: shown as invalid, monitoring paused  |
//! | `1 ..= max`    | valid: drives the zone classifier and indicator   |
//! | `> max`        | implausible: shown as invalid, monitoring paused  |
//!
//! An implausible reading stays the latest reading until a plausible one
//! replaces it, so monitoring stays paused for that whole time.  Misses do
//! not clear the latest reading: the core keeps running on the last value
//! while the link is down.

use log::{debug, info, warn};

use crate::app::ports::DisplayFrame;
use crate::config::MonitorConfig;

/// One received temperature sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub celsius: i16,
    pub plausible: bool,
}

impl Reading {
    pub fn classify(celsius: i16, max_plausible_c: i16) -> Self {
        Self {
            celsius,
            plausible: celsius > 0 && celsius <= max_plausible_c,
        }
    }

    /// What the main screen shows for this sample.
    pub fn frame(&self) -> DisplayFrame {
        if self.plausible {
            DisplayFrame::Temperature(self.celsius)
        } else {
            DisplayFrame::Invalid
        }
    }
}

/// Result of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Received(Reading),
    /// Nothing arrived.  `no_signal` is set once the consecutive miss
    /// count has reached the configured limit.
    Missed { misses: u32, no_signal: bool },
}

pub struct TemperatureReceiver {
    poll_interval_ms: u32,
    no_signal_misses: u32,
    max_plausible_c: i16,
    last_poll_ms: Option<u64>,
    misses: u32,
    latest: Option<Reading>,
}

impl TemperatureReceiver {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            poll_interval_ms: config.poll_interval_ms,
            no_signal_misses: config.no_signal_misses,
            max_plausible_c: config.max_plausible_c,
            last_poll_ms: None,
            misses: 0,
            latest: None,
        }
    }

    pub fn reconfigure(&mut self, config: &MonitorConfig) {
        self.poll_interval_ms = config.poll_interval_ms;
        self.no_signal_misses = config.no_signal_misses;
        self.max_plausible_c = config.max_plausible_c;
    }

    /// Whether the radio should be polled at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_poll_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= u64::from(self.poll_interval_ms),
        }
    }

    /// Record the result of a poll taken at `now_ms`.
    pub fn ingest(&mut self, raw: Option<i16>, now_ms: u64) -> PollOutcome {
        self.last_poll_ms = Some(now_ms);

        match raw {
            Some(celsius) => {
                if self.signal_lost() {
                    info!("Receiver: signal restored after {} misses", self.misses);
                }
                self.misses = 0;
                let reading = Reading::classify(celsius, self.max_plausible_c);
                if reading.plausible {
                    debug!("Receiver: {}°C", celsius);
                } else {
                    warn!("Receiver: implausible reading {}°C", celsius);
                }
                self.latest = Some(reading);
                PollOutcome::Received(reading)
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                let no_signal = self.signal_lost();
                if self.misses == self.no_signal_misses {
                    warn!("Receiver: no signal ({} consecutive misses)", self.misses);
                }
                PollOutcome::Missed {
                    misses: self.misses,
                    no_signal,
                }
            }
        }
    }

    /// Latest sample, plausible or not.
    pub fn latest(&self) -> Option<Reading> {
        self.latest
    }

    /// Temperature the core should act on, if the latest sample is plausible.
    pub fn plausible_celsius(&self) -> Option<i16> {
        self.latest.filter(|r| r.plausible).map(|r| r.celsius)
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn signal_lost(&self) -> bool {
        self.misses >= self.no_signal_misses
    }

    /// Frame reflecting the current link state.
    pub fn frame(&self) -> Option<DisplayFrame> {
        if self.signal_lost() {
            Some(DisplayFrame::NoSignal)
        } else {
            self.latest.map(|r| r.frame())
        }
    }
}
