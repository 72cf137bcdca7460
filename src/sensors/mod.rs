//! Sensor subsystem.
//!
//! The receiver has a single input: temperature packets from the remote
//! transmitter.  [`TemperatureReceiver`] gates the polls, counts misses and
//! judges plausibility; its latest reading is what the main page feeds to
//! the zone classifier each tick.

pub mod receiver;

pub use receiver::{PollOutcome, Reading, TemperatureReceiver};
