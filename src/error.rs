//! Unified error types for the receiver firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! device entry point's error handling uniform.  The tick loop itself never
//! returns errors: failures inside it are absorbed as state (missed radio
//! polls, rejected edits, ignored buzzer commands).  All variants are `Copy`.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation outside the tick loop funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Threshold or monitor configuration could not be loaded or stored.
    Config(ConfigError),
    /// An indicator output (tone or RGB PWM channel) rejected a write.
    Indicator(IndicatorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Indicator(e) => write!(f, "indicator: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Indicator errors
// ---------------------------------------------------------------------------

/// Which PWM output failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorError {
    ToneWriteFailed,
    RedWriteFailed,
    GreenWriteFailed,
    BlueWriteFailed,
}

impl fmt::Display for IndicatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToneWriteFailed => write!(f, "tone PWM write failed"),
            Self::RedWriteFailed => write!(f, "red PWM write failed"),
            Self::GreenWriteFailed => write!(f, "green PWM write failed"),
            Self::BlueWriteFailed => write!(f, "blue PWM write failed"),
        }
    }
}

impl From<IndicatorError> for Error {
    fn from(e: IndicatorError) -> Self {
        Self::Indicator(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
