//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (radio, indicator outputs, display, event sinks,
//! persistent config) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.
//!
//! All port errors are typed and `Copy` so they can be folded into
//! [`crate::error::Error`].

use crate::config::MonitorConfig;
use crate::severity::Rgb;
use crate::thresholds::{ThresholdField, Thresholds};

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: transmitter → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the wireless temperature link.
pub trait RadioPort {
    /// Return the next received temperature packet, if one is waiting.
    /// Must not block.
    fn receive(&mut self) -> Option<i16>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → buzzer + RGB LED)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the buzzer and the RGB severity LED.
pub trait IndicatorPort {
    /// Energise or silence the buzzer tone.
    fn set_tone(&mut self, on: bool);

    /// Set all three LED channels (each 0–100).
    fn set_rgb(&mut self, rgb: Rgb);

    /// Set only the red channel (0–100).
    fn set_red(&mut self, level: u8);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → OLED)
// ───────────────────────────────────────────────────────────────

/// Everything the screen can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFrame {
    /// Boot screen with firmware version.
    Splash { version: &'static str },
    /// Live temperature in °C.
    Temperature(i16),
    /// Received value outside the plausible range.
    Invalid,
    /// Link lost.
    NoSignal,
    /// Threshold editor page.
    ThresholdEditor { field: ThresholdField, value: u8 },
}

pub trait DisplayPort {
    /// Replace the screen contents with `frame`.
    fn render(&mut self, frame: &DisplayFrame);

    /// `true` blanks the panel, `false` wakes it.
    fn set_power_save(&mut self, enabled: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists thresholds and the monitor configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// values with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Load thresholds.  A missing or damaged blob is repaired field by
    /// field; only storage failures surface as errors.
    fn load_thresholds(&self) -> Result<Thresholds, ConfigError>;

    /// Persist thresholds (rejects an unordered set).
    fn save_thresholds(&self, thresholds: &Thresholds) -> Result<(), ConfigError>;

    /// Load the monitor configuration.
    /// Returns [`MonitorConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;

    /// Validate and persist the monitor configuration.
    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from the raw blob layer under a [`ConfigPort`] adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Caller's buffer is smaller than the stored value.
    BufferTooSmall,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::NotFound,
            StorageError::Full => Self::StorageFull,
            StorageError::BufferTooSmall => Self::Corrupted,
            StorageError::IoError => Self::IoError,
        }
    }
}
