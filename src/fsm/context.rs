//! Shared mutable context threaded through every page handler.
//!
//! `MonitorContext` is the single struct that page handlers read from and
//! write to.  It holds timing, configuration, the thresholds being edited,
//! this tick's button input and radio poll, the core state machines, and
//! the command list that the service applies to the ports once the tick's
//! logic has run.  Think of it as the "blackboard" in a blackboard
//! architecture.

use heapless::Vec;
use log::warn;

use crate::alarm::AlarmEscalator;
use crate::app::ports::DisplayFrame;
use crate::config::MonitorConfig;
use crate::drivers::button::ButtonInput;
use crate::drivers::buzzer::BuzzerMode;
use crate::sensors::TemperatureReceiver;
use crate::severity::Rgb;
use crate::thresholds::Thresholds;
use crate::zone::ZoneClassifier;

// ---------------------------------------------------------------------------
// Output commands (written by handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Side effects requested by the core during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a beep or alarm on the buzzer (ignored while it is busy).
    StartBuzzer { mode: BuzzerMode, period_ms: u32 },
    /// Silence a running alarm.
    StopAlarm,
    SetRgb(Rgb),
    /// Red channel only (critical blink).
    SetRed(u8),
    DisplayPowerSave(bool),
    Render(DisplayFrame),
    /// Persist the current thresholds.
    SaveThresholds,
}

/// Upper bound on commands per tick.
pub const COMMAND_CAPACITY: usize = 16;

/// Fixed-capacity, ordered command list for one tick.
#[derive(Debug, Default)]
pub struct CommandQueue {
    items: Vec<Command, COMMAND_CAPACITY>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a command.  Overflow drops the command with a warning.
    pub fn push(&mut self, cmd: Command) {
        if self.items.push(cmd).is_err() {
            warn!("Command queue full, dropping {:?}", cmd);
        }
    }

    /// Take every queued command, leaving the queue empty.
    pub fn drain(&mut self) -> impl Iterator<Item = Command> {
        core::mem::take(&mut self.items).into_iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.items.iter()
    }

    pub fn contains(&self, cmd: &Command) -> bool {
        self.items.contains(cmd)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

// ---------------------------------------------------------------------------
// MonitorContext
// ---------------------------------------------------------------------------

/// The shared context passed to every page handler.
pub struct MonitorContext {
    // -- Timing --
    /// Monotonic milliseconds for the current tick.
    pub now_ms: u64,

    // -- Configuration --
    pub config: MonitorConfig,
    /// Live thresholds; editor pages modify them in place.
    pub thresholds: Thresholds,
    /// Set by an accepted edit, cleared once the thresholds are persisted.
    pub thresholds_dirty: bool,

    // -- Inputs for this tick --
    pub input: ButtonInput,
    /// Radio poll result for this tick: `None` if no poll was due,
    /// `Some(None)` for a poll that found nothing.
    pub radio_rx: Option<Option<i16>>,

    // -- Core state machines --
    pub receiver: TemperatureReceiver,
    pub classifier: ZoneClassifier,
    pub escalator: AlarmEscalator,
    /// Last colour produced by the severity mapper.
    pub rgb: Option<Rgb>,

    // -- Outputs --
    pub commands: CommandQueue,
}

impl MonitorContext {
    pub fn new(config: MonitorConfig, thresholds: Thresholds) -> Self {
        Self {
            now_ms: 0,
            receiver: TemperatureReceiver::new(&config),
            classifier: ZoneClassifier::new(config.dwell_ms()),
            escalator: AlarmEscalator::new(&config),
            config,
            thresholds,
            thresholds_dirty: false,
            input: ButtonInput::NONE,
            radio_rx: None,
            rgb: None,
            commands: CommandQueue::new(),
        }
    }

    /// Swap in a new configuration and push it to the state machines.
    pub fn apply_config(&mut self, config: MonitorConfig) {
        self.classifier.set_dwell_ms(config.dwell_ms());
        self.escalator.reconfigure(&config);
        self.receiver.reconfigure(&config);
        self.config = config;
    }

    /// Frame showing the receiver's latest state, if it has one.
    pub fn receiver_frame(&self) -> Option<DisplayFrame> {
        self.receiver.frame()
    }
}
