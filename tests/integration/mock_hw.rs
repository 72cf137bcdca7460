//! Mock hardware adapters for integration tests.
//!
//! Records every indicator and display call so tests can assert on the
//! full output history without touching real SPI/PWM peripherals.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use thermorx::app::events::AppEvent;
use thermorx::app::ports::{
    ConfigError, ConfigPort, DisplayFrame, DisplayPort, EventSink, IndicatorPort, RadioPort,
};
use thermorx::app::service::AppService;
use thermorx::config::MonitorConfig;
use thermorx::drivers::button::ButtonInput;
use thermorx::severity::Rgb;
use thermorx::thresholds::Thresholds;

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Tone(bool),
    Rgb(Rgb),
    Red(u8),
    Render(DisplayFrame),
    PowerSave(bool),
}

// ── MockHardware ──────────────────────────────────────────────

/// Radio + indicator + display in one recording mock.
///
/// The radio first drains `script`, then keeps returning `steady`.
pub struct MockHardware {
    pub script: VecDeque<Option<i16>>,
    pub steady: Option<i16>,
    pub polls: usize,
    pub calls: Vec<HwCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            steady: None,
            polls: 0,
            calls: Vec::new(),
        }
    }

    /// A transmitter that always sends `celsius`.
    pub fn steady(celsius: i16) -> Self {
        Self {
            steady: Some(celsius),
            ..Self::new()
        }
    }

    pub fn tone_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                HwCall::Tone(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn last_rgb(&self) -> Option<Rgb> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::Rgb(rgb) => Some(*rgb),
            _ => None,
        })
    }

    pub fn last_red(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::Red(level) => Some(*level),
            _ => None,
        })
    }

    pub fn last_frame(&self) -> Option<DisplayFrame> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::Render(frame) => Some(*frame),
            _ => None,
        })
    }

    pub fn power_save(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                HwCall::PowerSave(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn frames(&self) -> Vec<DisplayFrame> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Render(frame) => Some(*frame),
                _ => None,
            })
            .collect()
    }

    /// Timestamps are not recorded, so count toggles instead.
    pub fn tone_edges(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::Tone(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPort for MockHardware {
    fn receive(&mut self) -> Option<i16> {
        self.polls += 1;
        match self.script.pop_front() {
            Some(next) => next,
            None => self.steady,
        }
    }
}

impl IndicatorPort for MockHardware {
    fn set_tone(&mut self, on: bool) {
        self.calls.push(HwCall::Tone(on));
    }

    fn set_rgb(&mut self, rgb: Rgb) {
        self.calls.push(HwCall::Rgb(rgb));
    }

    fn set_red(&mut self, level: u8) {
        self.calls.push(HwCall::Red(level));
    }
}

impl DisplayPort for MockHardware {
    fn render(&mut self, frame: &DisplayFrame) {
        self.calls.push(HwCall::Render(*frame));
    }

    fn set_power_save(&mut self, enabled: bool) {
        self.calls.push(HwCall::PowerSave(enabled));
    }
}

// ── Event sink ────────────────────────────────────────────────

pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn has<F: Fn(&AppEvent) -> bool>(&self, pred: F) -> bool {
        self.events.iter().any(pred)
    }

    pub fn count<F: Fn(&AppEvent) -> bool>(&self, pred: F) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── In-memory config store ────────────────────────────────────

pub struct MockStore {
    pub thresholds: RefCell<Option<Thresholds>>,
    pub config: RefCell<Option<MonitorConfig>>,
    pub threshold_writes: Cell<usize>,
    pub fail_writes: Cell<bool>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self {
            thresholds: RefCell::new(None),
            config: RefCell::new(None),
            threshold_writes: Cell::new(0),
            fail_writes: Cell::new(false),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for MockStore {
    fn load_thresholds(&self) -> Result<Thresholds, ConfigError> {
        Ok(self.thresholds.borrow().unwrap_or_default())
    }

    fn save_thresholds(&self, thresholds: &Thresholds) -> Result<(), ConfigError> {
        if self.fail_writes.get() {
            return Err(ConfigError::IoError);
        }
        if !thresholds.is_ordered() {
            return Err(ConfigError::ValidationFailed("thresholds must be strictly increasing"));
        }
        self.threshold_writes.set(self.threshold_writes.get() + 1);
        *self.thresholds.borrow_mut() = Some(*thresholds);
        Ok(())
    }

    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        Ok(self.config.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        if self.fail_writes.get() {
            return Err(ConfigError::IoError);
        }
        config.validate().map_err(ConfigError::ValidationFailed)?;
        *self.config.borrow_mut() = Some(config.clone());
        Ok(())
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Service plus mocks plus a simulated clock.
pub struct Rig {
    pub app: AppService,
    pub hw: MockHardware,
    pub sink: LogSink,
    pub now_ms: u64,
}

/// Tick period used by the scenarios.
pub const TICK_MS: u64 = 100;

#[allow(dead_code)]
impl Rig {
    pub fn new(hw: MockHardware) -> Self {
        Self::with(MonitorConfig::default(), Thresholds::default(), hw)
    }

    pub fn with(config: MonitorConfig, thresholds: Thresholds, hw: MockHardware) -> Self {
        let mut app = AppService::new(config, thresholds);
        let mut hw = hw;
        let mut sink = LogSink::new();
        app.start(0, &mut hw, &mut sink);
        Self {
            app,
            hw,
            sink,
            now_ms: 0,
        }
    }

    /// One tick, `TICK_MS` after the previous one.
    pub fn step(&mut self, input: ButtonInput) {
        self.now_ms += TICK_MS;
        self.app.tick(self.now_ms, input, &mut self.hw, &mut self.sink);
    }

    /// Idle ticks until the clock reaches `until_ms`.
    pub fn run_until(&mut self, until_ms: u64) {
        while self.now_ms + TICK_MS <= until_ms {
            self.step(ButtonInput::NONE);
        }
    }

    /// Idle ticks for `duration_ms`.
    pub fn run_for(&mut self, duration_ms: u64) {
        let until = self.now_ms + duration_ms;
        self.run_until(until);
    }

    pub fn click(&mut self) {
        self.step(ButtonInput::click_right());
    }
}
