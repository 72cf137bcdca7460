//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the page FSM, the shared context and the buzzer
//! sequencer.  It exposes a clean, hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!   RadioPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService          │
//! IndicatorPort ◀─│  pages · zones · alarm · RGB │
//!   DisplayPort ◀─└──────────────────────────────┘ ◀─▶ ConfigPort
//! ```
//!
//! One call to [`AppService::tick`] is one pass of the cooperative loop:
//!
//! 1. click / long-press feedback beeps
//! 2. radio poll (main page only, when due)
//! 3. page FSM tick (classifier → escalator → severity on the main page)
//! 4. queued commands applied to the ports
//! 5. buzzer advanced, tone written
//! 6. state changes reported as events

use log::{debug, info, warn};

use crate::alarm::AlarmPhase;
use crate::config::MonitorConfig;
use crate::drivers::button::ButtonInput;
use crate::drivers::buzzer::{BuzzerDriver, BuzzerMode, BuzzerState};
use crate::fsm::context::{Command, MonitorContext};
use crate::fsm::pages::build_page_table;
use crate::fsm::{Fsm, PageId};
use crate::thresholds::Thresholds;
use crate::zone::Zone;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ConfigPort, DisplayFrame, DisplayPort, EventSink, IndicatorPort, RadioPort};

/// State captured before a tick so changes can be reported after it.
#[derive(Clone, Copy)]
struct Observed {
    page: PageId,
    zone: Option<Zone>,
    phase: AlarmPhase,
    thresholds: Thresholds,
    signal_lost: bool,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: MonitorContext,
    buzzer: BuzzerDriver,
    /// Alarm cadence that arrived while a feedback beep was playing; it
    /// starts as soon as the buzzer is free.
    pending_alarm: Option<u32>,
    /// Last level written to the tone output.
    tone_written: bool,
    tick_count: u64,
    save_requested: bool,
    config_dirty: bool,
    last_telemetry_ms: u64,
}

impl AppService {
    /// Construct the service from configuration and stored thresholds.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: MonitorConfig, thresholds: Thresholds) -> Self {
        let buzzer = BuzzerDriver::new(config.short_beep_ms, config.long_beep_ms);
        let ctx = MonitorContext::new(config, thresholds);
        let fsm = Fsm::new(build_page_table(), PageId::Main);

        Self {
            fsm,
            ctx,
            buzzer,
            pending_alarm: None,
            tone_written: false,
            tick_count: 0,
            save_requested: false,
            config_dirty: false,
            last_telemetry_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Show the splash screen and enter the main page.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut (impl IndicatorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        self.last_telemetry_ms = now_ms;
        self.ctx.commands.push(Command::Render(DisplayFrame::Splash {
            version: env!("CARGO_PKG_VERSION"),
        }));
        self.fsm.start(&mut self.ctx);
        self.apply_commands(now_ms, hw);

        let page = self.fsm.current_page();
        sink.emit(&AppEvent::Started(page));
        info!(
            "AppService started on {:?}, thresholds {:?}",
            page, self.ctx.thresholds
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one pass of the cooperative loop.
    ///
    /// The `hw` parameter satisfies all three hardware ports, which avoids
    /// juggling several mutable borrows while keeping the port boundary
    /// explicit.  Nothing in here blocks and nothing returns an error.
    pub fn tick(
        &mut self,
        now_ms: u64,
        input: ButtonInput,
        hw: &mut (impl RadioPort + IndicatorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let before = self.observe();

        self.ctx.now_ms = now_ms;
        self.ctx.input = input;

        // 1. Input feedback
        if input.any_long_press() {
            self.ctx.commands.push(Command::StartBuzzer {
                mode: BuzzerMode::Long,
                period_ms: 0,
            });
        } else if input.any_click() {
            self.ctx.commands.push(Command::StartBuzzer {
                mode: BuzzerMode::Short,
                period_ms: 0,
            });
        }

        // 2. Radio poll.  Skipped on a navigation tick so a packet is never
        //    read and then dropped by the page change.
        self.ctx.radio_rx = if before.page == PageId::Main
            && !input.any_long_press()
            && self.ctx.receiver.is_due(now_ms)
        {
            Some(hw.receive())
        } else {
            None
        };

        // 3. Page logic
        self.fsm.tick(&mut self.ctx);
        self.ctx.radio_rx = None;
        self.ctx.input = ButtonInput::NONE;

        // 4 + 5. Side effects, then the buzzer
        self.apply_commands(now_ms, hw);
        self.advance_buzzer(now_ms, hw);

        // 6. Report
        self.report_changes(before, sink);
        self.emit_telemetry_if_due(now_ms, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut (impl IndicatorPort + DisplayPort),
        sink: &mut impl EventSink,
    ) {
        let before = self.observe();
        let now_ms = self.ctx.now_ms;

        match cmd {
            AppCommand::SetThresholds(thresholds) => {
                if !thresholds.is_ordered() {
                    warn!("Rejected unordered thresholds {:?}", thresholds);
                    return;
                }
                self.ctx.thresholds = thresholds;
                self.ctx.thresholds_dirty = true;
                self.ctx.classifier.reset_pending();
                if let Some(field) = self.fsm.current_page().editor_field() {
                    self.ctx.commands.push(Command::Render(DisplayFrame::ThresholdEditor {
                        field,
                        value: thresholds.get(field),
                    }));
                }
                self.save_requested = true;
            }
            AppCommand::UpdateConfig(config) => {
                if let Err(msg) = config.validate() {
                    warn!("Rejected config update: {}", msg);
                    return;
                }
                self.buzzer
                    .set_lengths(config.short_beep_ms, config.long_beep_ms);
                self.ctx.apply_config(config);
                self.config_dirty = true;
                info!("Configuration updated at runtime");
            }
            AppCommand::SaveThresholds => {
                self.save_requested = true;
                info!("Explicit threshold save requested");
            }
            AppCommand::Acknowledge => {
                if !self.ctx.escalator.is_sounding() {
                    debug!("Acknowledge ignored: no alarm sounding");
                    return;
                }
                let zone = self.ctx.classifier.current_zone();
                self.ctx
                    .escalator
                    .update(zone, true, now_ms, &mut self.ctx.commands);
            }
            AppCommand::ShowPage(page) => {
                self.fsm.force_transition(page, &mut self.ctx);
            }
        }

        self.apply_commands(now_ms, hw);
        self.report_changes(before, sink);
    }

    // ── Persistence ───────────────────────────────────────────

    /// Write pending thresholds / config through `store`.
    ///
    /// Call once per loop after [`tick`](Self::tick).  Returns `true` if
    /// anything was written.  A failed write is logged and retried the
    /// next time the main page is entered or a save is requested.
    pub fn flush_pending(&mut self, store: &impl ConfigPort, sink: &mut impl EventSink) -> bool {
        let mut wrote = false;

        if self.save_requested {
            self.save_requested = false;
            match store.save_thresholds(&self.ctx.thresholds) {
                Ok(()) => {
                    self.ctx.thresholds_dirty = false;
                    info!("Thresholds saved: {:?}", self.ctx.thresholds);
                    sink.emit(&AppEvent::ThresholdsSaved(self.ctx.thresholds));
                    wrote = true;
                }
                Err(e) => warn!("Threshold save failed: {}", e),
            }
        }

        if self.config_dirty {
            match store.save(&self.ctx.config) {
                Ok(()) => {
                    self.config_dirty = false;
                    info!("Config saved");
                    wrote = true;
                }
                Err(e) => {
                    self.config_dirty = false;
                    warn!("Config save failed: {}", e);
                }
            }
        }

        wrote
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            uptime_ms: self.ctx.now_ms,
            page: self.fsm.current_page(),
            celsius: self.ctx.receiver.plausible_celsius(),
            zone: self.ctx.classifier.current_zone(),
            alarm: self.ctx.escalator.phase(),
            rgb: self.ctx.rgb,
            radio_misses: self.ctx.receiver.misses(),
            thresholds: self.ctx.thresholds,
        }
    }

    pub fn page(&self) -> PageId {
        self.fsm.current_page()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.ctx.thresholds
    }

    pub fn alarm_phase(&self) -> AlarmPhase {
        self.ctx.escalator.phase()
    }

    pub fn current_zone(&self) -> Option<Zone> {
        self.ctx.classifier.current_zone()
    }

    pub fn buzzer_state(&self) -> BuzzerState {
        self.buzzer.state()
    }

    /// Total loop ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_thresholds_dirty(&self) -> bool {
        self.ctx.thresholds_dirty
    }

    pub fn current_config(&self) -> MonitorConfig {
        self.ctx.config.clone()
    }

    /// Read-only view of the shared context.
    pub fn context(&self) -> &MonitorContext {
        &self.ctx
    }

    // ── Internal ──────────────────────────────────────────────

    fn observe(&self) -> Observed {
        Observed {
            page: self.fsm.current_page(),
            zone: self.ctx.classifier.current_zone(),
            phase: self.ctx.escalator.phase(),
            thresholds: self.ctx.thresholds,
            signal_lost: self.ctx.receiver.signal_lost(),
        }
    }

    /// Translate queued commands into driver and port calls, in order.
    fn apply_commands(&mut self, now_ms: u64, hw: &mut (impl IndicatorPort + DisplayPort)) {
        for cmd in self.ctx.commands.drain() {
            match cmd {
                Command::StartBuzzer {
                    mode: BuzzerMode::Alarm,
                    period_ms,
                } => {
                    if !self.buzzer.start(BuzzerMode::Alarm, period_ms, now_ms) {
                        self.pending_alarm = Some(period_ms);
                    }
                }
                Command::StartBuzzer { mode, period_ms } => {
                    self.buzzer.start(mode, period_ms, now_ms);
                }
                Command::StopAlarm => {
                    self.pending_alarm = None;
                    self.buzzer.stop();
                }
                Command::SetRgb(rgb) => hw.set_rgb(rgb),
                Command::SetRed(level) => hw.set_red(level),
                Command::DisplayPowerSave(enabled) => hw.set_power_save(enabled),
                Command::Render(frame) => hw.render(&frame),
                Command::SaveThresholds => self.save_requested = true,
            }
        }
    }

    fn advance_buzzer(&mut self, now_ms: u64, hw: &mut impl IndicatorPort) {
        if let Some(period_ms) = self.pending_alarm {
            if self.buzzer.is_idle() {
                self.buzzer.start(BuzzerMode::Alarm, period_ms, now_ms);
                self.pending_alarm = None;
            }
        }

        let on = self.buzzer.advance(now_ms);
        if on != self.tone_written {
            self.tone_written = on;
            hw.set_tone(on);
        }
    }

    fn report_changes(&self, before: Observed, sink: &mut impl EventSink) {
        let after = self.observe();

        if after.page != before.page {
            sink.emit(&AppEvent::PageChanged {
                from: before.page,
                to: after.page,
            });
        }
        if after.zone != before.zone {
            if let (Some(zone), Some(celsius)) =
                (after.zone, self.ctx.receiver.plausible_celsius())
            {
                sink.emit(&AppEvent::ZoneConfirmed { zone, celsius });
            }
        }
        if after.phase != before.phase {
            sink.emit(&AppEvent::AlarmChanged {
                from: before.phase,
                to: after.phase,
            });
        }
        if after.thresholds != before.thresholds {
            sink.emit(&AppEvent::ThresholdsChanged(after.thresholds));
        }
        if after.signal_lost && !before.signal_lost {
            sink.emit(&AppEvent::SignalLost {
                misses: self.ctx.receiver.misses(),
            });
        } else if before.signal_lost && !after.signal_lost {
            sink.emit(&AppEvent::SignalRestored);
        }
    }

    fn emit_telemetry_if_due(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        let interval_ms = u64::from(self.ctx.config.telemetry_interval_secs) * 1000;
        if now_ms.saturating_sub(self.last_telemetry_ms) >= interval_ms {
            self.last_telemetry_ms = now_ms;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }
}
