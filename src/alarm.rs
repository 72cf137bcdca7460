//! Alarm escalation.
//!
//! The escalator runs every main-page tick **after** the zone classifier.
//! It consumes the confirmed zone plus the acknowledge flag and emits
//! buzzer / indicator / display commands into the tick's command list; it
//! never touches hardware itself.
//!
//! State lives on two independent axes:
//!
//! - **phase**: which alarm (if any) is sounding, or whether an
//!   acknowledged critical alarm is waiting to nag again;
//! - **eligibility**: one flag per alarm path.  Firing consumes the flag and
//!   only a return to a safe zone (or, for critical, a confirmed high zone)
//!   grants it again.  This is what stops a sustained zone from re-firing
//!   after every acknowledgement.
//!
//! ```text
//!                 zone High & high_armed              ack
//!   Idle ─────────────────────────────▶ HighFiring ───────▶ Idle
//!     │   zone Critical & critical_armed             ack, zone Critical
//!     └───────────────────────────────▶ CriticalFiring ──────────────▶ CriticalRepeatArmed
//!                                            ▲                                 │
//!                                            └──────[repeat delay elapsed]─────┘
//!
//!   zone Minimum/Normal: silence, re-arm both paths, cancel repeat.
//! ```
//!
//! Only one alarm can sound at a time: every path requires silence before
//! it fires.

use log::{info, warn};
use serde::Serialize;

use crate::config::MonitorConfig;
use crate::drivers::buzzer::BuzzerMode;
use crate::fsm::context::{Command, CommandQueue};
use crate::severity::Rgb;
use crate::zone::Zone;

/// Which alarm is sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    High,
    Critical,
    /// Critical alarm re-fired after the repeat delay.
    CriticalRepeat,
}

/// Escalation phase (the first axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlarmPhase {
    Idle,
    HighFiring,
    CriticalFiring,
    CriticalRepeatArmed,
}

impl AlarmPhase {
    pub fn is_firing(self) -> bool {
        matches!(self, Self::HighFiring | Self::CriticalFiring)
    }
}

/// Buzzer cadence and repeat delay, copied out of [`MonitorConfig`].
#[derive(Debug, Clone, Copy)]
struct Timing {
    high_toggle_ms: u32,
    critical_toggle_ms: u32,
    critical_repeat_toggle_ms: u32,
    repeat_ms: u64,
    blink_on_ms: u32,
    blink_off_ms: u32,
}

impl Timing {
    fn from_config(config: &MonitorConfig) -> Self {
        Self {
            high_toggle_ms: config.high_toggle_ms,
            critical_toggle_ms: config.critical_toggle_ms,
            critical_repeat_toggle_ms: config.critical_repeat_toggle_ms,
            repeat_ms: config.repeat_critical_ms(),
            blink_on_ms: config.blink_on_ms,
            blink_off_ms: config.blink_off_ms,
        }
    }

    fn period_ms(&self, kind: AlarmKind) -> u32 {
        match kind {
            AlarmKind::High => self.high_toggle_ms,
            AlarmKind::Critical => self.critical_toggle_ms,
            AlarmKind::CriticalRepeat => self.critical_repeat_toggle_ms,
        }
    }
}

/// Critical-zone blink: red indicator and display wake toggled on their own
/// timer, independent of the buzzer cadence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blinker {
    lit: bool,
    since_ms: u64,
}

impl Blinker {
    /// Advance the blink and push this tick's indicator/display commands.
    pub fn tick(&mut self, now_ms: u64, on_ms: u32, off_ms: u32, cmds: &mut CommandQueue) {
        let elapsed = now_ms.saturating_sub(self.since_ms);
        if !self.lit && elapsed >= u64::from(off_ms) {
            self.lit = true;
            self.since_ms = now_ms;
            cmds.push(Command::DisplayPowerSave(false));
        } else if self.lit && elapsed >= u64::from(on_ms) {
            self.lit = false;
            self.since_ms = now_ms;
            cmds.push(Command::DisplayPowerSave(true));
        }
        cmds.push(Command::SetRed(if self.lit { Rgb::FULL } else { 0 }));
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

pub struct AlarmEscalator {
    timing: Timing,
    sounding: Option<AlarmKind>,
    high_armed: bool,
    critical_armed: bool,
    /// Acknowledgement time of a critical alarm that will nag again.
    repeat_since_ms: Option<u64>,
    fired_at_ms: Option<u64>,
    acknowledged_at_ms: Option<u64>,
    blinker: Blinker,
}

impl AlarmEscalator {
    /// Both alarm paths start armed, so a receiver powered up in a hot
    /// zone still alarms once the dwell confirms it.
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            timing: Timing::from_config(config),
            sounding: None,
            high_armed: true,
            critical_armed: true,
            repeat_since_ms: None,
            fired_at_ms: None,
            acknowledged_at_ms: None,
            blinker: Blinker::default(),
        }
    }

    /// Pick up new timing after a config reload.  A sounding alarm keeps
    /// its cadence until it is silenced.
    pub fn reconfigure(&mut self, config: &MonitorConfig) {
        self.timing = Timing::from_config(config);
    }

    /// Run one escalation step.
    ///
    /// `confirmed` is the classifier output for this tick; `acknowledge`
    /// is true when the user clicked either button.
    pub fn update(
        &mut self,
        confirmed: Option<Zone>,
        acknowledge: bool,
        now_ms: u64,
        cmds: &mut CommandQueue,
    ) {
        if acknowledge {
            if let Some(kind) = self.sounding.take() {
                cmds.push(Command::StopAlarm);
                self.acknowledged_at_ms = Some(now_ms);
                if confirmed == Some(Zone::Critical) {
                    self.repeat_since_ms = Some(now_ms);
                    info!(
                        "Alarm: {:?} acknowledged in critical zone, repeat in {}s",
                        kind,
                        self.timing.repeat_ms / 1000
                    );
                } else {
                    info!("Alarm: {:?} acknowledged", kind);
                }
                return;
            }
        }

        match confirmed {
            Some(zone) if zone.is_safe() => {
                if let Some(kind) = self.sounding.take() {
                    info!("Alarm: {:?} cleared, zone back to {}", kind, zone);
                    cmds.push(Command::StopAlarm);
                }
                self.high_armed = true;
                self.critical_armed = true;
                self.repeat_since_ms = None;
            }
            Some(Zone::High) => {
                if self.high_armed && self.sounding.is_none() {
                    self.high_armed = false;
                    self.fire(AlarmKind::High, now_ms, cmds);
                }
                self.critical_armed = true;
                self.repeat_since_ms = None;
                // Keep the screen awake for as long as the zone is high.
                cmds.push(Command::DisplayPowerSave(false));
            }
            Some(Zone::Critical) => {
                self.escalate_critical(now_ms, cmds);
                let (on_ms, off_ms) = (self.timing.blink_on_ms, self.timing.blink_off_ms);
                self.blinker.tick(now_ms, on_ms, off_ms, cmds);
            }
            _ => {}
        }
    }

    fn escalate_critical(&mut self, now_ms: u64, cmds: &mut CommandQueue) {
        if let Some(since) = self.repeat_since_ms {
            if self.sounding.is_none() && now_ms.saturating_sub(since) >= self.timing.repeat_ms {
                self.repeat_since_ms = None;
                self.fire(AlarmKind::CriticalRepeat, now_ms, cmds);
                return;
            }
        }

        if self.critical_armed && self.sounding.is_none() {
            self.critical_armed = false;
            self.fire(AlarmKind::Critical, now_ms, cmds);
        }
    }

    fn fire(&mut self, kind: AlarmKind, now_ms: u64, cmds: &mut CommandQueue) {
        if self.sounding.is_some() {
            warn!("Alarm: {:?} requested while {:?} sounding", kind, self.sounding);
            return;
        }
        let period_ms = self.timing.period_ms(kind);
        info!("Alarm: {:?} firing, toggle {}ms", kind, period_ms);
        self.sounding = Some(kind);
        self.fired_at_ms = Some(now_ms);
        cmds.push(Command::StartBuzzer {
            mode: BuzzerMode::Alarm,
            period_ms,
        });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> AlarmPhase {
        match self.sounding {
            Some(AlarmKind::High) => AlarmPhase::HighFiring,
            Some(AlarmKind::Critical | AlarmKind::CriticalRepeat) => AlarmPhase::CriticalFiring,
            None if self.repeat_since_ms.is_some() => AlarmPhase::CriticalRepeatArmed,
            None => AlarmPhase::Idle,
        }
    }

    pub fn sounding(&self) -> Option<AlarmKind> {
        self.sounding
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding.is_some()
    }

    pub fn high_armed(&self) -> bool {
        self.high_armed
    }

    pub fn critical_armed(&self) -> bool {
        self.critical_armed
    }

    /// When the pending critical repeat will fire, if one is armed.
    pub fn repeat_deadline_ms(&self) -> Option<u64> {
        self.repeat_since_ms.map(|since| since + self.timing.repeat_ms)
    }

    pub fn fired_at_ms(&self) -> Option<u64> {
        self.fired_at_ms
    }

    pub fn acknowledged_at_ms(&self) -> Option<u64> {
        self.acknowledged_at_ms
    }

    pub fn blinker(&self) -> &Blinker {
        &self.blinker
    }
}
