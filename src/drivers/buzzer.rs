//! Non-blocking buzzer tone sequencer.
//!
//! The driver never touches hardware directly: [`BuzzerDriver::advance`]
//! returns whether the tone line should be energised, and the caller
//! forwards that to the indicator port.  It must be advanced every tick on
//! every page, otherwise beep lengths and the alarm cadence drift.
//!
//! ```text
//!            start(Short)          elapsed > short_ms
//!   Idle ─────────────────▶ ShortBeep ─────────────────▶ Idle
//!     │      start(Long)           elapsed > long_ms
//!     ├───────────────────▶ LongBeep  ─────────────────▶ Idle
//!     │      start(Alarm, period)
//!     └───────────────────▶ AlarmToggle ──[stop()]─────▶ Idle
//!                           (tone flips every period)
//! ```
//!
//! `start` is ignored unless the driver is idle, so a click beep can never
//! cut into a running alarm and an alarm can never be restarted with a
//! different cadence while it sounds.

use log::debug;

/// What the caller asks the buzzer to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerMode {
    /// Single short click beep.
    Short,
    /// Single long beep (long-press feedback).
    Long,
    /// Repeating on/off alarm until stopped.
    Alarm,
}

/// Current sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerState {
    Idle,
    ShortBeep,
    LongBeep,
    AlarmToggle { period_ms: u32 },
}

pub struct BuzzerDriver {
    state: BuzzerState,
    short_ms: u32,
    long_ms: u32,
    /// Start of the current beep, or of the current alarm half-period.
    since_ms: u64,
    /// Alarm toggle phase: `true` while the tone is sounding.
    toggle_on: bool,
    tone_on: bool,
}

impl BuzzerDriver {
    pub fn new(short_ms: u32, long_ms: u32) -> Self {
        Self {
            state: BuzzerState::Idle,
            short_ms,
            long_ms,
            since_ms: 0,
            toggle_on: false,
            tone_on: false,
        }
    }

    /// Begin a beep or alarm.  No-op unless currently idle.
    ///
    /// `period_ms` is only used for [`BuzzerMode::Alarm`].  Returns `true`
    /// if the command was accepted.
    pub fn start(&mut self, mode: BuzzerMode, period_ms: u32, now_ms: u64) -> bool {
        if self.state != BuzzerState::Idle {
            debug!("Buzzer: {:?} ignored, busy in {:?}", mode, self.state);
            return false;
        }

        self.state = match mode {
            BuzzerMode::Short => BuzzerState::ShortBeep,
            BuzzerMode::Long => BuzzerState::LongBeep,
            BuzzerMode::Alarm => {
                // First half-period is silent.
                self.toggle_on = false;
                BuzzerState::AlarmToggle {
                    period_ms: period_ms.max(1),
                }
            }
        };
        self.since_ms = now_ms;
        true
    }

    /// Change the single-shot beep lengths.  A beep already playing is
    /// measured against the new length from the next advance on.
    pub fn set_lengths(&mut self, short_ms: u32, long_ms: u32) {
        self.short_ms = short_ms;
        self.long_ms = long_ms;
    }

    /// Silence a running alarm.  Single-shot beeps run to completion.
    pub fn stop(&mut self) -> bool {
        if !matches!(self.state, BuzzerState::AlarmToggle { .. }) {
            return false;
        }
        self.state = BuzzerState::Idle;
        self.toggle_on = false;
        self.tone_on = false;
        true
    }

    /// Advance timing and return whether the tone should be on.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.since_ms);

        self.tone_on = match self.state {
            BuzzerState::Idle => false,
            BuzzerState::ShortBeep => self.single_shot(elapsed, self.short_ms),
            BuzzerState::LongBeep => self.single_shot(elapsed, self.long_ms),
            BuzzerState::AlarmToggle { period_ms } => {
                if elapsed >= u64::from(period_ms) {
                    self.toggle_on = !self.toggle_on;
                    self.since_ms = now_ms;
                }
                self.toggle_on
            }
        };
        self.tone_on
    }

    pub fn state(&self) -> BuzzerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == BuzzerState::Idle
    }

    /// Tone output as of the last [`advance`](Self::advance).
    pub fn tone_on(&self) -> bool {
        self.tone_on
    }

    fn single_shot(&mut self, elapsed: u64, length_ms: u32) -> bool {
        if elapsed <= u64::from(length_ms) {
            true
        } else {
            self.state = BuzzerState::Idle;
            false
        }
    }
}
