//! End-to-end monitoring scenarios: radio → classifier → escalator →
//! buzzer / RGB / display, driven through `AppService::tick` at 100 ms.
//!
//! Thresholds are the defaults `{25, 35, 55, 70}`, dwell 60 s.  The first
//! radio poll happens on the first tick (t = 100 ms), so a steady reading
//! confirms its zone at t = 60 100 ms.

use crate::mock_hw::{MockHardware, Rig};

use thermorx::alarm::AlarmPhase;
use thermorx::app::commands::AppCommand;
use thermorx::app::events::AppEvent;
use thermorx::app::ports::DisplayFrame;
use thermorx::drivers::button::ButtonInput;
use thermorx::drivers::buzzer::BuzzerState;
use thermorx::fsm::PageId;
use thermorx::severity::Rgb;
use thermorx::zone::Zone;

const CONFIRM_MS: u64 = 60_100;

/// Confirmed High alarm sounding, then acknowledged at `CONFIRM_MS + 100`.
fn acknowledged_high() -> Rig {
    let mut rig = Rig::new(MockHardware::steady(60));
    rig.run_until(CONFIRM_MS);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
    rig.click();
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::Idle);
    rig
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_shows_splash_and_main_page() {
    let rig = Rig::new(MockHardware::new());
    assert_eq!(rig.app.page(), PageId::Main);
    assert_eq!(
        rig.hw.frames().first(),
        Some(&DisplayFrame::Splash {
            version: env!("CARGO_PKG_VERSION")
        })
    );
    assert_eq!(rig.sink.events.first(), Some(&AppEvent::Started(PageId::Main)));
}

#[test]
fn first_poll_is_immediate_then_once_per_second() {
    let mut rig = Rig::new(MockHardware::steady(30));
    rig.step(ButtonInput::NONE);
    assert_eq!(rig.hw.polls, 1);
    assert_eq!(rig.hw.last_frame(), Some(DisplayFrame::Temperature(30)));

    rig.run_until(1_000);
    assert_eq!(rig.hw.polls, 1);
    rig.run_until(1_100);
    assert_eq!(rig.hw.polls, 2);
}

// ── High zone ─────────────────────────────────────────────────

#[test]
fn sustained_high_fires_high_alarm() {
    let mut rig = Rig::new(MockHardware::steady(60));

    rig.run_until(CONFIRM_MS - 100);
    assert_eq!(rig.app.current_zone(), None);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::Idle);

    rig.run_until(CONFIRM_MS);
    assert_eq!(rig.app.current_zone(), Some(Zone::High));
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
    assert_eq!(
        rig.app.buzzer_state(),
        BuzzerState::AlarmToggle { period_ms: 800 }
    );
    assert_eq!(rig.hw.last_rgb(), Some(Rgb::new(40, 0, 0)));
    assert!(!rig.hw.power_save());
    assert!(rig.sink.has(|e| matches!(
        e,
        AppEvent::ZoneConfirmed {
            zone: Zone::High,
            celsius: 60
        }
    )));
    assert!(rig.sink.has(|e| *e
        == AppEvent::AlarmChanged {
            from: AlarmPhase::Idle,
            to: AlarmPhase::HighFiring
        }));
}

#[test]
fn high_alarm_toggles_every_800_ms() {
    let mut rig = Rig::new(MockHardware::steady(60));
    rig.run_until(CONFIRM_MS);
    assert!(!rig.hw.tone_on(), "first half-period is silent");

    rig.run_until(CONFIRM_MS + 700);
    assert!(!rig.hw.tone_on());
    rig.run_until(CONFIRM_MS + 800);
    assert!(rig.hw.tone_on());
    rig.run_until(CONFIRM_MS + 1_500);
    assert!(rig.hw.tone_on());
    rig.run_until(CONFIRM_MS + 1_600);
    assert!(!rig.hw.tone_on());
}

#[test]
fn acknowledged_high_stays_silent_while_high() {
    let mut rig = acknowledged_high();
    assert_eq!(rig.app.buzzer_state(), BuzzerState::Idle);
    assert!(!rig.hw.tone_on());

    rig.run_for(300_000);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::Idle);
    assert_eq!(rig.app.buzzer_state(), BuzzerState::Idle);
}

#[test]
fn return_to_normal_rearms_high() {
    let mut rig = acknowledged_high();

    rig.hw.steady = Some(30);
    rig.run_for(62_000);
    assert_eq!(rig.app.current_zone(), Some(Zone::Normal));
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::Idle);

    rig.hw.steady = Some(60);
    rig.run_for(62_000);
    assert_eq!(rig.app.current_zone(), Some(Zone::High));
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
}

#[test]
fn stray_click_before_alarm_is_not_latched() {
    let mut rig = Rig::new(MockHardware::steady(60));
    rig.step(ButtonInput::NONE);
    rig.click();
    rig.run_until(CONFIRM_MS);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
    rig.run_for(1_000);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
}

#[test]
fn alarm_waits_for_feedback_beep_to_finish() {
    let mut rig = Rig::new(MockHardware::steady(60));
    rig.run_until(CONFIRM_MS - 100);

    // The click beep claims the buzzer on the very tick the alarm fires.
    rig.click();
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
    assert_eq!(rig.app.buzzer_state(), BuzzerState::ShortBeep);

    rig.run_for(200);
    assert_eq!(
        rig.app.buzzer_state(),
        BuzzerState::AlarmToggle { period_ms: 800 }
    );
}

// ── Critical zone ─────────────────────────────────────────────

#[test]
fn escalation_from_acknowledged_high_to_critical() {
    let mut rig = acknowledged_high();
    let switch_ms = rig.now_ms;
    rig.hw.steady = Some(80);

    // Next poll is at 61 100; the critical dwell runs from there.
    let critical_at = 61_100 + 60_000;
    assert!(switch_ms < 61_100);
    rig.run_until(critical_at - 100);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::Idle);

    rig.run_until(critical_at);
    assert_eq!(rig.app.current_zone(), Some(Zone::Critical));
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalFiring);
    assert_eq!(
        rig.app.buzzer_state(),
        BuzzerState::AlarmToggle { period_ms: 300 }
    );
}

#[test]
fn critical_blink_is_300_on_1000_off() {
    let mut rig = Rig::new(MockHardware::steady(80));
    rig.run_until(CONFIRM_MS);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalFiring);

    // Lit straight away.
    assert_eq!(rig.hw.last_red(), Some(100));
    assert!(!rig.hw.power_save());

    rig.run_until(CONFIRM_MS + 200);
    assert_eq!(rig.hw.last_red(), Some(100));
    rig.run_until(CONFIRM_MS + 300);
    assert_eq!(rig.hw.last_red(), Some(0));
    assert!(rig.hw.power_save());

    rig.run_until(CONFIRM_MS + 1_200);
    assert_eq!(rig.hw.last_red(), Some(0));
    rig.run_until(CONFIRM_MS + 1_300);
    assert_eq!(rig.hw.last_red(), Some(100));
    assert!(!rig.hw.power_save());
}

#[test]
fn critical_reading_does_not_drive_rgb_mapper() {
    let mut rig = Rig::new(MockHardware::steady(80));
    rig.run_until(CONFIRM_MS + 2_000);
    assert_eq!(rig.hw.last_rgb(), None);
    assert_eq!(rig.app.build_telemetry().rgb, None);
}

#[test]
fn acknowledged_critical_repeats_after_five_minutes() {
    let mut rig = Rig::new(MockHardware::steady(80));
    rig.run_until(CONFIRM_MS);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalFiring);

    rig.click();
    let ack_ms = rig.now_ms;
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalRepeatArmed);
    assert_eq!(rig.app.buzzer_state(), BuzzerState::Idle);
    assert!(!rig.hw.tone_on());

    rig.run_until(ack_ms + 299_900);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalRepeatArmed);

    rig.run_until(ack_ms + 300_000);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalFiring);
    assert_eq!(
        rig.app.buzzer_state(),
        BuzzerState::AlarmToggle { period_ms: 150 }
    );
}

#[test]
fn high_alarm_keeps_sounding_into_critical() {
    let mut rig = Rig::new(MockHardware::steady(60));
    rig.run_until(CONFIRM_MS);
    rig.hw.steady = Some(80);
    rig.run_for(62_000);
    assert_eq!(rig.app.current_zone(), Some(Zone::Critical));
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
    assert_eq!(
        rig.app.buzzer_state(),
        BuzzerState::AlarmToggle { period_ms: 800 }
    );
}

// ── Radio edge cases ──────────────────────────────────────────

#[test]
fn implausible_reading_pauses_monitoring() {
    let mut rig = Rig::new(MockHardware::steady(250));
    rig.run_for(70_000);
    assert_eq!(rig.hw.last_frame(), Some(DisplayFrame::Invalid));
    assert_eq!(rig.app.current_zone(), None);
    assert_eq!(rig.hw.last_rgb(), None);
}

#[test]
fn zero_is_implausible() {
    let mut rig = Rig::new(MockHardware::steady(0));
    rig.run_for(2_000);
    assert_eq!(rig.hw.last_frame(), Some(DisplayFrame::Invalid));
    assert_eq!(rig.app.build_telemetry().celsius, None);
}

#[test]
fn thirty_misses_show_no_signal_then_recover() {
    let mut rig = Rig::new(MockHardware::new());
    // Polls at 100, 1100, … ; the 30th is at 29 100.
    rig.run_until(29_000);
    assert!(!rig.hw.frames().contains(&DisplayFrame::NoSignal));
    rig.run_until(29_100);
    assert_eq!(rig.hw.last_frame(), Some(DisplayFrame::NoSignal));
    assert!(rig.sink.has(|e| *e == AppEvent::SignalLost { misses: 30 }));

    rig.hw.steady = Some(22);
    rig.run_for(1_000);
    assert_eq!(rig.hw.last_frame(), Some(DisplayFrame::Temperature(22)));
    assert!(rig.sink.has(|e| *e == AppEvent::SignalRestored));
}

#[test]
fn monitoring_continues_on_last_reading_during_dropout() {
    let mut rig = Rig::new(MockHardware::new());
    rig.hw.script.push_back(Some(60));
    // Every later poll misses.
    rig.run_until(CONFIRM_MS);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
    assert_eq!(rig.hw.last_frame(), Some(DisplayFrame::NoSignal));
}

// ── External commands ─────────────────────────────────────────

#[test]
fn acknowledge_command_silences_alarm() {
    let mut rig = Rig::new(MockHardware::steady(60));
    rig.run_until(CONFIRM_MS);
    rig.app
        .handle_command(AppCommand::Acknowledge, &mut rig.hw, &mut rig.sink);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::Idle);
    assert_eq!(rig.app.buzzer_state(), BuzzerState::Idle);
}

#[test]
fn acknowledge_command_with_nothing_sounding_changes_nothing() {
    let mut rig = Rig::new(MockHardware::steady(80));
    rig.run_until(CONFIRM_MS);
    rig.click();
    let ack_ms = rig.now_ms;
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalRepeatArmed);

    // Sit on an editor page past the repeat delay; the escalator is idle there.
    rig.step(ButtonInput::long_right());
    rig.run_until(ack_ms + 301_000);
    assert_eq!(rig.app.page(), PageId::MinTemp);
    rig.hw.clear();

    rig.app
        .handle_command(AppCommand::Acknowledge, &mut rig.hw, &mut rig.sink);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalRepeatArmed);
    assert_eq!(rig.app.buzzer_state(), BuzzerState::Idle);
    assert!(rig.hw.calls.is_empty());

    // The repeat is due and fires on the first main-page tick instead.
    rig.step(ButtonInput::long_left());
    rig.step(ButtonInput::NONE);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::CriticalFiring);
}

#[test]
fn telemetry_is_emitted_every_minute() {
    let mut rig = Rig::new(MockHardware::steady(30));
    rig.run_until(59_900);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 0);
    rig.run_until(60_000);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 1);

    let t = rig.app.build_telemetry();
    assert_eq!(t.celsius, Some(30));
    assert_eq!(t.page, PageId::Main);
    assert_eq!(t.radio_misses, 0);
}
