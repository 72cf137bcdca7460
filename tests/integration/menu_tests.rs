//! Page navigation, threshold editing and persistence through the
//! `AppService` API.

use crate::mock_hw::{MockHardware, MockStore, Rig};

use thermorx::alarm::AlarmPhase;
use thermorx::app::commands::AppCommand;
use thermorx::app::events::AppEvent;
use thermorx::app::ports::DisplayFrame;
use thermorx::config::MonitorConfig;
use thermorx::drivers::button::ButtonInput;
use thermorx::drivers::buzzer::BuzzerState;
use thermorx::fsm::PageId;
use thermorx::thresholds::{ThresholdField, Thresholds};

fn editor(field: ThresholdField, value: u8) -> DisplayFrame {
    DisplayFrame::ThresholdEditor { field, value }
}

// ── Navigation ────────────────────────────────────────────────

#[test]
fn long_right_cycles_through_every_page() {
    let mut rig = Rig::new(MockHardware::new());
    let expected = [
        PageId::MinTemp,
        PageId::NormalTemp,
        PageId::HighTemp,
        PageId::CriticalTemp,
        PageId::Main,
    ];
    for page in expected {
        rig.step(ButtonInput::long_right());
        assert_eq!(rig.app.page(), page);
    }
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::PageChanged { .. })),
        5
    );
}

#[test]
fn long_left_from_main_opens_critical_editor() {
    let mut rig = Rig::new(MockHardware::new());
    rig.step(ButtonInput::long_left());
    assert_eq!(rig.app.page(), PageId::CriticalTemp);
    assert_eq!(rig.hw.last_frame(), Some(editor(ThresholdField::Critical, 70)));
    assert!(rig.sink.has(|e| *e
        == AppEvent::PageChanged {
            from: PageId::Main,
            to: PageId::CriticalTemp
        }));
}

#[test]
fn long_press_gives_long_beep() {
    let mut rig = Rig::new(MockHardware::new());
    rig.step(ButtonInput::long_right());
    assert_eq!(rig.app.buzzer_state(), BuzzerState::LongBeep);
    assert!(rig.hw.tone_on());
    rig.run_for(200);
    assert_eq!(rig.app.buzzer_state(), BuzzerState::Idle);
    assert!(!rig.hw.tone_on());
}

#[test]
fn leaving_main_wakes_the_display() {
    let mut rig = Rig::new(MockHardware::new());
    rig.step(ButtonInput::long_right());
    assert!(!rig.hw.power_save());
}

#[test]
fn radio_is_only_polled_on_main() {
    let mut rig = Rig::new(MockHardware::steady(30));
    rig.step(ButtonInput::NONE);
    assert_eq!(rig.hw.polls, 1);

    rig.step(ButtonInput::long_right());
    rig.run_for(5_000);
    assert_eq!(rig.hw.polls, 1);

    // The navigation tick back to main does not poll either.
    rig.step(ButtonInput::long_left());
    assert_eq!(rig.app.page(), PageId::Main);
    assert_eq!(rig.hw.polls, 1);

    rig.step(ButtonInput::NONE);
    assert_eq!(rig.hw.polls, 2);
}

// ── Editing ───────────────────────────────────────────────────

#[test]
fn minimal_editor_adjusts_and_saves_on_return() {
    let store = MockStore::new();
    let mut rig = Rig::new(MockHardware::new());

    rig.step(ButtonInput::long_right());
    assert_eq!(rig.hw.last_frame(), Some(editor(ThresholdField::Minimal, 25)));

    rig.step(ButtonInput::click_right());
    assert_eq!(rig.hw.last_frame(), Some(editor(ThresholdField::Minimal, 26)));
    rig.step(ButtonInput::click_left());
    rig.step(ButtonInput::click_left());
    assert_eq!(rig.hw.last_frame(), Some(editor(ThresholdField::Minimal, 24)));
    assert!(rig.app.is_thresholds_dirty());
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ThresholdsChanged(_))),
        3
    );

    // Nothing is written while still editing.
    assert!(!rig.app.flush_pending(&store, &mut rig.sink));

    rig.step(ButtonInput::long_left());
    assert_eq!(rig.app.page(), PageId::Main);
    assert!(rig.app.flush_pending(&store, &mut rig.sink));

    let saved = Thresholds::new(24, 35, 55, 70).unwrap();
    assert_eq!(*store.thresholds.borrow(), Some(saved));
    assert_eq!(store.threshold_writes.get(), 1);
    assert!(!rig.app.is_thresholds_dirty());
    assert!(rig.sink.has(|e| *e == AppEvent::ThresholdsSaved(saved)));
}

#[test]
fn unchanged_thresholds_are_not_rewritten() {
    let store = MockStore::new();
    let mut rig = Rig::new(MockHardware::new());
    rig.step(ButtonInput::long_right());
    rig.step(ButtonInput::long_left());
    assert!(!rig.app.flush_pending(&store, &mut rig.sink));
    assert_eq!(store.threshold_writes.get(), 0);
}

#[test]
fn normal_editor_stops_at_window_edges() {
    let mut rig = Rig::new(MockHardware::new());
    rig.step(ButtonInput::long_right());
    rig.step(ButtonInput::long_right());
    assert_eq!(rig.app.page(), PageId::NormalTemp);

    // Window is [minimal + 1, high - 1] = [26, 54].
    for _ in 0..30 {
        rig.step(ButtonInput::click_right());
    }
    assert_eq!(rig.app.thresholds().normal, 54);

    for _ in 0..40 {
        rig.step(ButtonInput::click_left());
    }
    assert_eq!(rig.app.thresholds().normal, 26);
    assert!(rig.app.thresholds().is_ordered());
}

#[test]
fn critical_editor_caps_at_150() {
    let mut rig = Rig::new(MockHardware::new());
    rig.step(ButtonInput::long_left());
    for _ in 0..100 {
        rig.step(ButtonInput::click_right());
    }
    assert_eq!(rig.app.thresholds().critical, 150);
    assert_eq!(rig.hw.last_frame(), Some(editor(ThresholdField::Critical, 150)));
}

#[test]
fn editing_restarts_pending_dwell() {
    let mut rig = Rig::new(MockHardware::steady(60));
    rig.run_until(30_000);

    rig.step(ButtonInput::long_left()); // 30 100: CriticalTemp
    rig.step(ButtonInput::click_left()); // 30 200: critical 69
    rig.step(ButtonInput::long_right()); // 30 300: back to Main
    assert_eq!(rig.app.thresholds().critical, 69);

    // Dwell restarts on the first main tick, 30 400.
    rig.run_until(60_100);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::Idle);
    rig.run_until(90_300);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::Idle);
    rig.run_until(90_400);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);
}

// ── Persistence failures & external commands ──────────────────

#[test]
fn failed_save_is_retried_on_request() {
    let store = MockStore::new();
    store.fail_writes.set(true);
    let mut rig = Rig::new(MockHardware::new());

    rig.step(ButtonInput::long_right());
    rig.step(ButtonInput::click_right());
    rig.step(ButtonInput::long_left());
    assert!(!rig.app.flush_pending(&store, &mut rig.sink));
    assert!(rig.app.is_thresholds_dirty());

    store.fail_writes.set(false);
    rig.app
        .handle_command(AppCommand::SaveThresholds, &mut rig.hw, &mut rig.sink);
    assert!(rig.app.flush_pending(&store, &mut rig.sink));
    assert_eq!(store.thresholds.borrow().map(|t| t.minimal), Some(26));
}

#[test]
fn set_thresholds_rejects_unordered() {
    let store = MockStore::new();
    let mut rig = Rig::new(MockHardware::new());
    let bad = Thresholds {
        minimal: 40,
        normal: 30,
        high: 55,
        critical: 70,
    };
    rig.app
        .handle_command(AppCommand::SetThresholds(bad), &mut rig.hw, &mut rig.sink);
    assert_eq!(rig.app.thresholds(), Thresholds::default());
    assert!(!rig.app.flush_pending(&store, &mut rig.sink));

    let good = Thresholds::new(20, 30, 50, 90).unwrap();
    rig.app
        .handle_command(AppCommand::SetThresholds(good), &mut rig.hw, &mut rig.sink);
    assert_eq!(rig.app.thresholds(), good);
    assert!(rig.app.flush_pending(&store, &mut rig.sink));
    assert_eq!(*store.thresholds.borrow(), Some(good));
}

#[test]
fn update_config_changes_dwell_and_persists() {
    let store = MockStore::new();
    let mut rig = Rig::new(MockHardware::steady(60));
    let cfg = MonitorConfig {
        dwell_secs: 5,
        ..MonitorConfig::default()
    };
    rig.app
        .handle_command(AppCommand::UpdateConfig(cfg.clone()), &mut rig.hw, &mut rig.sink);
    assert_eq!(rig.app.current_config(), cfg);

    rig.run_until(5_100);
    assert_eq!(rig.app.alarm_phase(), AlarmPhase::HighFiring);

    assert!(rig.app.flush_pending(&store, &mut rig.sink));
    assert_eq!(*store.config.borrow(), Some(cfg));
}

#[test]
fn update_config_rejects_invalid() {
    let mut rig = Rig::new(MockHardware::new());
    let cfg = MonitorConfig {
        dwell_secs: 0,
        ..MonitorConfig::default()
    };
    rig.app
        .handle_command(AppCommand::UpdateConfig(cfg), &mut rig.hw, &mut rig.sink);
    assert_eq!(rig.app.current_config(), MonitorConfig::default());
}

#[test]
fn show_page_jumps_directly() {
    let mut rig = Rig::new(MockHardware::new());
    rig.app.handle_command(
        AppCommand::ShowPage(PageId::HighTemp),
        &mut rig.hw,
        &mut rig.sink,
    );
    assert_eq!(rig.app.page(), PageId::HighTemp);
    assert_eq!(rig.hw.last_frame(), Some(editor(ThresholdField::High, 55)));
}
