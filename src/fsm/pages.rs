//! Concrete page handler functions and table builder.
//!
//! Each page is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!        long-right          long-right            long-right          long-right
//!  MAIN ───────────▶ MIN TEMP ───────────▶ NORMAL TEMP ───────────▶ HIGH TEMP ───────────▶ CRITICAL TEMP
//!   ▲  ◀─────────── long-left  ◀───────── long-left    ◀────────── long-left   ◀────────── long-left   │
//!   │                                                                                                  │
//!   └──────────────────────────── long-right (CRITICAL → MAIN) / long-left (MAIN → CRITICAL) ──────────┘
//! ```
//!
//! The main page runs the monitoring step.  Editor pages adjust one
//! threshold with clicks (left = down, right = up).

use log::{debug, info};

use super::context::{Command, MonitorContext};
use super::{PageDescriptor, PageId};
use crate::app::ports::DisplayFrame;
use crate::drivers::button::ButtonEvent;
use crate::severity;
use crate::thresholds::{Step, ThresholdField};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static page table.  Called once at startup.
pub fn build_page_table() -> [PageDescriptor; PageId::COUNT] {
    [
        PageDescriptor {
            id: PageId::Main,
            name: "Main",
            on_enter: Some(main_enter),
            on_exit: Some(main_exit),
            on_update: main_update,
        },
        PageDescriptor {
            id: PageId::MinTemp,
            name: "MinTemp",
            on_enter: Some(min_enter),
            on_exit: None,
            on_update: min_update,
        },
        PageDescriptor {
            id: PageId::NormalTemp,
            name: "NormalTemp",
            on_enter: Some(normal_enter),
            on_exit: None,
            on_update: normal_update,
        },
        PageDescriptor {
            id: PageId::HighTemp,
            name: "HighTemp",
            on_enter: Some(high_enter),
            on_exit: None,
            on_update: high_update,
        },
        PageDescriptor {
            id: PageId::CriticalTemp,
            name: "CriticalTemp",
            on_enter: Some(critical_enter),
            on_exit: None,
            on_update: critical_update,
        },
    ]
}

/// Long-press navigation: `(long-left, long-right)` targets.
fn neighbours(page: PageId) -> (PageId, PageId) {
    match page {
        PageId::Main => (PageId::CriticalTemp, PageId::MinTemp),
        PageId::MinTemp => (PageId::Main, PageId::NormalTemp),
        PageId::NormalTemp => (PageId::MinTemp, PageId::HighTemp),
        PageId::HighTemp => (PageId::NormalTemp, PageId::CriticalTemp),
        PageId::CriticalTemp => (PageId::HighTemp, PageId::Main),
    }
}

fn navigate(ctx: &MonitorContext, page: PageId) -> Option<PageId> {
    let (left, right) = neighbours(page);
    if ctx.input.left == Some(ButtonEvent::LongPress) {
        return Some(left);
    }
    if ctx.input.right == Some(ButtonEvent::LongPress) {
        return Some(right);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN page: live temperature, zone classification, alarms
// ═══════════════════════════════════════════════════════════════════════════

fn main_enter(ctx: &mut MonitorContext) {
    if ctx.thresholds_dirty {
        info!("MAIN: thresholds edited, saving {:?}", ctx.thresholds);
        ctx.commands.push(Command::SaveThresholds);
        // Bands moved: dwell started under the old values no longer counts.
        ctx.classifier.reset_pending();
    }
    if let Some(frame) = ctx.receiver_frame() {
        ctx.commands.push(Command::Render(frame));
    }
}

fn main_exit(ctx: &mut MonitorContext) {
    // The critical blink may have left the screen in power-save.
    ctx.commands.push(Command::DisplayPowerSave(false));
}

fn main_update(ctx: &mut MonitorContext) -> Option<PageId> {
    if let Some(next) = navigate(ctx, PageId::Main) {
        return Some(next);
    }

    if let Some(raw) = ctx.radio_rx.take() {
        let outcome = ctx.receiver.ingest(raw, ctx.now_ms);
        if let Some(frame) = frame_for(outcome) {
            ctx.commands.push(Command::Render(frame));
        }
    }

    let temp = ctx.receiver.plausible_celsius()?;
    monitor(ctx, temp);
    None
}

fn frame_for(outcome: crate::sensors::PollOutcome) -> Option<DisplayFrame> {
    use crate::sensors::PollOutcome;
    match outcome {
        PollOutcome::Received(reading) => Some(reading.frame()),
        PollOutcome::Missed {
            no_signal: true, ..
        } => Some(DisplayFrame::NoSignal),
        PollOutcome::Missed { .. } => None,
    }
}

/// One monitoring step: classifier → escalator → severity indicator.
fn monitor(ctx: &mut MonitorContext, temp: i16) {
    let now = ctx.now_ms;
    let confirmed = ctx.classifier.update(temp, &ctx.thresholds, now);
    // Any click on the main page acknowledges; with nothing sounding it is
    // simply dropped.
    let acknowledge = ctx.input.any_click();
    ctx.escalator
        .update(confirmed, acknowledge, now, &mut ctx.commands);

    ctx.rgb = severity::map(temp, &ctx.thresholds);
    if let Some(rgb) = ctx.rgb {
        ctx.commands.push(Command::SetRgb(rgb));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Threshold editor pages
// ═══════════════════════════════════════════════════════════════════════════

fn render_editor(ctx: &mut MonitorContext, field: ThresholdField) {
    ctx.commands.push(Command::Render(DisplayFrame::ThresholdEditor {
        field,
        value: ctx.thresholds.get(field),
    }));
}

fn editor_update(ctx: &mut MonitorContext, page: PageId, field: ThresholdField) -> Option<PageId> {
    if let Some(next) = navigate(ctx, page) {
        return Some(next);
    }

    let mut changed = false;
    for (event, step) in [(ctx.input.left, Step::Down), (ctx.input.right, Step::Up)] {
        if event != Some(ButtonEvent::Click) {
            continue;
        }
        if ctx.thresholds.adjust(field, step) {
            changed = true;
        } else {
            let (lo, hi) = ctx.thresholds.bounds(field);
            debug!(
                "{}: {:?} rejected at {} (window {}..={})",
                field,
                step,
                ctx.thresholds.get(field),
                lo,
                hi
            );
        }
    }

    if changed {
        ctx.thresholds_dirty = true;
        render_editor(ctx, field);
    }
    None
}

fn min_enter(ctx: &mut MonitorContext) {
    render_editor(ctx, ThresholdField::Minimal);
}

fn min_update(ctx: &mut MonitorContext) -> Option<PageId> {
    editor_update(ctx, PageId::MinTemp, ThresholdField::Minimal)
}

fn normal_enter(ctx: &mut MonitorContext) {
    render_editor(ctx, ThresholdField::Normal);
}

fn normal_update(ctx: &mut MonitorContext) -> Option<PageId> {
    editor_update(ctx, PageId::NormalTemp, ThresholdField::Normal)
}

fn high_enter(ctx: &mut MonitorContext) {
    render_editor(ctx, ThresholdField::High);
}

fn high_update(ctx: &mut MonitorContext) -> Option<PageId> {
    editor_update(ctx, PageId::HighTemp, ThresholdField::High)
}

fn critical_enter(ctx: &mut MonitorContext) {
    render_editor(ctx, ThresholdField::Critical);
}

fn critical_update(ctx: &mut MonitorContext) -> Option<PageId> {
    editor_update(ctx, PageId::CriticalTemp, ThresholdField::Critical)
}
