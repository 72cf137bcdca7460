//! Function-pointer finite state machine engine for the screen pages.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageTable                                                   │
//! │  ┌──────────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ PageId       │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├──────────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Main         │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ MinTemp      │ fn(ctx)   │    -     │ fn(ctx)->Option<> │ │
//! │  │ NormalTemp   │ fn(ctx)   │    -     │ fn(ctx)->Option<> │ │
//! │  │ HighTemp     │ fn(ctx)   │    -     │ fn(ctx)->Option<> │ │
//! │  │ CriticalTemp │ fn(ctx)   │    -     │ fn(ctx)->Option<> │ │
//! │  └──────────────┴───────────┴──────────┴───────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** page.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current page, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut MonitorContext` which
//! holds the inputs, the core state machines, config, and timing.

pub mod context;
pub mod pages;

use context::MonitorContext;
use log::info;
use serde::Serialize;

use crate::thresholds::ThresholdField;

// ---------------------------------------------------------------------------
// Page identity
// ---------------------------------------------------------------------------

/// Enumeration of all screens.
/// Must stay in sync with the table built in [`pages::build_page_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum PageId {
    Main = 0,
    MinTemp = 1,
    NormalTemp = 2,
    HighTemp = 3,
    CriticalTemp = 4,
}

impl PageId {
    /// Total number of pages, used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert an index back to `PageId`.  Panics on out-of-range in
    /// debug builds; returns `Main` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Main,
            1 => Self::MinTemp,
            2 => Self::NormalTemp,
            3 => Self::HighTemp,
            4 => Self::CriticalTemp,
            _ => {
                debug_assert!(false, "invalid page index: {idx}");
                Self::Main
            }
        }
    }

    /// The threshold an editor page works on (`None` for the main page).
    pub fn editor_field(self) -> Option<ThresholdField> {
        match self {
            Self::Main => None,
            Self::MinTemp => Some(ThresholdField::Minimal),
            Self::NormalTemp => Some(ThresholdField::Normal),
            Self::HighTemp => Some(ThresholdField::High),
            Self::CriticalTemp => Some(ThresholdField::Critical),
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each page transition.
pub type PageActionFn = fn(&mut MonitorContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type PageUpdateFn = fn(&mut MonitorContext) -> Option<PageId>;

// ---------------------------------------------------------------------------
// Page descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single page.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct PageDescriptor {
    pub id: PageId,
    pub name: &'static str,
    pub on_enter: Option<PageActionFn>,
    pub on_exit: Option<PageActionFn>,
    pub on_update: PageUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The page state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `PageId as usize`.
    table: [PageDescriptor; PageId::COUNT],
    /// Index of the currently active page.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current page was entered.
    page_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given page table, starting on `initial`.
    pub fn new(table: [PageDescriptor; PageId::COUNT], initial: PageId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            page_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting page.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut MonitorContext) {
        info!("FSM starting on page: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current page.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut MonitorContext) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Jump straight to `next`, running exit/enter actions.
    pub fn force_transition(&mut self, next: PageId, ctx: &mut MonitorContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current page's identity.
    pub fn current_page(&self) -> PageId {
        PageId::from_index(self.current)
    }

    /// How many ticks the FSM has been on the current page.
    pub fn ticks_in_current_page(&self) -> u64 {
        self.tick_count - self.page_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: PageId, ctx: &mut MonitorContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.page_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
