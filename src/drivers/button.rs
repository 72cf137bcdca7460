//! Polled, debounced push-button driver with click and long-press detection.
//!
//! ## Hardware
//!
//! Two active-low momentary switches with pull-ups (left and right of the
//! display).  The caller samples the pin level each tick and passes
//! `pressed = true` while the switch is closed; the driver never reads the
//! GPIO itself, which keeps it host-testable.
//!
//! ## Gesture detection
//!
//! | Gesture    | Condition                                  | Event       |
//! |------------|--------------------------------------------|-------------|
//! | Click      | Stable press released before the long time | `Click`     |
//! | Long press | Stable press held for the long time        | `LongPress` |
//!
//! A long press fires while the button is still held; the release that
//! follows is swallowed so one gesture never yields two events.

use log::debug;

pub const DEBOUNCE_MS: u32 = 50;
pub const LONG_PRESS_MS: u32 = 800;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Click,
    LongPress,
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Released,
    /// Contact seen; waiting for it to stay closed for the debounce time.
    Debounce { since_ms: u64 },
    Pressed { since_ms: u64 },
    /// Long press already reported; waiting for release.
    LongHeld,
}

pub struct ButtonDriver {
    name: &'static str,
    state: GestureState,
    debounce_ms: u32,
    long_press_ms: u32,
}

impl ButtonDriver {
    pub fn new(name: &'static str) -> Self {
        Self::with_timing(name, DEBOUNCE_MS, LONG_PRESS_MS)
    }

    pub fn with_timing(name: &'static str, debounce_ms: u32, long_press_ms: u32) -> Self {
        Self {
            name,
            state: GestureState::Released,
            debounce_ms,
            long_press_ms,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Feed the current pin level.  Call once per tick.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<ButtonEvent> {
        match self.state {
            GestureState::Released => {
                if pressed {
                    self.state = GestureState::Debounce { since_ms: now_ms };
                }
                None
            }

            GestureState::Debounce { since_ms } => {
                if !pressed {
                    // Bounce or glitch shorter than the debounce time.
                    self.state = GestureState::Released;
                } else if now_ms.saturating_sub(since_ms) >= u64::from(self.debounce_ms) {
                    self.state = GestureState::Pressed { since_ms };
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                if !pressed {
                    self.state = GestureState::Released;
                    debug!("Button {}: click", self.name);
                    return Some(ButtonEvent::Click);
                }
                if now_ms.saturating_sub(since_ms) >= u64::from(self.long_press_ms) {
                    self.state = GestureState::LongHeld;
                    debug!("Button {}: long press", self.name);
                    return Some(ButtonEvent::LongPress);
                }
                None
            }

            GestureState::LongHeld => {
                if !pressed {
                    self.state = GestureState::Released;
                }
                None
            }
        }
    }

    /// Whether the driver currently sees a debounced press.
    pub fn is_held(&self) -> bool {
        matches!(
            self.state,
            GestureState::Pressed { .. } | GestureState::LongHeld
        )
    }
}

/// One tick's worth of classified input from both buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonInput {
    pub left: Option<ButtonEvent>,
    pub right: Option<ButtonEvent>,
}

impl ButtonInput {
    pub const NONE: ButtonInput = ButtonInput {
        left: None,
        right: None,
    };

    pub fn click_left() -> Self {
        Self {
            left: Some(ButtonEvent::Click),
            right: None,
        }
    }

    pub fn click_right() -> Self {
        Self {
            left: None,
            right: Some(ButtonEvent::Click),
        }
    }

    pub fn long_left() -> Self {
        Self {
            left: Some(ButtonEvent::LongPress),
            right: None,
        }
    }

    pub fn long_right() -> Self {
        Self {
            left: None,
            right: Some(ButtonEvent::LongPress),
        }
    }

    pub fn any_click(&self) -> bool {
        self.left == Some(ButtonEvent::Click) || self.right == Some(ButtonEvent::Click)
    }

    pub fn any_long_press(&self) -> bool {
        self.left == Some(ButtonEvent::LongPress) || self.right == Some(ButtonEvent::LongPress)
    }
}

/// Left/right button pair sampled together.
pub struct ButtonPair {
    pub left: ButtonDriver,
    pub right: ButtonDriver,
}

impl ButtonPair {
    pub fn new() -> Self {
        Self {
            left: ButtonDriver::new("left"),
            right: ButtonDriver::new("right"),
        }
    }

    pub fn update(&mut self, left_pressed: bool, right_pressed: bool, now_ms: u64) -> ButtonInput {
        ButtonInput {
            left: self.left.update(left_pressed, now_ms),
            right: self.right.update(right_pressed, now_ms),
        }
    }
}

impl Default for ButtonPair {
    fn default() -> Self {
        Self::new()
    }
}
