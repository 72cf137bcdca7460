//! Peripheral drivers: button gestures, buzzer sequencer, radio receiver.

pub mod button;
pub mod buzzer;
pub mod nrf24;
