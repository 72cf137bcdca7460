//! GPIO / peripheral pin assignments for the ThermoRx receiver board
//! (ESP32-S3).
//!
//! Single source of truth: `main` takes every pin from here rather than
//! hard-coding numbers.

// ---------------------------------------------------------------------------
// nRF24L01 radio (SPI2)
// ---------------------------------------------------------------------------

pub const NRF_SCK_GPIO: i32 = 36;
pub const NRF_MOSI_GPIO: i32 = 35;
pub const NRF_MISO_GPIO: i32 = 37;
/// Chip select, driven by the SPI peripheral.
pub const NRF_CSN_GPIO: i32 = 10;
/// Chip enable: HIGH keeps the receiver listening.
pub const NRF_CE_GPIO: i32 = 9;
/// SPI clock for the radio.
pub const NRF_SPI_HZ: u32 = 4_000_000;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Piezo buzzer, LEDC channel 0.
pub const BUZZER_GPIO: i32 = 4;

/// Common-cathode RGB severity LED, LEDC channels 1–3.
pub const LED_R_GPIO: i32 = 11;
pub const LED_G_GPIO: i32 = 12;
pub const LED_B_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_LEFT_GPIO: i32 = 16;
pub const BUTTON_RIGHT_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Shared LEDC frequency: audible tone for the buzzer, flicker-free for
/// the LED.
pub const PWM_FREQ_HZ: u32 = 4_000;

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Delay between ticks.  Shorter than the 50 ms beep so feedback tones
/// keep their length.
pub const TICK_PERIOD_MS: u32 = 10;
/// Length of each colour step in the boot LED self-test.
pub const SELF_TEST_STEP_MS: u32 = 500;
