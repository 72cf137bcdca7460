//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! [`PwmIndicator`] drives the buzzer and the three LED channels through
//! `embedded-hal` PWM outputs.  [`HardwareAdapter`] bundles the radio,
//! indicator and display so the service can take a single `hw` argument.
//! This is the only module in the system that touches actual hardware; on
//! the host the same generics are driven by mocks.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal::spi::SpiDevice;
use log::warn;

use crate::app::ports::{DisplayFrame, DisplayPort, IndicatorPort, RadioPort};
use crate::drivers::nrf24::Nrf24Receiver;
use crate::error::IndicatorError;
use crate::severity::Rgb;

// ── RadioPort for the nRF24 driver ────────────────────────────

impl<SPI, CE> RadioPort for Nrf24Receiver<SPI, CE>
where
    SPI: SpiDevice,
    CE: OutputPin,
{
    fn receive(&mut self) -> Option<i16> {
        self.poll()
    }
}

/// A radio that failed to initialise never receives; the receiver then
/// shows "no signal" instead of the firmware halting.
impl<R: RadioPort> RadioPort for Option<R> {
    fn receive(&mut self) -> Option<i16> {
        self.as_mut().and_then(RadioPort::receive)
    }
}

// ── PWM indicator ─────────────────────────────────────────────

/// Buzzer plus common-cathode RGB LED on four PWM channels.
///
/// The buzzer is a passive piezo: "on" is a 50 % square wave at the timer
/// frequency, "off" is duty 0.  LED levels are percentages (0–100).
pub struct PwmIndicator<T, R, G, B> {
    tone: T,
    red: R,
    green: G,
    blue: B,
    last_error: Option<IndicatorError>,
}

impl<T, R, G, B> PwmIndicator<T, R, G, B>
where
    T: SetDutyCycle,
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    pub fn new(tone: T, red: R, green: G, blue: B) -> Self {
        Self {
            tone,
            red,
            green,
            blue,
            last_error: None,
        }
    }

    /// Most recent write failure, if any.  Cleared by [`Self::take_error`].
    pub fn last_error(&self) -> Option<IndicatorError> {
        self.last_error
    }

    pub fn take_error(&mut self) -> Option<IndicatorError> {
        self.last_error.take()
    }

    fn record(&mut self, failed: bool, err: IndicatorError) {
        if failed {
            warn!("Indicator: {}", err);
            self.last_error = Some(err);
        }
    }
}

impl<T, R, G, B> IndicatorPort for PwmIndicator<T, R, G, B>
where
    T: SetDutyCycle,
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    fn set_tone(&mut self, on: bool) {
        let result = if on {
            self.tone.set_duty_cycle_fraction(1, 2)
        } else {
            self.tone.set_duty_cycle_fully_off()
        };
        self.record(result.is_err(), IndicatorError::ToneWriteFailed);
    }

    fn set_rgb(&mut self, rgb: Rgb) {
        let r = self.red.set_duty_cycle_percent(rgb.red.min(100)).is_err();
        self.record(r, IndicatorError::RedWriteFailed);
        let g = self.green.set_duty_cycle_percent(rgb.green.min(100)).is_err();
        self.record(g, IndicatorError::GreenWriteFailed);
        let b = self.blue.set_duty_cycle_percent(rgb.blue.min(100)).is_err();
        self.record(b, IndicatorError::BlueWriteFailed);
    }

    fn set_red(&mut self, level: u8) {
        let r = self.red.set_duty_cycle_percent(level.min(100)).is_err();
        self.record(r, IndicatorError::RedWriteFailed);
    }
}

// ── Power-on self-test ────────────────────────────────────────

/// Length of each buzzer chirp and of the gap between them.
pub const CHIRP_MS: u32 = 50;

/// Blocking boot sequence: blue, green, red for `step_ms` each, LED off,
/// then two short buzzer chirps.
///
/// Runs before the tick loop starts; `delay_ms` is the platform's
/// blocking delay.
pub fn power_on_self_test<I: IndicatorPort>(
    indicator: &mut I,
    step_ms: u32,
    mut delay_ms: impl FnMut(u32),
) {
    for rgb in [
        Rgb::new(0, 0, Rgb::FULL),
        Rgb::new(0, Rgb::FULL, 0),
        Rgb::new(Rgb::FULL, 0, 0),
    ] {
        indicator.set_rgb(rgb);
        delay_ms(step_ms);
    }
    indicator.set_rgb(Rgb::OFF);

    indicator.set_tone(true);
    delay_ms(CHIRP_MS);
    indicator.set_tone(false);
    delay_ms(CHIRP_MS);
    indicator.set_tone(true);
    delay_ms(CHIRP_MS);
    indicator.set_tone(false);
}

// ── Combined adapter ──────────────────────────────────────────

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<RADIO, IND, DISP> {
    radio: RADIO,
    indicator: IND,
    display: DISP,
}

impl<RADIO, IND, DISP> HardwareAdapter<RADIO, IND, DISP>
where
    RADIO: RadioPort,
    IND: IndicatorPort,
    DISP: DisplayPort,
{
    pub fn new(radio: RADIO, indicator: IND, display: DISP) -> Self {
        Self {
            radio,
            indicator,
            display,
        }
    }

    pub fn indicator_mut(&mut self) -> &mut IND {
        &mut self.indicator
    }

    pub fn display_mut(&mut self) -> &mut DISP {
        &mut self.display
    }
}

impl<RADIO: RadioPort, IND, DISP> RadioPort for HardwareAdapter<RADIO, IND, DISP> {
    fn receive(&mut self) -> Option<i16> {
        self.radio.receive()
    }
}

impl<RADIO, IND: IndicatorPort, DISP> IndicatorPort for HardwareAdapter<RADIO, IND, DISP> {
    fn set_tone(&mut self, on: bool) {
        self.indicator.set_tone(on);
    }

    fn set_rgb(&mut self, rgb: Rgb) {
        self.indicator.set_rgb(rgb);
    }

    fn set_red(&mut self, level: u8) {
        self.indicator.set_red(level);
    }
}

impl<RADIO, IND, DISP: DisplayPort> DisplayPort for HardwareAdapter<RADIO, IND, DISP> {
    fn render(&mut self, frame: &DisplayFrame) {
        self.display.render(frame);
    }

    fn set_power_save(&mut self, enabled: bool) {
        self.display.set_power_save(enabled);
    }
}
