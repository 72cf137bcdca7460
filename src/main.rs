//! ThermoRx firmware entry point.
//!
//! Hexagonal architecture with a single cooperative tick loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            LogEventSink   NvsAdapter          │
//! │  (Radio+Indicator+Display)  (EventSink)    (Config)            │
//! │  ButtonPair                 MonotonicClock                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Pages · ZoneClassifier · AlarmEscalator · Severity    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::config::Config as SpiConfig;
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::units::FromValueType;
use log::{error, info, warn};

use thermorx::adapters::display::LogDisplay;
use thermorx::adapters::hardware::{HardwareAdapter, PwmIndicator, power_on_self_test};
use thermorx::adapters::log_sink::LogEventSink;
use thermorx::adapters::nvs::NvsAdapter;
use thermorx::adapters::time::MonotonicClock;
use thermorx::app::ports::ConfigPort;
use thermorx::app::service::AppService;
use thermorx::config::MonitorConfig;
use thermorx::drivers::button::ButtonPair;
use thermorx::drivers::nrf24::Nrf24Receiver;
use thermorx::pins;
use thermorx::thresholds::Thresholds;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ThermoRx v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let p = Peripherals::take()?;

    // ── 2. Load config + thresholds from NVS (or defaults) ────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let (config, thresholds) = match &nvs {
        Some(store) => (
            store.load().unwrap_or_else(|e| {
                warn!("Monitor config load failed ({}), using defaults", e);
                MonitorConfig::default()
            }),
            store.load_thresholds().unwrap_or_else(|e| {
                warn!("Threshold load failed ({}), using defaults", e);
                Thresholds::default()
            }),
        ),
        None => (MonitorConfig::default(), Thresholds::default()),
    };
    info!(
        "Thresholds: min={} normal={} high={} critical={}",
        thresholds.minimal, thresholds.normal, thresholds.high, thresholds.critical
    );

    // ── 3. Indicator PWM (buzzer + RGB) ───────────────────────
    let timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::new()
            .frequency(pins::PWM_FREQ_HZ.Hz().into())
            .resolution(Resolution::Bits8),
    )?;
    // SAFETY: each GPIO number is claimed exactly once, here, and the
    // numbers come from the board's pin table.
    let (buzzer_pin, r_pin, g_pin, b_pin) = unsafe {
        (
            AnyOutputPin::new(pins::BUZZER_GPIO),
            AnyOutputPin::new(pins::LED_R_GPIO),
            AnyOutputPin::new(pins::LED_G_GPIO),
            AnyOutputPin::new(pins::LED_B_GPIO),
        )
    };
    let mut indicator = PwmIndicator::new(
        LedcDriver::new(p.ledc.channel0, &timer, buzzer_pin)?,
        LedcDriver::new(p.ledc.channel1, &timer, r_pin)?,
        LedcDriver::new(p.ledc.channel2, &timer, g_pin)?,
        LedcDriver::new(p.ledc.channel3, &timer, b_pin)?,
    );

    // LED colour cycle and buzzer chirp.
    power_on_self_test(&mut indicator, pins::SELF_TEST_STEP_MS, FreeRtos::delay_ms);
    if let Some(e) = indicator.take_error() {
        warn!("Self-test: {}", e);
    }

    // ── 4. Radio (nRF24L01 on SPI2) ───────────────────────────
    // SAFETY: as above, one claim per GPIO number.
    let (sck, mosi, miso, csn, ce) = unsafe {
        (
            AnyOutputPin::new(pins::NRF_SCK_GPIO),
            AnyOutputPin::new(pins::NRF_MOSI_GPIO),
            AnyInputPin::new(pins::NRF_MISO_GPIO),
            AnyOutputPin::new(pins::NRF_CSN_GPIO),
            AnyOutputPin::new(pins::NRF_CE_GPIO),
        )
    };
    let spi = SpiDriver::new(p.spi2, sck, mosi, Some(miso), &SpiDriverConfig::new())?;
    let spi = SpiDeviceDriver::new(
        spi,
        Some(csn),
        &SpiConfig::new().baudrate(pins::NRF_SPI_HZ.Hz()),
    )?;
    let radio = match Nrf24Receiver::new(spi, PinDriver::output(ce)?) {
        Ok(r) => Some(r),
        Err(e) => {
            error!("Radio init failed ({}), continuing without a link", e);
            None
        }
    };

    let mut hw = HardwareAdapter::new(radio, indicator, LogDisplay::new());

    // ── 5. Buttons ────────────────────────────────────────────
    // SAFETY: as above.
    let (left_pin, right_pin) = unsafe {
        (
            AnyIOPin::new(pins::BUTTON_LEFT_GPIO),
            AnyIOPin::new(pins::BUTTON_RIGHT_GPIO),
        )
    };
    let mut left = PinDriver::input(left_pin)?;
    left.set_pull(Pull::Up)?;
    let mut right = PinDriver::input(right_pin)?;
    right.set_pull(Pull::Up)?;
    let mut buttons = ButtonPair::new();

    // ── 6. App service ────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config, thresholds);
    app.start(clock.uptime_ms(), &mut hw, &mut sink);

    info!("System ready. Entering tick loop.");

    // ── 7. Tick loop ──────────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        let input = buttons.update(left.is_low(), right.is_low(), now_ms);

        app.tick(now_ms, input, &mut hw, &mut sink);

        if let Some(store) = &nvs {
            app.flush_pending(store, &mut sink);
        }
        if let Some(e) = hw.indicator_mut().take_error() {
            warn!("Indicator fault: {}", e);
        }

        FreeRtos::delay_ms(pins::TICK_PERIOD_MS);
    }
}
