//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to               |
//! |----------------|--------------------|---------------------------|
//! | `display`      | DisplayPort        | Serial log (panel stand-in)|
//! | `hardware`     | RadioPort          | nRF24L01 over SPI         |
//! |                | IndicatorPort      | PWM buzzer + RGB LED      |
//! | `log_sink`     | EventSink          | Serial log output         |
//! | `nvs`          | ConfigPort         | NVS / in-memory store     |
//! | `time`         | (none)             | ESP32 system timer        |

pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
