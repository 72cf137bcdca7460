//! nRF24L01(+) receive-only driver.
//!
//! ## Hardware
//!
//! SPI (mode 0, ≤ 8 MHz) plus a CE line.  The transmitter sends one
//! little-endian signed integer per fixed 32-byte payload on pipe 0.
//!
//! ## Link parameters
//!
//! | Setting       | Value                         |
//! |---------------|-------------------------------|
//! | Address       | `"00001"` (5 bytes, pipe 0)   |
//! | Channel       | 76                            |
//! | Data rate     | 1 Mbps                        |
//! | CRC           | 16-bit                        |
//! | Auto-ack      | on                            |
//! | Payload       | 32 bytes, static              |
//! | PA level      | max                           |
//!
//! These match the stock transmitter firmware's defaults.  The driver is
//! generic over `embedded-hal` 1.0 traits, so the host tests drive it with
//! a register-file mock.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::{info, warn};

use crate::error::Error;

pub const PIPE0_ADDRESS: [u8; 5] = *b"00001";
pub const CHANNEL: u8 = 76;
pub const PAYLOAD_LEN: usize = 32;

// Commands
const R_REGISTER: u8 = 0x00;
const W_REGISTER: u8 = 0x20;
const R_RX_PAYLOAD: u8 = 0x61;
const FLUSH_RX: u8 = 0xE2;

// Registers
pub(crate) mod reg {
    pub const CONFIG: u8 = 0x00;
    pub const EN_AA: u8 = 0x01;
    pub const EN_RXADDR: u8 = 0x02;
    pub const SETUP_AW: u8 = 0x03;
    pub const RF_CH: u8 = 0x05;
    pub const RF_SETUP: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const RX_PW_P0: u8 = 0x11;
    pub const FIFO_STATUS: u8 = 0x17;
}

/// EN_CRC | CRCO (16-bit) | PWR_UP | PRIM_RX
const CONFIG_RX: u8 = 0b0000_1111;
/// 1 Mbps, 0 dBm, LNA gain.
const RF_SETUP_1MBPS_MAX: u8 = 0b0000_0111;
/// 5-byte addresses.
const SETUP_AW_5: u8 = 0b11;
const STATUS_CLEAR: u8 = 0b0111_0000;
const STATUS_RX_DR: u8 = 0b0100_0000;
const FIFO_RX_EMPTY: u8 = 0b0000_0001;

pub struct Nrf24Receiver<SPI, CE> {
    spi: SPI,
    ce: CE,
    errors: u32,
}

impl<SPI, CE> Nrf24Receiver<SPI, CE>
where
    SPI: SpiDevice,
    CE: OutputPin,
{
    /// Configure the radio for listening on pipe 0 and raise CE.
    pub fn new(spi: SPI, ce: CE) -> Result<Self, Error> {
        let mut radio = Self { spi, ce, errors: 0 };
        radio.ce.set_low().map_err(|_| Error::Init("nRF24 CE pin"))?;
        radio
            .configure()
            .map_err(|_| Error::Init("nRF24 SPI transfer failed"))?;

        if radio.read_register(reg::SETUP_AW).ok() != Some(SETUP_AW_5) {
            return Err(Error::Init("nRF24 not responding"));
        }

        radio.ce.set_high().map_err(|_| Error::Init("nRF24 CE pin"))?;
        info!(
            "nRF24: listening on ch{} addr {:?}",
            CHANNEL,
            core::str::from_utf8(&PIPE0_ADDRESS).unwrap_or("?")
        );
        Ok(radio)
    }

    fn configure(&mut self) -> Result<(), SPI::Error> {
        self.write_register(reg::CONFIG, CONFIG_RX & !0b10)?; // powered down while configuring
        self.write_register(reg::SETUP_AW, SETUP_AW_5)?;
        self.write_register(reg::RF_CH, CHANNEL)?;
        self.write_register(reg::RF_SETUP, RF_SETUP_1MBPS_MAX)?;
        self.write_register(reg::EN_AA, 0b0011_1111)?;
        self.write_register(reg::EN_RXADDR, 0b0000_0001)?;
        self.write_multi(reg::RX_ADDR_P0, &PIPE0_ADDRESS)?;
        self.write_register(reg::RX_PW_P0, PAYLOAD_LEN as u8)?;
        self.command(FLUSH_RX)?;
        self.write_register(reg::STATUS, STATUS_CLEAR)?;
        self.write_register(reg::CONFIG, CONFIG_RX)
    }

    /// Pop one payload if the RX FIFO has one.  SPI failures are logged
    /// and reported as "nothing received".
    pub fn poll(&mut self) -> Option<i16> {
        match self.try_poll() {
            Ok(value) => value,
            Err(_) => {
                self.errors = self.errors.saturating_add(1);
                warn!("nRF24: SPI error during poll ({} total)", self.errors);
                None
            }
        }
    }

    fn try_poll(&mut self) -> Result<Option<i16>, SPI::Error> {
        let fifo = self.read_register(reg::FIFO_STATUS)?;
        if fifo & FIFO_RX_EMPTY != 0 {
            return Ok(None);
        }

        let mut buf = [0u8; PAYLOAD_LEN + 1];
        buf[0] = R_RX_PAYLOAD;
        self.spi.transfer_in_place(&mut buf)?;
        self.write_register(reg::STATUS, STATUS_RX_DR)?;

        Ok(Some(decode_payload(&buf[1..])))
    }

    /// SPI errors seen since start-up.
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    fn read_register(&mut self, register: u8) -> Result<u8, SPI::Error> {
        let mut buf = [R_REGISTER | register, 0];
        self.spi.transfer_in_place(&mut buf)?;
        Ok(buf[1])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), SPI::Error> {
        let mut buf = [W_REGISTER | register, value];
        self.spi.transfer_in_place(&mut buf)
    }

    fn write_multi(&mut self, register: u8, data: &[u8; 5]) -> Result<(), SPI::Error> {
        let mut buf = [0u8; 6];
        buf[0] = W_REGISTER | register;
        buf[1..].copy_from_slice(data);
        self.spi.transfer_in_place(&mut buf)
    }

    fn command(&mut self, cmd: u8) -> Result<(), SPI::Error> {
        let mut buf = [cmd];
        self.spi.transfer_in_place(&mut buf)
    }
}

/// The transmitter's integer width depends on its MCU, so read four bytes
/// little-endian (a 2-byte sender leaves the upper half zero) and saturate
/// into `i16`.  Out-of-range values end up implausible either way.
pub fn decode_payload(payload: &[u8]) -> i16 {
    let mut raw = [0u8; 4];
    let n = payload.len().min(4);
    raw[..n].copy_from_slice(&payload[..n]);
    let wide = i32::from_le_bytes(raw);
    i16::try_from(wide).unwrap_or(if wide < 0 { i16::MIN } else { i16::MAX })
}
