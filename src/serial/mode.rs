//! Operating-mode validation and register-level encoding.
//!
//! `begin` hands a [`Mode`] and a baud rate to [`ModePlan::prepare`],
//! which either rejects the request or yields every register value the
//! hardware needs. Nothing touches the port until a whole plan exists,
//! so a rejected configuration leaves prior state intact.

use super::error::ConfigError;
use super::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Full,
    /// Shared line; the receiver is muted while transmitting so the
    /// port does not read back its own bytes.
    Half,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Async,
    /// Clocked by the remote host over XCK.
    SyncClient,
    /// Drives the XCK clock itself; needs an XCK route in the active
    /// pin set.
    SyncHost,
}

/// Requested frame format and operating variant, always carried as
/// named fields, never as a packed register image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// 5..=8. The hardware also knows a 9-bit frame, but this driver's
    /// data path is byte wide and does not offer it.
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub duplex: Duplex,
    pub protocol: Protocol,
}

/// 8N1, full duplex, asynchronous.
impl Default for Mode {
    fn default() -> Self {
        Self {
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            duplex: Duplex::Full,
            protocol: Protocol::Async,
        }
    }
}

// CTRLC bit fields of the tinyAVR USART.
const CMODE_SYNC: u8 = 0x40;
const PMODE_EVEN: u8 = 0x20;
const PMODE_ODD: u8 = 0x30;
const SBMODE_2BIT: u8 = 0x08;

impl Mode {
    /// Frame-format register image, or `BadMode` for a frame the unit
    /// (or this driver) cannot do.
    fn ctrlc(&self) -> Result<u8, ConfigError> {
        if !(5..=8).contains(&self.data_bits) {
            return Err(ConfigError::BadMode);
        }
        let chsize = self.data_bits - 5;
        let pmode = match self.parity {
            Parity::None => 0,
            Parity::Even => PMODE_EVEN,
            Parity::Odd => PMODE_ODD,
        };
        let sbmode = match self.stop_bits {
            StopBits::One => 0,
            StopBits::Two => SBMODE_2BIT,
        };
        let cmode = match self.protocol {
            Protocol::Async => 0,
            Protocol::SyncClient | Protocol::SyncHost => CMODE_SYNC,
        };
        Ok(cmode | pmode | sbmode | chsize)
    }
}

/// BAUD register value. The generator counts in 1/64 bit increments;
/// asynchronous normal mode samples 16 times per bit, the synchronous
/// modes twice.
pub(crate) fn baud_setting(
    clock_hz: u32,
    baud: u32,
    protocol: Protocol,
) -> Result<u16, ConfigError> {
    if baud == 0 {
        return Err(ConfigError::BadBaud);
    }
    let samples: u64 = match protocol {
        Protocol::Async => 16,
        Protocol::SyncClient | Protocol::SyncHost => 2,
    };
    let den = samples * baud as u64;
    let setting = (64 * clock_hz as u64 + den / 2) / den;
    // the counter compare floor is 0x40
    if (0x40..=0xffff).contains(&setting) {
        Ok(setting as u16)
    } else {
        Err(ConfigError::BadBaud)
    }
}

/// Fully validated register plan for one `begin`, handed whole to
/// [`UsartOps::enable`](super::usart::UsartOps::enable).
pub struct ModePlan {
    pub baud_reg: u16,
    pub ctrlc: u8,
    pub half_duplex: bool,
    pub sync_host: bool,
    pub mux: u8,
}

impl ModePlan {
    pub(crate) fn prepare(
        unit: u8,
        pin_set: u8,
        baud: u32,
        mode: &Mode,
        clock_hz: u32,
    ) -> Result<Self, ConfigError> {
        let ctrlc = mode.ctrlc()?;
        let set = pins::pin_set(unit, pin_set).ok_or(ConfigError::BadPins)?;
        if mode.protocol != Protocol::Async && set.xck == pins::NOT_A_PIN {
            return Err(ConfigError::BadMode);
        }
        let baud_reg = baud_setting(clock_hz, baud, mode.protocol)?;
        Ok(Self {
            baud_reg,
            ctrlc,
            half_duplex: mode.duplex == Duplex::Half,
            sync_host: mode.protocol == Protocol::SyncHost,
            mux: pin_set,
        })
    }
}
