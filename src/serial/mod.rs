//! The public serial port surface.
//!
//! One [`Serial`] instance exists per physical unit and owns it for the
//! life of the program. All state lives in the unit's static cell; the
//! methods here enter one short critical section per step and never
//! spin inside one, so the unit's vectors keep running underneath any
//! blocking call.

mod error;
mod hex;
mod mode;
pub mod pins;
mod port;
mod usart;

#[cfg(target_arch = "avr")]
pub mod interrupt;
#[cfg(test)]
mod mock;

pub use error::{ConfigError, SerialError};
pub use mode::{Duplex, Mode, ModePlan, Parity, Protocol, StopBits};
pub use pins::{PinRole, PinSet, NOT_A_PIN};
pub use port::{PortCell, PortState, RX_BUFFER_SIZE, TX_BUFFER_SIZE};
pub use usart::UsartOps;

#[cfg(target_arch = "avr")]
pub use interrupt::{serial0, Usart0, F_CLK_PER};

use crate::tools::str_writer::StrWriter;

/// Stack buffer for one `write_fmt` rendering.
const FMT_BUFFER_SIZE: usize = 64;

/// Byte-stream API over one USART unit.
pub struct Serial<U: UsartOps + 'static> {
    cell: &'static PortCell<U>,
}

impl<U: UsartOps + 'static> Serial<U> {
    /// Seeds a unit's static cell with its hardware handle and binds
    /// the one API instance to it. The port starts idle; `begin` arms
    /// it.
    pub fn attach(cell: &'static PortCell<U>, usart: U, unit: u8, default_pin_set: u8) -> Self {
        critical_section::with(|cs| {
            cell.borrow(cs)
                .borrow_mut()
                .replace(PortState::new(usart, unit, default_pin_set));
        });
        Self { cell }
    }

    fn with_port<R>(&mut self, idle: R, f: impl FnOnce(&mut PortState<U>) -> R) -> R {
        critical_section::with(|cs| {
            match self.cell.borrow(cs).borrow_mut().as_mut() {
                Some(port) => f(port),
                None => idle,
            }
        })
    }

    fn with_port_ref<R>(&self, idle: R, f: impl FnOnce(&PortState<U>) -> R) -> R {
        critical_section::with(|cs| match self.cell.borrow(cs).borrow().as_ref() {
            Some(port) => f(port),
            None => idle,
        })
    }

    /// Validates and applies `mode` at `baud`. On an already-armed port
    /// this finishes pending output first, then reconfigures. On error
    /// nothing changes and the port keeps its previous state.
    pub fn begin(&mut self, baud: u32, mode: Mode) -> Result<(), ConfigError> {
        self.flush();
        self.with_port(Err(ConfigError::BadMode), |port| port.begin(baud, &mode))
    }

    /// Finishes pending output, then disarms the unit and resets it.
    /// Safe in any state.
    pub fn end(&mut self) {
        self.flush();
        self.with_port((), |port| port.shut_down());
    }

    /// Queues one byte for transmission; returns the count accepted
    /// (0 only while idle). Blocks when the queue is full, spinning
    /// with interrupts live so the transmit vector drains underneath;
    /// inside a caller's critical section the handler is serviced by
    /// hand instead, so this cannot deadlock.
    pub fn write(&mut self, byte: u8) -> usize {
        loop {
            match self.with_port(Some(0), |port| port.try_write(byte)) {
                Some(n) => return n,
                None => core::hint::spin_loop(),
            }
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut sent = 0;
        for byte in bytes {
            sent += self.write(*byte);
        }
        sent
    }

    pub fn write_str(&mut self, s: &str) -> usize {
        self.write_bytes(s.as_bytes())
    }

    /// Renders `core::fmt` arguments through a stack buffer and writes
    /// the text; `false` when the rendering does not fit.
    pub fn write_fmt(&mut self, args: core::fmt::Arguments) -> bool {
        let mut writer: StrWriter<FMT_BUFFER_SIZE> = StrWriter::new();
        match writer.render(args) {
            Ok(s) => {
                self.write_bytes(s.as_bytes());
                true
            }
            Err(_) => false,
        }
    }

    /// Blocks until every queued byte has physically left the wire, not
    /// merely reached the hardware queue. Immediate when nothing was
    /// written since the last flush boundary. Completes a half-duplex
    /// turnaround: the self-echo is discarded and the receiver
    /// re-enabled.
    pub fn flush(&mut self) {
        loop {
            if self.with_port(true, |port| port.flush_step()) {
                return;
            }
            core::hint::spin_loop();
        }
    }

    /// Oldest received byte, or `-1` when empty or idle.
    pub fn read(&mut self) -> i16 {
        self.with_port(-1, |port| {
            if !port.is_armed() {
                return -1;
            }
            match port.pop_rx() {
                Some(byte) => byte as i16,
                None => -1,
            }
        })
    }

    /// As `read`, without consuming the byte.
    pub fn peek(&self) -> i16 {
        self.with_port_ref(-1, |port| {
            if !port.is_armed() {
                return -1;
            }
            match port.peek_rx() {
                Some(byte) => byte as i16,
                None => -1,
            }
        })
    }

    /// Received bytes waiting to be read.
    pub fn available(&self) -> usize {
        self.with_port_ref(0, |port| port.rx_available())
    }

    /// Bytes `write` can accept without blocking.
    pub fn available_for_write(&self) -> usize {
        self.with_port_ref(0, |port| port.tx_free())
    }

    /// Routes an explicit TX/RX pair if the unit's pin table lists it;
    /// `false` leaves the active set untouched.
    pub fn pins(&mut self, tx: u8, rx: u8) -> bool {
        self.with_port(false, |port| port.set_pins(tx, rx))
    }

    /// Selects a mux position by index, `0` being the default set.
    pub fn swap(&mut self, mux_level: u8) -> bool {
        self.with_port(false, |port| port.swap(mux_level))
    }

    /// Pin identifier of a role within the active set.
    pub fn pin(&self, role: PinRole) -> Option<u8> {
        self.with_port_ref(None, |port| port.pin(role))
    }

    #[cfg(test)]
    pub(crate) fn with_state<R>(&mut self, f: impl FnOnce(&mut PortState<U>) -> R) -> R {
        critical_section::with(|cs| f(self.cell.borrow(cs).borrow_mut().as_mut().unwrap()))
    }
}

impl<U: UsartOps + 'static> embedded_hal::serial::Read<u8> for Serial<U> {
    type Error = SerialError;

    fn read(&mut self) -> nb::Result<u8, SerialError> {
        self.with_port(Err(nb::Error::Other(SerialError::NotArmed)), |port| {
            if !port.is_armed() {
                return Err(nb::Error::Other(SerialError::NotArmed));
            }
            port.pop_rx().ok_or(nb::Error::WouldBlock)
        })
    }
}

impl<U: UsartOps + 'static> embedded_hal::serial::Write<u8> for Serial<U> {
    type Error = SerialError;

    fn write(&mut self, byte: u8) -> nb::Result<(), SerialError> {
        self.with_port(Err(nb::Error::Other(SerialError::NotArmed)), |port| {
            if !port.is_armed() {
                return Err(nb::Error::Other(SerialError::NotArmed));
            }
            match port.try_write(byte) {
                Some(_) => Ok(()),
                None => Err(nb::Error::WouldBlock),
            }
        })
    }

    fn flush(&mut self) -> nb::Result<(), SerialError> {
        if self.with_port(true, |port| port.flush_step()) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl<U: UsartOps + 'static> ufmt::uWrite for Serial<U> {
    type Error = core::convert::Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
