//! Per-unit transceiver state and the two interrupt handler bodies.
//!
//! A `PortState` lives in a static cell for the whole program; `begin`
//! and `end` only arm and disarm it. Every entry point here runs inside
//! a critical section (the vectors run with interrupts masked anyway),
//! so methods may touch both queues freely; the blocking loops of the
//! public API stay *outside*, re-entering for each short step.

use core::cell::RefCell;

use critical_section::Mutex;

use super::error::ConfigError;
use super::mode::{Mode, ModePlan};
use super::pins::{self, PinRole};
use super::usart::UsartOps;
use crate::tools::buffer::ByteQueue;
#[cfg(not(feature = "fast-isr"))]
use crate::tools::buffer::RingBuffer;
#[cfg(feature = "fast-isr")]
use crate::tools::buffer::FastRing;

/// Queue capacities, fixed at build time. Usable space is one less
/// (see `ByteQueue`); sizes must be powers of two, and 16..=256 when
/// `fast-isr` is selected.
pub const RX_BUFFER_SIZE: usize = 32;
pub const TX_BUFFER_SIZE: usize = 32;

#[cfg(feature = "fast-isr")]
pub(crate) type RxQueue = FastRing<RX_BUFFER_SIZE>;
#[cfg(feature = "fast-isr")]
pub(crate) type TxQueue = FastRing<TX_BUFFER_SIZE>;
#[cfg(not(feature = "fast-isr"))]
pub(crate) type RxQueue = RingBuffer<RX_BUFFER_SIZE>;
#[cfg(not(feature = "fast-isr"))]
pub(crate) type TxQueue = RingBuffer<TX_BUFFER_SIZE>;

/// Static home of one unit's state, shared between the foreground API
/// and the unit's vectors.
pub type PortCell<U> = Mutex<RefCell<Option<PortState<U>>>>;

pub struct PortState<U: UsartOps> {
    usart: U,
    unit: u8,
    pin_set: u8,
    armed: bool,
    half_duplex: bool,
    /// A byte went out since the last flush boundary; flush is a no-op
    /// without it.
    written: bool,
    /// Receiver muted for a half-duplex transmission in progress.
    rx_paused: bool,
    rx: RxQueue,
    tx: TxQueue,
}

impl<U: UsartOps> PortState<U> {
    pub fn new(usart: U, unit: u8, default_pin_set: u8) -> Self {
        Self {
            usart,
            unit,
            pin_set: default_pin_set,
            armed: false,
            half_duplex: false,
            written: false,
            rx_paused: false,
            rx: RxQueue::new(),
            tx: TxQueue::new(),
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }

    /// Validates and applies a configuration. Everything is computed
    /// before anything is touched, so an error leaves the port exactly
    /// as it was, armed or not.
    pub(crate) fn begin(&mut self, baud: u32, mode: &Mode) -> Result<(), ConfigError> {
        let plan = ModePlan::prepare(
            self.unit,
            self.pin_set,
            baud,
            mode,
            self.usart.clock_hz(),
        )?;
        if self.armed {
            self.shut_down();
        }
        self.usart.enable(&plan);
        self.half_duplex = plan.half_duplex;
        self.armed = true;
        Ok(())
    }

    /// Disarms the unit and drops whatever is still queued. Data in the
    /// shift register may be truncated; callers wanting completion run
    /// flush first.
    pub(crate) fn shut_down(&mut self) {
        self.usart.disable();
        self.rx.clear();
        self.tx.clear();
        self.armed = false;
        self.half_duplex = false;
        self.written = false;
        self.rx_paused = false;
    }

    /// One push attempt. `Some(n)` is final; `None` means the queue was
    /// full and the caller should spin outside the critical section and
    /// retry, letting the transmit vector drain underneath it.
    pub(crate) fn try_write(&mut self, byte: u8) -> Option<usize> {
        if !self.armed {
            return Some(0);
        }
        if self.half_duplex && !self.rx_paused {
            // the shared line echoes TX into RX; mute the receiver
            // until flush confirms the line is idle again
            self.usart.set_rx_enabled(false);
            self.rx_paused = true;
        }
        self.written = true;
        if self.tx.try_push(byte) {
            self.usart.set_dre_irq(true);
            return Some(1);
        }
        self.service_tx_if_blocked();
        if self.tx.try_push(byte) {
            self.usart.set_dre_irq(true);
            Some(1)
        } else {
            None
        }
    }

    /// One flush step; `true` once every queued byte has physically
    /// left the wire (or there is nothing to wait for).
    pub(crate) fn flush_step(&mut self) -> bool {
        if !self.armed || !self.written {
            return true;
        }
        self.service_tx_if_blocked();
        if !self.tx.is_empty()
            || self.usart.dre_irq_enabled()
            || !self.usart.tx_complete()
        {
            return false;
        }
        if self.rx_paused {
            // throw away the half-duplex self-echo before listening
            while self.usart.rx_ready() {
                let _ = self.usart.read_data();
            }
            self.usart.set_rx_enabled(true);
            self.rx_paused = false;
        }
        self.written = false;
        true
    }

    /// The transmit vector cannot fire while interrupts are masked or
    /// while its source is disabled; in those states the foreground
    /// services it by hand whenever the data register has room, so the
    /// blocking paths cannot deadlock inside a caller's critical
    /// section.
    fn service_tx_if_blocked(&mut self) {
        if (!self.usart.global_irqs_enabled() || !self.usart.dre_irq_enabled())
            && self.usart.tx_ready()
        {
            self.tx_data_empty_irq();
        }
    }

    pub(crate) fn pop_rx(&mut self) -> Option<u8> {
        self.rx.try_pop()
    }

    pub(crate) fn peek_rx(&self) -> Option<u8> {
        self.rx.peek()
    }

    pub(crate) fn rx_available(&self) -> usize {
        if self.armed {
            self.rx.available()
        } else {
            0
        }
    }

    pub(crate) fn tx_free(&self) -> usize {
        if self.armed {
            self.tx.free_space()
        } else {
            0
        }
    }

    /// Routes an explicit TX/RX pair if the unit's table lists it; an
    /// unknown pair changes nothing.
    pub(crate) fn set_pins(&mut self, tx: u8, rx: u8) -> bool {
        match pins::mux_for_pins(self.unit, tx, rx) {
            Some(mux) => {
                self.apply_mux(mux);
                true
            }
            None => false,
        }
    }

    /// Selects a mux position by index, `0` being the default set.
    pub(crate) fn swap(&mut self, mux_level: u8) -> bool {
        if pins::pin_set(self.unit, mux_level).is_some() {
            self.apply_mux(mux_level);
            true
        } else {
            false
        }
    }

    fn apply_mux(&mut self, mux: u8) {
        self.pin_set = mux;
        if self.armed {
            self.usart.set_pinmux(mux);
        }
    }

    /// Pin identifier of a role within the active set.
    pub(crate) fn pin(&self, role: PinRole) -> Option<u8> {
        pins::pin_set(self.unit, self.pin_set)?.pin(role)
    }

    /// Receive-complete vector body. Reading the data register clears
    /// the hardware condition; a full queue drops the byte silently
    /// (there is no channel to report it through).
    pub fn rx_complete_irq(&mut self) {
        let byte = self.usart.read_data();
        let _ = self.rx.try_push(byte);
    }

    /// Data-register-empty vector body. Hands one byte to the hardware,
    /// or masks the source once the queue is drained so it stops
    /// refiring on an empty queue.
    pub fn tx_data_empty_irq(&mut self) {
        match self.tx.try_pop() {
            Some(byte) => {
                // from here TXC tracks this transmission, for flush
                self.usart.clear_tx_complete();
                self.usart.write_data(byte);
            }
            None => self.usart.set_dre_irq(false),
        }
    }

    #[cfg(test)]
    pub(crate) fn hw(&mut self) -> &mut U {
        &mut self.usart
    }

    #[cfg(test)]
    pub(crate) fn tx_queued(&self) -> usize {
        self.tx.available()
    }
}
