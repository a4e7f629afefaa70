//! ATtiny816 register binding and interrupt vectors for USART0.
//!
//! The unit-to-handler mapping is fixed at build time: each vector
//! closes over its unit's static cell, nothing is dispatched at
//! runtime. `serial0` seeds the cell once and hands out the single
//! [`Serial`] instance owning the unit.

use core::cell::RefCell;

use avr_device::attiny816;
use critical_section::Mutex;

use super::mode::ModePlan;
use super::port::PortCell;
use super::usart::UsartOps;
use super::Serial;

/// Peripheral clock after the init code has set the main prescaler.
pub const F_CLK_PER: u32 = 16_000_000;

static PORT0: PortCell<Usart0> = Mutex::new(RefCell::new(None));

/// The one handle to USART0. Call once at startup, before enabling
/// interrupts globally.
pub fn serial0() -> Serial<Usart0> {
    Serial::attach(&PORT0, Usart0 { _private: () }, 0, 0)
}

/// Zero-sized handle over the USART0 register block.
pub struct Usart0 {
    _private: (),
}

impl Usart0 {
    fn regs(&self) -> &attiny816::usart0::RegisterBlock {
        unsafe { &*attiny816::USART0::ptr() }
    }
}

impl UsartOps for Usart0 {
    fn clock_hz(&self) -> u32 {
        F_CLK_PER
    }

    fn rx_ready(&self) -> bool {
        self.regs().status.read().rxcif().bit_is_set()
    }

    fn tx_ready(&self) -> bool {
        self.regs().status.read().dreif().bit_is_set()
    }

    fn tx_complete(&self) -> bool {
        self.regs().status.read().txcif().bit_is_set()
    }

    fn clear_tx_complete(&mut self) {
        self.regs().status.write(|w| w.txcif().set_bit());
    }

    fn read_data(&mut self) -> u8 {
        self.regs().rxdatal.read().bits()
    }

    fn write_data(&mut self, byte: u8) {
        self.regs().txdatal.write(|w| unsafe { w.bits(byte) });
    }

    fn enable(&mut self, plan: &ModePlan) {
        self.set_pinmux(plan.mux);
        let regs = self.regs();
        regs.baud.write(|w| unsafe { w.bits(plan.baud_reg) });
        regs.ctrlc.write(|w| unsafe { w.bits(plan.ctrlc) });
        regs.ctrla.write(|w| {
            let w = w.rxcie().set_bit();
            if plan.half_duplex {
                w.lbme().set_bit()
            } else {
                w
            }
        });
        regs.ctrlb.write(|w| {
            let w = w.rxen().set_bit().txen().set_bit();
            if plan.half_duplex {
                w.odme().set_bit()
            } else {
                w
            }
        });
        if plan.sync_host {
            // the host drives XCK; its route was validated by the plan
            drive_xck_output();
        }
    }

    fn disable(&mut self) {
        let regs = self.regs();
        regs.ctrla.reset();
        regs.ctrlb.reset();
        regs.ctrlc.reset();
        regs.baud.reset();
        regs.status.write(|w| w.txcif().set_bit());
    }

    fn set_rx_enabled(&mut self, on: bool) {
        self.regs().ctrlb.modify(|_, w| w.rxen().bit(on));
    }

    fn set_dre_irq(&mut self, on: bool) {
        self.regs().ctrla.modify(|_, w| w.dreie().bit(on));
    }

    fn dre_irq_enabled(&self) -> bool {
        self.regs().ctrla.read().dreie().bit_is_set()
    }

    fn set_pinmux(&mut self, mux: u8) {
        let portmux = unsafe { &*attiny816::PORTMUX::ptr() };
        portmux.ctrlb.modify(|_, w| w.usart0().bit(mux != 0));
    }

    fn global_irqs_enabled(&self) -> bool {
        unsafe { (*attiny816::CPU::ptr()).sreg.read().i().bit_is_set() }
    }
}

/// XCK of USART0 sits on PB1 (default set) or PA3 (alternate); the mux
/// is already routed when this runs, so read it back.
fn drive_xck_output() {
    let portmux = unsafe { &*attiny816::PORTMUX::ptr() };
    if portmux.ctrlb.read().usart0().bit_is_set() {
        let porta = unsafe { &*attiny816::PORTA::ptr() };
        porta.dirset.write(|w| unsafe { w.bits(1 << 3) });
    } else {
        let portb = unsafe { &*attiny816::PORTB::ptr() };
        portb.dirset.write(|w| unsafe { w.bits(1 << 1) });
    }
}

#[avr_device::interrupt(attiny816)]
fn USART0_RXC() {
    critical_section::with(|cs| {
        if let Some(port) = PORT0.borrow(cs).borrow_mut().as_mut() {
            port.rx_complete_irq();
        }
    });
}

#[avr_device::interrupt(attiny816)]
fn USART0_DRE() {
    critical_section::with(|cs| {
        if let Some(port) = PORT0.borrow(cs).borrow_mut().as_mut() {
            port.tx_data_empty_irq();
        }
    });
}
