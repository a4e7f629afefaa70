//! Register-bank boundary of one physical USART unit.

use super::mode::ModePlan;

/// Everything the transceiver needs from the hardware unit. One
/// implementor exists per unit for the life of the program: on AVR a
/// zero-sized handle over the memory-mapped block, under test a
/// scripted mock.
pub trait UsartOps {
    /// Peripheral clock feeding the baud generator.
    fn clock_hz(&self) -> u32;

    /// An unread byte sits in the receive data register.
    fn rx_ready(&self) -> bool;
    /// The transmit data register can take another byte.
    fn tx_ready(&self) -> bool;
    /// The shift register finished emitting the last queued byte.
    fn tx_complete(&self) -> bool;
    fn clear_tx_complete(&mut self);

    /// Reading also clears the hardware's receive-ready condition.
    fn read_data(&mut self) -> u8;
    /// Writing also clears the data-register-empty condition.
    fn write_data(&mut self, byte: u8);

    /// Programs baud and frame registers, routes the mux and enables
    /// the transceiver with the receive-complete interrupt armed.
    fn enable(&mut self, plan: &ModePlan);
    /// Back to a power-on-equivalent state, every source masked.
    fn disable(&mut self);

    fn set_rx_enabled(&mut self, on: bool);
    fn set_dre_irq(&mut self, on: bool);
    fn dre_irq_enabled(&self) -> bool;
    fn set_pinmux(&mut self, mux: u8);

    /// Whether interrupt handlers can currently run at all (the SREG
    /// I-flag on AVR). The blocking paths consult this to service the
    /// transmit handler by hand instead of waiting for a vector that
    /// cannot fire.
    fn global_irqs_enabled(&self) -> bool;
}
