//! Scripted register bank used by the unit tests in place of hardware.

use std::collections::VecDeque;

use super::mode::ModePlan;
use super::usart::UsartOps;

/// Captured image of the last applied plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AppliedPlan {
    pub baud_reg: u16,
    pub ctrlc: u8,
    pub half_duplex: bool,
    pub sync_host: bool,
}

pub(crate) struct MockUsart {
    pub clock_hz: u32,
    /// Bytes the "wire" has delivered; `read_data` consumes them.
    pub rx_feed: VecDeque<u8>,
    /// Bytes handed to the data register, in order.
    pub tx_out: Vec<u8>,
    /// Data register has room (DRE flag).
    pub dre_ready: bool,
    /// Shift register idle (TXC flag).
    pub txc: bool,
    /// When set, a data-register write completes instantly and raises
    /// `txc`; clear it to hold a byte "in flight".
    pub instant_shift: bool,
    pub dre_irq: bool,
    pub rx_enabled: bool,
    pub enabled: bool,
    /// Simulated SREG I-flag. Kept off by default so the blocking paths
    /// make progress by servicing the transmit handler themselves.
    pub irqs_on: bool,
    pub mux: u8,
    pub applied: Option<AppliedPlan>,
}

impl MockUsart {
    pub fn new() -> Self {
        Self {
            clock_hz: 16_000_000,
            rx_feed: VecDeque::new(),
            tx_out: Vec::new(),
            dre_ready: true,
            txc: false,
            instant_shift: true,
            dre_irq: false,
            rx_enabled: false,
            enabled: false,
            irqs_on: false,
            mux: 0,
            applied: None,
        }
    }
}

impl UsartOps for MockUsart {
    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn rx_ready(&self) -> bool {
        !self.rx_feed.is_empty()
    }

    fn tx_ready(&self) -> bool {
        self.dre_ready
    }

    fn tx_complete(&self) -> bool {
        self.txc
    }

    fn clear_tx_complete(&mut self) {
        self.txc = false;
    }

    fn read_data(&mut self) -> u8 {
        self.rx_feed.pop_front().unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        self.tx_out.push(byte);
        if self.instant_shift {
            self.txc = true;
        }
    }

    fn enable(&mut self, plan: &ModePlan) {
        self.mux = plan.mux;
        self.enabled = true;
        self.rx_enabled = true;
        self.dre_irq = false;
        self.applied = Some(AppliedPlan {
            baud_reg: plan.baud_reg,
            ctrlc: plan.ctrlc,
            half_duplex: plan.half_duplex,
            sync_host: plan.sync_host,
        });
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.rx_enabled = false;
        self.dre_irq = false;
        self.applied = None;
    }

    fn set_rx_enabled(&mut self, on: bool) {
        self.rx_enabled = on;
    }

    fn set_dre_irq(&mut self, on: bool) {
        self.dre_irq = on;
    }

    fn dre_irq_enabled(&self) -> bool {
        self.dre_irq
    }

    fn set_pinmux(&mut self, mux: u8) {
        self.mux = mux;
    }

    fn global_irqs_enabled(&self) -> bool {
        self.irqs_on
    }
}
