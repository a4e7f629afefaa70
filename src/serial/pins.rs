//! Pin-identity table of the USART units.
//!
//! Each unit owns a small table of mux positions; a position routes the
//! four USART signals to fixed pins. The table is board data, not
//! behavior: the driver only ever resolves against it and never invents
//! a route that is not listed here.

/// Sentinel for an absent route within a [`PinSet`].
pub const NOT_A_PIN: u8 = 0xff;

/// Logical pin numbers, PORTA.0 counting upward, as on the 24-pin
/// 1-series parts.
pub const PIN_PA1: u8 = 1;
pub const PIN_PA2: u8 = 2;
pub const PIN_PA3: u8 = 3;
pub const PIN_PA4: u8 = 4;
pub const PIN_PB0: u8 = 8;
pub const PIN_PB1: u8 = 9;
pub const PIN_PB2: u8 = 10;
pub const PIN_PB3: u8 = 11;

/// The four signals a mux position routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    Tx,
    Rx,
    /// Clock line of the synchronous modes.
    Xck,
    /// Direction line of RS485-style transceivers.
    Xdir,
}

/// One mux position of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinSet {
    pub tx: u8,
    pub rx: u8,
    pub xck: u8,
    pub xdir: u8,
}

impl PinSet {
    pub fn pin(&self, role: PinRole) -> Option<u8> {
        let id = match role {
            PinRole::Tx => self.tx,
            PinRole::Rx => self.rx,
            PinRole::Xck => self.xck,
            PinRole::Xdir => self.xdir,
        };
        (id != NOT_A_PIN).then_some(id)
    }
}

// USART0 default and alternate routes of the 1-series parts.
const USART0_SETS: [PinSet; 2] = [
    PinSet { tx: PIN_PB2, rx: PIN_PB3, xck: PIN_PB1, xdir: PIN_PB0 },
    PinSet { tx: PIN_PA1, rx: PIN_PA2, xck: PIN_PA3, xdir: PIN_PA4 },
];

const UNIT_SETS: [&[PinSet]; 1] = [&USART0_SETS];

/// Routes of one mux position, or `None` for an unknown unit/position.
pub(crate) fn pin_set(unit: u8, mux: u8) -> Option<&'static PinSet> {
    UNIT_SETS.get(unit as usize)?.get(mux as usize)
}

/// Finds the mux position routing exactly this TX/RX pair on `unit`.
pub(crate) fn mux_for_pins(unit: u8, tx: u8, rx: u8) -> Option<u8> {
    let sets = UNIT_SETS.get(unit as usize)?;
    sets.iter()
        .position(|set| set.tx == tx && set.rx == rx)
        .map(|mux| mux as u8)
}
