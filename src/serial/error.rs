/// Rejection reasons for `begin`, never surfaced as a fault: the port is
/// left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Frame or protocol combination the unit cannot do.
    BadMode,
    /// Requested pin set is not in the unit's pin table.
    BadPins,
    /// Baud generator cannot reach the requested rate from this clock.
    BadBaud,
}

/// Errors of the `embedded-hal` serial trait impls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    /// The port has not been armed with `begin`.
    NotArmed,
}
