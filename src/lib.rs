//! Interrupt-driven, ring-buffered serial driver for tinyAVR 0/1-series
//! parts.
//!
//! Bytes written through [`Serial`] land in a fixed transmit queue that
//! the data-register-empty vector drains one byte per event; received
//! bytes are queued by the receive-complete vector and read back with
//! `read`/`peek`/`available`. One port instance exists per physical
//! unit for the life of the program; `begin`/`end` arm and disarm it.
//!
//! The hardware sits behind the [`serial::UsartOps`] trait: on AVR the
//! `serial::interrupt` module binds USART0 and its vectors, everywhere
//! else (including the test suite) any implementor can be attached.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

pub mod serial;
pub mod tools;

pub use serial::{
    ConfigError, Duplex, Mode, Parity, PinRole, Protocol, Serial, SerialError, StopBits,
};
