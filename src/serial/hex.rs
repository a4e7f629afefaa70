//! Hexadecimal print helpers, a convenience layer built only on
//! `write`.

use super::usart::UsartOps;
use super::Serial;

fn hex_digit(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        _ => b'A' + nibble - 10,
    }
}

impl<U: UsartOps + 'static> Serial<U> {
    /// Two hex digits, most significant nibble first.
    pub fn print_hex(&mut self, byte: u8) {
        self.write(hex_digit(byte >> 4));
        self.write(hex_digit(byte & 0x0f));
    }

    /// Four digits; `swap` emits the low byte first, for dumping
    /// little-endian memory as stored.
    pub fn print_hex_u16(&mut self, word: u16, swap: bool) {
        let [lo, hi] = word.to_le_bytes();
        if swap {
            self.print_hex(lo);
            self.print_hex(hi);
        } else {
            self.print_hex(hi);
            self.print_hex(lo);
        }
    }

    /// Eight digits; `swap` as in [`print_hex_u16`](Self::print_hex_u16).
    pub fn print_hex_u32(&mut self, value: u32, swap: bool) {
        let bytes = if swap {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        for byte in bytes {
            self.print_hex(byte);
        }
    }

    /// Byte array, optionally separated.
    pub fn print_hex_bytes(&mut self, data: &[u8], sep: Option<u8>) {
        for (i, byte) in data.iter().enumerate() {
            if i != 0 {
                if let Some(sep) = sep {
                    self.write(sep);
                }
            }
            self.print_hex(*byte);
        }
    }

    /// Word array, optionally separated and byte-swapped.
    pub fn print_hex_words(&mut self, data: &[u16], sep: Option<u8>, swap: bool) {
        for (i, word) in data.iter().enumerate() {
            if i != 0 {
                if let Some(sep) = sep {
                    self.write(sep);
                }
            }
            self.print_hex_u16(*word, swap);
        }
    }
}
