//! Fixed-capacity circular byte queues shared between the foreground and
//! the USART interrupt handlers.
//!
//! Two implementations exist behind one contract: the generic
//! [`RingBuffer`] for any power-of-two capacity, and [`FastRing`], a
//! hand-specialized variant for the 16..=256 capacities whose indices fit
//! a single byte. The `fast-isr` cargo feature selects which one backs the
//! serial queues; both must stay behaviorally identical and both run the
//! same test suite below.

/// Contract shared by both queue strategies.
///
/// A queue of capacity `N` holds at most `N - 1` bytes: `head == tail`
/// means empty, and a push that would make them equal again is refused.
/// The overflow policy is drop-newest: a failed push leaves the queue
/// untouched and discards the incoming byte, never an already-queued one.
pub trait ByteQueue {
    const CAPACITY: usize;

    /// Enqueues one byte, or returns `false` when full.
    fn try_push(&mut self, byte: u8) -> bool;
    /// Dequeues the oldest byte.
    fn try_pop(&mut self) -> Option<u8>;
    /// Oldest byte without consuming it.
    fn peek(&self) -> Option<u8>;
    /// Number of queued, unread bytes.
    fn available(&self) -> usize;
    fn clear(&mut self);

    fn free_space(&self) -> usize {
        Self::CAPACITY - 1 - self.available()
    }

    fn is_empty(&self) -> bool {
        self.available() == 0
    }
}

/// Generic ring queue; `head` is the next write slot, `tail` the next
/// read slot, both wrapped with a bitmask.
pub struct RingBuffer<const N: usize> {
    data: [u8; N],
    head: usize,
    tail: usize,
}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = N - 1;
    const CAPACITY_OK: () = assert!(N.is_power_of_two() && N >= 2);

    pub const fn new() -> Self {
        let _ = Self::CAPACITY_OK;
        Self {
            data: [0; N],
            head: 0,
            tail: 0,
        }
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteQueue for RingBuffer<N> {
    const CAPACITY: usize = N;

    fn try_push(&mut self, byte: u8) -> bool {
        let next = (self.head + 1) & Self::MASK;
        if next == self.tail {
            return false;
        }
        self.data[self.head] = byte;
        self.head = next;
        true
    }

    fn try_pop(&mut self) -> Option<u8> {
        if self.head == self.tail {
            return None;
        }
        let byte = self.data[self.tail];
        self.tail = (self.tail + 1) & Self::MASK;
        Some(byte)
    }

    fn peek(&self) -> Option<u8> {
        if self.head == self.tail {
            None
        } else {
            Some(self.data[self.tail])
        }
    }

    fn available(&self) -> usize {
        self.head.wrapping_sub(self.tail) & Self::MASK
    }

    fn clear(&mut self) {
        self.tail = self.head;
    }
}

/// Specialized ring queue for capacities whose index fits one byte.
///
/// Single-byte indices are read and written atomically on AVR, so the
/// interrupt handler and the foreground can each own one index without
/// any wider guard. Index arithmetic stays in one register, and since
/// every access re-masks the index the bounds check compiles away.
/// Semantics are identical to [`RingBuffer`].
pub struct FastRing<const N: usize> {
    data: [u8; N],
    head: u8,
    tail: u8,
}

impl<const N: usize> FastRing<N> {
    const MASK: u8 = (N - 1) as u8;
    const CAPACITY_OK: () =
        assert!(N == 16 || N == 32 || N == 64 || N == 128 || N == 256);

    pub const fn new() -> Self {
        let _ = Self::CAPACITY_OK;
        Self {
            data: [0; N],
            head: 0,
            tail: 0,
        }
    }
}

impl<const N: usize> Default for FastRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteQueue for FastRing<N> {
    const CAPACITY: usize = N;

    fn try_push(&mut self, byte: u8) -> bool {
        let next = self.head.wrapping_add(1) & Self::MASK;
        if next == self.tail {
            return false;
        }
        self.data[(self.head & Self::MASK) as usize] = byte;
        self.head = next;
        true
    }

    fn try_pop(&mut self) -> Option<u8> {
        if self.head == self.tail {
            return None;
        }
        let byte = self.data[(self.tail & Self::MASK) as usize];
        self.tail = self.tail.wrapping_add(1) & Self::MASK;
        Some(byte)
    }

    fn peek(&self) -> Option<u8> {
        if self.head == self.tail {
            None
        } else {
            Some(self.data[(self.tail & Self::MASK) as usize])
        }
    }

    fn available(&self) -> usize {
        (self.head.wrapping_sub(self.tail) & Self::MASK) as usize
    }

    fn clear(&mut self) {
        self.tail = self.head;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fifo_roundtrip<Q: ByteQueue>(q: &mut Q) {
        // fill to usable capacity, then drain, several times so the
        // indices wrap past the end of the storage
        for round in 0..4u8 {
            let n = Q::CAPACITY - 1;
            for i in 0..n {
                assert!(q.try_push(round.wrapping_add(i as u8)));
            }
            assert_eq!(q.available(), n);
            for i in 0..n {
                assert_eq!(q.try_pop(), Some(round.wrapping_add(i as u8)));
            }
            assert_eq!(q.try_pop(), None);
        }
    }

    fn full_queue_drops_newest<Q: ByteQueue>(q: &mut Q) {
        let n = Q::CAPACITY - 1;
        for i in 0..n {
            assert!(q.try_push(i as u8));
        }
        assert!(!q.try_push(0xEE));
        assert!(!q.try_push(0xEF));
        assert_eq!(q.available(), n);
        // queued contents unchanged by the refused pushes
        for i in 0..n {
            assert_eq!(q.try_pop(), Some(i as u8));
        }
        assert_eq!(q.try_pop(), None);
    }

    fn peek_is_non_destructive<Q: ByteQueue>(q: &mut Q) {
        assert_eq!(q.peek(), None);
        assert!(q.try_push(0x41));
        assert!(q.try_push(0x42));
        assert_eq!(q.peek(), Some(0x41));
        assert_eq!(q.peek(), Some(0x41));
        assert_eq!(q.try_pop(), Some(0x41));
        assert_eq!(q.peek(), Some(0x42));
    }

    fn accounting_is_conserved<Q: ByteQueue>(q: &mut Q) {
        let cap = Q::CAPACITY;
        assert_eq!(q.free_space(), cap - 1);
        for i in 0..3 * cap {
            let _ = q.try_push(i as u8);
            assert!(q.available() + q.free_space() == cap - 1);
            if i % 3 == 0 {
                let _ = q.try_pop();
                assert!(q.available() + q.free_space() == cap - 1);
            }
        }
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.free_space(), cap - 1);
    }

    macro_rules! queue_contract {
        ($name:ident, $ty:ty) => {
            mod $name {
                use super::*;

                #[test]
                fn fifo() {
                    fifo_roundtrip(&mut <$ty>::new());
                }

                #[test]
                fn full_drops_newest() {
                    full_queue_drops_newest(&mut <$ty>::new());
                }

                #[test]
                fn peek() {
                    peek_is_non_destructive(&mut <$ty>::new());
                }

                #[test]
                fn accounting() {
                    accounting_is_conserved(&mut <$ty>::new());
                }
            }
        };
    }

    queue_contract!(generic_8, RingBuffer<8>);
    queue_contract!(generic_64, RingBuffer<64>);
    queue_contract!(fast_16, FastRing<16>);
    queue_contract!(fast_64, FastRing<64>);
    queue_contract!(fast_256, FastRing<256>);
}
