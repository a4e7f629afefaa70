use core::fmt;

/// Renders `core::fmt` output into a stack buffer so it can be pushed
/// through the byte-oriented serial path. Output longer than the buffer
/// is refused rather than truncated.
pub struct StrWriter<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> StrWriter<N> {
    pub const fn new() -> Self {
        Self { buf: [0; N], len: 0 }
    }

    pub fn render(&mut self, args: fmt::Arguments) -> Result<&str, fmt::Error> {
        self.len = 0;
        fmt::write(self, args)?;
        // only whole str fragments were appended
        core::str::from_utf8(&self.buf[..self.len]).map_err(|_| fmt::Error)
    }
}

impl<const N: usize> Default for StrWriter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for StrWriter<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let free = &mut self.buf[self.len..];
        if free.len() < bytes.len() {
            return Err(fmt::Error);
        }
        free[..bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}
