use std::io::{self, Write};

/// Outermost wrapper around the caller's destination: tallies bytes delivered and
/// flushes requested. Never closes anything.
pub(crate) struct Metered<W: Write> {
    dest: W,
    delivered: u64,
    flushes: u32,
}

impl<W: Write> Metered<W> {
    pub(crate) fn new(dest: W) -> Metered<W> {
        Self {
            dest,
            delivered: 0,
            flushes: 0,
        }
    }
    pub(crate) fn delivered(&self) -> u64 {
        self.delivered
    }
    pub(crate) fn flushes(&self) -> u32 {
        self.flushes
    }
}

impl<W: Write> Write for Metered<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.dest.write(buf)?;
        self.delivered += n as u64;
        Ok(n)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.flushes = self.flushes.saturating_add(1);
        self.dest.flush()
    }
}
