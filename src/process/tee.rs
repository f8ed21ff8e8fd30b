//! Fan-out writer
//!
//! Forwards every chunk to two sinks: the live console and the in-memory
//! buffer that later becomes the error message.

use std::io::{self, Write};

/// Writer that duplicates everything written to it into two sinks
pub struct TeeWriter<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> TeeWriter<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Split the tee back into its sinks
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Write, B: Write> Write for TeeWriter<A, B> {
    /// Always hands the whole chunk to both sinks, even if the first one fails.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let first = self.first.write_all(buf);
        let second = self.second.write_all(buf);
        first.and(second).map(|_| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let first = self.first.flush();
        let second = self.second.flush();
        first.and(second)
    }
}
