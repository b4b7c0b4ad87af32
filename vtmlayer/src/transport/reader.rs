//! Buffered response reader with mark and rewind.
//!
//! The header parser scans lines and the content-length word from the
//! buffer, then rewinds to the mark and skips exactly the header bytes. The
//! decoder reads the payload through the same reader so bytes already
//! buffered during the header scan are not lost.

use std::io::{self, Read};

/// Default buffer capacity.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Buffered reader over a response stream.
#[derive(Debug)]
pub struct ResponseReader<S> {
    inner: S,
    buf: Vec<u8>,
    pos: usize,
    filled: usize,
    mark: Option<usize>,
}

impl<S: Read> ResponseReader<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(READ_BUFFER_SIZE, inner)
    }

    pub fn with_capacity(capacity: usize, inner: S) -> Self {
        Self {
            inner,
            buf: vec![0; capacity],
            pos: 0,
            filled: 0,
            mark: None,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unread buffered bytes.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.pos..self.filled]
    }

    /// Remember the current position. Bytes from here on stay buffered until
    /// the mark is cleared.
    pub fn mark(&mut self) {
        self.mark = Some(self.pos);
    }

    /// Go back to the mark and clear it. Without a mark this does nothing.
    pub fn rewind(&mut self) {
        if let Some(mark) = self.mark.take() {
            self.pos = mark;
        }
    }

    /// Advance over `n` buffered bytes. Returns how many were skipped.
    pub fn skip(&mut self, n: usize) -> usize {
        let n = n.min(self.filled - self.pos);
        self.pos += n;
        n
    }

    /// Drop every buffered byte and the mark. Returns how many were dropped.
    pub fn discard_buffered(&mut self) -> usize {
        let dropped = self.filled - self.pos;
        self.pos = 0;
        self.filled = 0;
        self.mark = None;
        dropped
    }

    /// Read once from the inner stream, appending to the buffer.
    ///
    /// Returns the number of new bytes, 0 at end of stream or when the
    /// buffer is full with marked data.
    pub fn fill_more(&mut self) -> io::Result<usize> {
        let keep = self.mark.unwrap_or(self.pos);
        if self.filled == self.buf.len() && keep > 0 {
            self.buf.copy_within(keep..self.filled, 0);
            self.filled -= keep;
            self.pos -= keep;
            if let Some(mark) = self.mark.as_mut() {
                *mark = 0;
            }
        }
        if self.filled == self.buf.len() {
            return Ok(0);
        }

        loop {
            match self.inner.read(&mut self.buf[self.filled..]) {
                Ok(n) => {
                    self.filled += n;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<S: Read> Read for ResponseReader<S> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        // Large reads with nothing buffered go straight to the stream
        if self.pos == self.filled && self.mark.is_none() && out.len() >= self.buf.len() {
            self.pos = 0;
            self.filled = 0;
            return self.inner.read(out);
        }

        if self.pos == self.filled {
            if self.mark.is_none() {
                self.pos = 0;
                self.filled = 0;
            }
            if self.fill_more()? == 0 {
                return Ok(0);
            }
        }

        let n = out.len().min(self.filled - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
