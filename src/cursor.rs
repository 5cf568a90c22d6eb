//! Sequential byte source with a small lookahead window.
//!
//! The Marshal format is read strictly front to back. The only time the
//! decoder needs to look ahead is to tell a wrapped string from any other
//! wrapped value (one byte) and to spot a trailing encoding list after a regexp
//! (two bytes), so [`ByteCursor`] buffers at most [`MAX_PEEK`] bytes on top of
//! an arbitrary [`io::Read`].

use crate::{Error, Result};
use std::io::{self, Read};

/// Longest lookahead the decoder ever asks for.
pub const MAX_PEEK: usize = 2;

/// Upper bound for the eager allocation made for a length-prefixed read.
///
/// Longer payloads still decode; their buffer just grows as bytes arrive, so
/// a forged length cannot allocate more than the stream actually delivers.
const PREALLOC_LIMIT: usize = 64 * 1024;

/// A forward-only reader over a byte stream.
///
/// Peeked bytes stay buffered until a later read consumes them, and
/// [`position`](Self::position) only counts consumed bytes.
pub struct ByteCursor<R> {
    inner: R,
    lookahead: [u8; MAX_PEEK],
    buffered: usize,
    position: u64,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        ByteCursor {
            inner,
            lookahead: [0; MAX_PEEK],
            buffered: 0,
            position: 0,
        }
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the underlying reader.
    ///
    /// Bytes that were peeked but not consumed are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads one byte. `expected` names the field for error messages.
    pub fn read_u8(&mut self, expected: &str) -> Result<u8> {
        let byte = if self.buffered > 0 {
            let byte = self.lookahead[0];
            self.lookahead.copy_within(1.., 0);
            self.buffered -= 1;
            byte
        } else {
            let mut buf = [0u8; 1];
            self.fill_exact(&mut buf, expected)?;
            buf[0]
        };
        self.position += 1;
        Ok(byte)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self, expected: &str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        for slot in buf.iter_mut() {
            *slot = self.read_u8(expected)?;
        }
        Ok(buf)
    }

    /// Reads exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize, expected: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        while out.len() < len && self.buffered > 0 {
            out.push(self.read_u8(expected)?);
        }

        let remaining = (len - out.len()) as u64;
        let read = (&mut self.inner)
            .take(remaining)
            .read_to_end(&mut out)
            .map_err(|e| Error::from_io(&e, self.position, expected))?;
        self.position += read as u64;

        if out.len() < len {
            return Err(Error::unexpected_eof(self.position, expected));
        }
        Ok(out)
    }

    /// Returns up to `n` upcoming bytes without consuming them.
    ///
    /// The slice is shorter than `n` only when the stream ends first.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`MAX_PEEK`].
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        assert!(n <= MAX_PEEK, "lookahead is limited to {MAX_PEEK} bytes");
        while self.buffered < n {
            let mut buf = [0u8; 1];
            match self.inner.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    self.lookahead[self.buffered] = buf[0];
                    self.buffered += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io(&e.to_string())),
            }
        }
        Ok(&self.lookahead[..self.buffered.min(n)])
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&mut self, expected: &str) -> Result<u8> {
        let position = self.position;
        match self.peek(1)?.first() {
            Some(byte) => Ok(*byte),
            None => Err(Error::unexpected_eof(position, expected)),
        }
    }

    fn fill_exact(&mut self, buf: &mut [u8], expected: &str) -> Result<()> {
        self.inner
            .read_exact(buf)
            .map_err(|e| Error::from_io(&e, self.position, expected))
    }
}
