//! Length-bounded primitive decoder over a byte source.
//!
//! The source is typically a keep-alive socket that carries more data after
//! this tile, so the decoder never reads past the declared content length.
//!
//! # Buffer window
//!
//! ```text
//!  buffer_offset            logical offset of buffer[0]
//!  |
//!  [ consumed | unread ....... | free ]
//!             ^pos             ^fill  ^capacity
//! ```
//!
//! `0 <= pos <= fill <= capacity` holds between calls and the absolute
//! position in the content is `buffer_offset + pos`.

use std::io::{self, Read};

use tracing::debug;

use super::error::DecodeError;
use super::varint::{self, Varint, VARINT_LIMIT};

/// Default buffer capacity.
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 15;

/// Bytes a length-prefixed span declared versus what its values used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub declared: usize,
    pub consumed: usize,
}

impl Span {
    /// True when the values used exactly the declared bytes.
    pub fn is_exact(&self) -> bool {
        self.declared == self.consumed
    }
}

/// Streaming decoder for varints, varint arrays and strings.
pub struct StreamDecoder<R> {
    source: R,
    buffer: Vec<u8>,
    buffer_offset: usize,
    pos: usize,
    fill: usize,
    read_max: usize,
    read_pos: usize,
}

impl<R: Read> StreamDecoder<R> {
    /// Create a decoder reading at most `content_length` bytes from `source`.
    pub fn new(source: R, content_length: usize) -> Self {
        Self::with_buffer(source, content_length, Vec::new())
    }

    /// Create a decoder reusing `buffer`'s allocation.
    ///
    /// The buffer is grown to [`DEFAULT_BUFFER_SIZE`] if smaller; its
    /// contents are ignored.
    pub fn with_buffer(source: R, content_length: usize, mut buffer: Vec<u8>) -> Self {
        if buffer.len() < DEFAULT_BUFFER_SIZE {
            buffer.resize(DEFAULT_BUFFER_SIZE, 0);
        }
        Self {
            source,
            buffer,
            buffer_offset: 0,
            pos: 0,
            fill: 0,
            read_max: content_length,
            read_pos: 0,
        }
    }

    /// Give back the buffer so the next tile can reuse it.
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    /// Absolute offset from the start of the content.
    pub fn position(&self) -> usize {
        self.buffer_offset + self.pos
    }

    /// Declared content length.
    pub fn content_length(&self) -> usize {
        self.read_max
    }

    /// Current buffer capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Whether at least one more content byte is available.
    pub fn has_data(&mut self) -> Result<bool, DecodeError> {
        self.read_buffer(1)
    }

    /// Make at least `size` unread bytes contiguous at the cursor.
    ///
    /// Grows the buffer if `size` exceeds its capacity, otherwise compacts
    /// unread bytes to the front when the tail is too short. Returns
    /// `Ok(false)` when the content boundary is reached first; that is benign
    /// for "is there more" checks and corruption for fixed-size reads.
    pub fn read_buffer(&mut self, size: usize) -> Result<bool, DecodeError> {
        let unread = self.fill - self.pos;
        if size <= unread {
            return Ok(true);
        }

        let remaining = self.read_max - self.read_pos;
        if remaining == 0 {
            return Ok(false);
        }

        // Never grow for bytes the content cannot deliver. Smaller requests
        // still fill what is left, which lookahead reads near the end rely on.
        if size > self.buffer.len() && size - unread > remaining {
            return Ok(false);
        }

        if size > self.buffer.len() {
            let capacity = size.next_power_of_two();
            debug!(capacity, "Growing tile read buffer");
            let mut grown = vec![0u8; capacity];
            grown[..unread].copy_from_slice(&self.buffer[self.pos..self.fill]);
            self.buffer = grown;
            self.shift_window(unread);
        } else if self.fill == self.pos {
            self.shift_window(0);
        } else if self.pos + size > self.buffer.len() {
            self.buffer.copy_within(self.pos..self.fill, 0);
            self.shift_window(unread);
        }

        while self.fill - self.pos < size {
            let max = (self.buffer.len() - self.fill).min(self.read_max - self.read_pos);
            if max == 0 {
                break;
            }

            let len = match self.source.read(&mut self.buffer[self.fill..self.fill + max]) {
                Ok(len) => len,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if len == 0 {
                return Err(DecodeError::Truncated {
                    expected: self.read_max,
                    received: self.read_pos,
                });
            }

            self.read_pos += len;
            self.fill += len;
        }

        Ok(self.fill - self.pos >= size)
    }

    /// Move the window so the unread bytes (already copied to the front)
    /// start at index 0.
    fn shift_window(&mut self, unread: usize) {
        self.buffer_offset += self.pos;
        self.pos = 0;
        self.fill = unread;
    }

    /// Require `size` contiguous bytes, failing at the content boundary.
    fn ensure(&mut self, size: usize) -> Result<(), DecodeError> {
        if self.read_buffer(size)? {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedEnd {
                needed: size,
                offset: self.position(),
            })
        }
    }

    /// Decode one varint of up to 32 significant bits.
    pub fn decode_varint32(&mut self) -> Result<u32, DecodeError> {
        if self.pos + VARINT_LIMIT > self.fill {
            // Near the end of the content fewer than five bytes may remain.
            self.read_buffer(VARINT_LIMIT)?;
        }

        match varint::decode_varint32(&self.buffer[self.pos..self.fill]) {
            Varint::Value(value, used) => {
                self.pos += used;
                Ok(value)
            }
            Varint::Incomplete => Err(DecodeError::UnexpectedEnd {
                needed: VARINT_LIMIT,
                offset: self.position(),
            }),
            Varint::Malformed => Err(DecodeError::MalformedVarint {
                offset: self.position(),
            }),
        }
    }

    /// Decode a length-prefixed run of varints, handing each value to
    /// `visit` until the declared bytes are used up or `visit` returns
    /// `Ok(false)`.
    ///
    /// The returned [`Span`] says whether the values used exactly the
    /// declared bytes; callers turn a mismatch into their own error. The
    /// cursor only advances past the span when it matched.
    pub fn decode_varint_span<F>(&mut self, mut visit: F) -> Result<Span, DecodeError>
    where
        F: FnMut(u32) -> Result<bool, DecodeError>,
    {
        let declared = self.decode_varint32()? as usize;
        self.ensure(declared)?;

        let end = self.pos + declared;
        let mut cursor = self.pos;

        let mut cut_off = false;

        while cursor < end {
            // A value may straddle the span end; the length check catches it.
            let value = match varint::decode_varint32(&self.buffer[cursor..self.fill]) {
                Varint::Value(value, used) => {
                    cursor += used;
                    value
                }
                Varint::Incomplete => {
                    cut_off = true;
                    break;
                }
                Varint::Malformed => {
                    return Err(DecodeError::MalformedVarint {
                        offset: self.buffer_offset + cursor,
                    })
                }
            };

            if !visit(value)? {
                break;
            }
        }

        // A value cut off by the end of the buffered bytes needs at least
        // one byte more than is there, so it always overruns the span.
        let consumed = if cut_off {
            self.fill - self.pos + 1
        } else {
            cursor - self.pos
        };
        let span = Span { declared, consumed };
        if span.is_exact() {
            self.pos = cursor;
        }
        Ok(span)
    }

    /// Decode a length-prefixed varint array into `out`.
    ///
    /// Returns the number of values written. Fails with
    /// [`DecodeError::ArraySizeMismatch`] if the span holds more values than
    /// `out` can take or if the values do not use exactly the declared bytes.
    pub fn decode_varint_array(&mut self, out: &mut [u32]) -> Result<usize, DecodeError> {
        let capacity = out.len();
        let mut count = 0;

        let span = self.decode_varint_span(|value| {
            if count == capacity {
                return Err(DecodeError::ArraySizeMismatch {
                    capacity,
                    declared: 0,
                    consumed: 0,
                });
            }
            out[count] = value;
            count += 1;
            Ok(true)
        });

        match span {
            Ok(span) if span.is_exact() => Ok(count),
            Ok(span) => Err(DecodeError::ArraySizeMismatch {
                capacity,
                declared: span.declared,
                consumed: span.consumed,
            }),
            Err(e) => Err(e),
        }
    }

    /// Decode a length-prefixed UTF-8 string.
    pub fn decode_string(&mut self) -> Result<String, DecodeError> {
        let size = self.decode_varint32()? as usize;
        self.ensure(size)?;

        let text = std::str::from_utf8(&self.buffer[self.pos..self.pos + size])?.to_owned();
        self.pos += size;
        Ok(text)
    }
}
