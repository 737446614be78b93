//! # Scan
//!
//! Whitespace- and comment-aware unsigned integer extraction over a byte
//! stream, for the text (`P3`) branch of the PPM family.
//!
//! Every numeric field in a P3 file — width, height, maximum color value,
//! and each channel of every pixel — passes through
//! [`TokenScanner::read_uint`]. Keeping a single chokepoint guarantees the
//! same whitespace and `#`-comment tolerance at every call site; a stricter
//! formatted scan for the dimension fields alone breaks on inputs like
//! `2000 # width`.
//!
//! The scanner never consumes a byte that belongs to the next token. The
//! terminating non-digit is parked in a one-byte pushback slot and handed
//! back on the next read.

use std::io::{self, BufReader, Read};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected character {0:?} where an unsigned integer was expected")]
    MalformedToken(char),
    #[error("unexpected end of input")]
    Exhausted,
    #[error("value {value} exceeds the maximum allowed {max}")]
    OutOfRange { value: u64, max: u64 },
}

/// Returns `true` for the whitespace set PPM headers are insensitive to.
///
/// This is the C locale `isspace` set: space, `\t`, `\n`, vertical tab,
/// form feed, `\r`. Note `u8::is_ascii_whitespace` does not include
/// vertical tab.
pub fn is_space(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0x0b
}

/// Buffered scanner yielding unsigned integer tokens. Wraps the underlying
/// reader in a `BufReader` so single-byte reads stay cheap.
pub struct TokenScanner<R: Read> {
    rdr: BufReader<R>,
    pushback: Option<u8>,
}

impl<R: Read> TokenScanner<R> {
    pub fn from_reader(reader: R) -> Self {
        TokenScanner {
            rdr: BufReader::new(reader),
            pushback: None,
        }
    }

    /// Like [`from_reader`](TokenScanner::from_reader) with an explicit
    /// buffer size, for callers that stream large files.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        TokenScanner {
            rdr: BufReader::with_capacity(capacity, reader),
            pushback: None,
        }
    }

    /// Reads one byte, draining the pushback slot first. `Ok(None)` on end
    /// of stream.
    pub fn next_byte(&mut self) -> Result<Option<u8>, ScanError> {
        if let Some(byte) = self.pushback.take() {
            return Ok(Some(byte));
        }
        let mut byte = [0u8; 1];
        loop {
            match self.rdr.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ScanError::Io(e)),
            }
        }
    }

    /// Parks `byte` so the next [`next_byte`](TokenScanner::next_byte)
    /// returns it again. The slot holds at most one byte.
    pub fn push_back(&mut self, byte: u8) {
        debug_assert!(self.pushback.is_none(), "pushback slot already occupied");
        self.pushback = Some(byte);
    }

    /// Extracts the next unsigned integer token.
    ///
    /// Skips any run of whitespace and `#`-to-end-of-line comments, then
    /// accumulates decimal digits until the first non-digit, which is
    /// pushed back so delimiters stay available to the caller.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Exhausted`] if the stream ends before any digit.
    /// - [`ScanError::MalformedToken`] if the first significant byte is not
    ///   a digit; that byte is pushed back so the caller is not
    ///   desynchronized.
    /// - [`ScanError::OutOfRange`] if the value exceeds `max_allowed`.
    ///   Overflow is checked before each multiply-add and saturates to
    ///   `max_allowed + 1`, so huge digit strings fail the range check
    ///   deterministically instead of wrapping.
    pub fn read_uint(&mut self, max_allowed: u64) -> Result<u64, ScanError> {
        let mut byte = loop {
            let Some(b) = self.next_byte()? else {
                return Err(ScanError::Exhausted);
            };
            if b == b'#' {
                // comment: discard through end of line (or EOF)
                while let Some(c) = self.next_byte()? {
                    if c == b'\n' {
                        break;
                    }
                }
            } else if !is_space(b) {
                break b;
            }
        };

        if !byte.is_ascii_digit() {
            self.push_back(byte);
            return Err(ScanError::MalformedToken(byte as char));
        }

        let mut value = 0u64;
        loop {
            let digit = u64::from(byte - b'0');
            if value > max_allowed / 10 + 1 {
                value = max_allowed + 1;
            } else {
                value = value * 10 + digit;
            }
            match self.next_byte()? {
                Some(b) if b.is_ascii_digit() => byte = b,
                Some(b) => {
                    self.push_back(b);
                    break;
                }
                None => break,
            }
        }

        if value > max_allowed {
            return Err(ScanError::OutOfRange {
                value,
                max: max_allowed,
            });
        }
        Ok(value)
    }

    /// Skips a contiguous run of comment lines given a byte already read
    /// from the stream, returning the first byte after the run.
    ///
    /// While the byte is `#`, discards through end of line and reads one
    /// more byte. A non-`#` input byte is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`ScanError::Exhausted`] if the stream ends mid-comment or right
    /// after one.
    pub fn skip_comment_run(&mut self, first: u8) -> Result<u8, ScanError> {
        let mut byte = first;
        while byte == b'#' {
            loop {
                match self.next_byte()? {
                    Some(b'\n') => break,
                    Some(_) => continue,
                    None => return Err(ScanError::Exhausted),
                }
            }
            byte = self.next_byte()?.ok_or(ScanError::Exhausted)?;
        }
        Ok(byte)
    }
}
