//! Low-level byte stream parser for bytecode dump decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary
//! data parser designed for reading bytecode dump structures. It offers bounds-checked
//! sequential access to binary data with support for both little-endian and big-endian
//! fixed-width fields (the dump's `BIG_ENDIAN` flag selects the mode once, at decode
//! start), variable-length integers, and length-prefixed byte runs.
//!
//! # Architecture
//!
//! The parser is built around a simple cursor-based model that maintains a position
//! within a byte slice:
//!
//! - **Position tracking** - Maintains current offset for sequential parsing operations
//! - **Bounds checking** - All operations validate data availability before reading
//! - **Byte-order mode** - Fixed-width reads honor the [`Endian`] selected at construction
//! - **Sub-cursors** - Length-bounded records are decoded through a bounded child parser
//!
//! # Usage Examples
//!
//! ```rust
//! use bcdump::{Endian, Parser};
//!
//! let data = [0x05, 0x01, 0x02, 0x03, 0x04, 0x05];
//! let mut parser = Parser::new(&data);
//!
//! // A length-prefixed byte run: varint length, then that many bytes.
//! let bytes = parser.read_prefixed_bytes()?;
//! assert_eq!(bytes, &[0x01, 0x02, 0x03, 0x04, 0x05]);
//! assert!(!parser.has_more_data());
//! # Ok::<(), bcdump::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, read_le_at, read_uleb128_at, DumpIO},
    Result,
};

/// Ceiling for any single length-prefixed byte run.
///
/// A corrupted length field must fail fast instead of triggering a
/// multi-gigabyte allocation; 64 MiB comfortably covers any real chunk
/// name, string constant, or prototype record.
pub const MAX_PREFIX_LENGTH: u64 = 1 << 26;

/// Byte order for fixed-width fields.
///
/// Selected once per dump from the global `BIG_ENDIAN` flag and threaded
/// through the cursor, rather than re-derived per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Least-significant byte first (the format default)
    #[default]
    Little,
    /// Most-significant byte first
    Big,
}

/// A generic binary data parser for reading bytecode dump structures.
///
/// `Parser` provides a cursor-based interface for reading binary data in both
/// little-endian and big-endian formats. It maintains an internal position cursor
/// and provides bounds checking to prevent buffer overruns when reading malformed
/// or truncated data; no operation ever reads past the end of the slice, and all
/// bound checks happen before any allocation.
///
/// # Examples
///
/// ```rust
/// use bcdump::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut parser = Parser::new(&data);
///
/// let value: u16 = parser.read()?;
/// assert_eq!(value, 0x0201); // little-endian by default
/// assert_eq!(parser.pos(), 2);
/// # Ok::<(), bcdump::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
    /// Byte order applied to fixed-width reads
    endian: Endian,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice, defaulting to little-endian.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser {
            data,
            position: 0,
            endian: Endian::Little,
        }
    }

    /// Create a new [`Parser`] with an explicit byte-order mode.
    ///
    /// Used for sub-cursors over length-bounded records, which inherit the
    /// mode the enclosing dump already selected.
    #[must_use]
    pub fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Parser {
            data,
            position: 0,
            endian,
        }
    }

    /// Returns the byte-order mode fixed-width reads currently use.
    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Set the byte-order mode for all subsequent fixed-width reads.
    ///
    /// The dump decoder calls this exactly once, after reading the global
    /// flags; everything decoded afterwards honors the selected mode.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    ///
    /// ```rust
    /// use bcdump::Parser;
    /// let data = [0x01];
    /// let mut parser = Parser::new(&data);
    /// assert!(parser.has_more_data());
    /// let _: u8 = parser.read()?;
    /// assert!(!parser.has_more_data());
    /// # Ok::<(), bcdump::Error>(())
    /// ```
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining from the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Ensures that at least `needed` bytes are available from the current position.
    ///
    /// Used to validate declared payload sizes before allocating for them.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if fewer than `needed` bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(crate::Error::Truncated);
        }
        Ok(())
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Arguments
    /// * `step` - Amount of bytes to advance
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if advancing by `step` would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if self.position + step > self.data.len() {
            return Err(crate::Error::Truncated);
        }

        self.position += step;
        Ok(())
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// The dump decoder uses this to check for the terminator record before
    /// attempting to decode a real prototype at the same position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if position is at or beyond the data length.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(crate::Error::Truncated);
        }
        Ok(self.data[self.position])
    }

    /// Read a type `T` from the current position and advance, honoring the endian mode.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if reading would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bcdump::{Endian, Parser};
    ///
    /// let data = [0x01, 0x02];
    /// let mut le = Parser::new(&data);
    /// let mut be = Parser::with_endian(&data, Endian::Big);
    /// assert_eq!(le.read::<u16>()?, 0x0201);
    /// assert_eq!(be.read::<u16>()?, 0x0102);
    /// # Ok::<(), bcdump::Error>(())
    /// ```
    pub fn read<T: DumpIO>(&mut self) -> Result<T> {
        match self.endian {
            Endian::Little => read_le_at::<T>(self.data, &mut self.position),
            Endian::Big => read_be_at::<T>(self.data, &mut self.position),
        }
    }

    /// Reads a slice of bytes of the specified length from the current position.
    ///
    /// Performs bounds checking and advances the position after reading. The
    /// returned slice borrows from the parser's underlying buffer (zero-copy).
    ///
    /// # Arguments
    /// * `length` - The number of bytes to read
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if reading `length` bytes would exceed the data.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(crate::Error::Truncated)?;

        if end > self.data.len() {
            return Err(crate::Error::Truncated);
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Decodes a uleb128 variable-length unsigned integer and advances past it.
    ///
    /// Varints are byte-order neutral; the endian mode does not apply.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if the data ends mid-value, or
    /// [`crate::Error::MalformedVarint`] if no terminating byte appears within
    /// [`crate::file::io::MAX_ULEB128_BYTES`] bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bcdump::Parser;
    ///
    /// let data = [0xE5, 0x8E, 0x26];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_uleb128()?, 624485);
    /// # Ok::<(), bcdump::Error>(())
    /// ```
    pub fn read_uleb128(&mut self) -> Result<u64> {
        read_uleb128_at(self.data, &mut self.position)
    }

    /// Reads a varint length `L` followed by exactly `L` bytes.
    ///
    /// This is the container's encoding for chunk names, string constants,
    /// and prototype records. The length is validated against
    /// [`MAX_PREFIX_LENGTH`] before any slicing happens.
    ///
    /// # Errors
    /// Returns [`crate::Error::LengthTooLarge`] if `L` exceeds the ceiling,
    /// [`crate::Error::Truncated`] if fewer than `L` bytes remain, or
    /// [`crate::Error::MalformedVarint`] for a corrupt length field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bcdump::Parser;
    ///
    /// let data = [0x03, b'f', b'o', b'o'];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_prefixed_bytes()?, b"foo");
    /// # Ok::<(), bcdump::Error>(())
    /// ```
    pub fn read_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let length = self.read_uleb128()?;
        if length > MAX_PREFIX_LENGTH {
            return Err(crate::Error::LengthTooLarge {
                declared: length,
                limit: MAX_PREFIX_LENGTH,
            });
        }

        // MAX_PREFIX_LENGTH fits in usize on every supported target.
        self.read_bytes(length as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn read_endian_modes() {
        let data = [0x01, 0x02, 0x03, 0x04];

        let mut parser = Parser::new(&data);
        assert_eq!(parser.read::<u32>().unwrap(), 0x0403_0201);

        let mut parser = Parser::with_endian(&data, Endian::Big);
        assert_eq!(parser.read::<u32>().unwrap(), 0x0102_0304);
    }

    #[test]
    fn set_endian_applies_to_later_reads() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read::<u16>().unwrap(), 0x0201);

        parser.set_endian(Endian::Big);
        assert_eq!(parser.read::<u16>().unwrap(), 0x0304);
    }

    #[test]
    fn peek_does_not_advance() {
        let data = [0xAA, 0xBB];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.peek_byte().unwrap(), 0xAA);
        assert_eq!(parser.pos(), 0);
        assert_eq!(parser.read::<u8>().unwrap(), 0xAA);
        assert_eq!(parser.peek_byte().unwrap(), 0xBB);
    }

    #[test]
    fn read_bytes_bounds() {
        let data = [0x01, 0x02, 0x03];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_bytes(2).unwrap(), &[0x01, 0x02]);
        assert!(matches!(parser.read_bytes(2), Err(Error::Truncated)));
        assert_eq!(parser.pos(), 2);
    }

    #[test]
    fn prefixed_bytes() {
        let data = [0x02, 0xDE, 0xAD];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_prefixed_bytes().unwrap(), &[0xDE, 0xAD]);
    }

    #[test]
    fn prefixed_bytes_truncated() {
        let data = [0x0A, 0x01];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_prefixed_bytes(),
            Err(Error::Truncated)
        ));
    }

    #[test]
    fn prefixed_bytes_too_large() {
        // Declared length far beyond the ceiling, with no payload. It must
        // fail on the declaration alone, before any allocation or slicing.
        let mut data = Vec::new();
        crate::file::io::write_uleb128(&mut data, u64::MAX / 2);
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_prefixed_bytes(),
            Err(Error::LengthTooLarge { .. })
        ));
    }

    #[test]
    fn uleb128_boundaries() {
        for value in [0_u64, 1, 127, 128, 16383, 16384] {
            let mut data = Vec::new();
            crate::file::io::write_uleb128(&mut data, value);
            let mut parser = Parser::new(&data);
            assert_eq!(parser.read_uleb128().unwrap(), value);
            assert!(!parser.has_more_data());
        }
    }

    #[test]
    fn ensure_remaining() {
        let data = [0x01, 0x02, 0x03];
        let mut parser = Parser::new(&data);
        assert!(parser.ensure_remaining(3).is_ok());
        parser.advance_by(1).unwrap();
        assert!(parser.ensure_remaining(2).is_ok());
        assert!(matches!(
            parser.ensure_remaining(3),
            Err(Error::Truncated)
        ));
    }
}
