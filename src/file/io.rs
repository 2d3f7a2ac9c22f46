//! Low-level byte order and safe reading/writing utilities for dump decoding.
//!
//! This module provides endian-aware binary data access for parsing bytecode dumps.
//! It implements safe, bounds-checked operations for reading primitive types from byte
//! buffers with both little-endian and big-endian support (the dump's `BIG_ENDIAN` flag
//! selects which), plus the variable-length unsigned integer ("uleb128") codec the
//! container uses for every count and length field.
//!
//! # Architecture
//!
//! The module is built around the [`crate::file::io::DumpIO`] trait which provides a
//! unified interface for reading and writing binary data in a type-safe manner:
//!
//! - Generic trait-based reading and writing for all primitive types
//! - Automatic bounds checking to prevent buffer overruns
//! - Consistent error handling through the [`crate::Result`] type
//!
//! # Key Components
//!
//! - [`crate::file::io::DumpIO`] - Trait defining endian-aware conversions for primitive types
//! - [`crate::file::io::read_le_at`] / [`crate::file::io::read_be_at`] - Offset-tracked reads
//! - [`crate::file::io::write_le_at`] / [`crate::file::io::write_be_at`] - Offset-tracked writes
//! - [`crate::file::io::read_uleb128_at`] / [`crate::file::io::write_uleb128`] - Varint codec
//!
//! The write side exists so tests and benchmarks can assemble dumps byte-exactly; the
//! crate exposes no re-serialization of decoded trees.
//!
//! # Usage Examples
//!
//! ```rust
//! use bcdump::file::io::{read_le_at, write_uleb128, read_uleb128_at};
//!
//! let data = [0x01, 0x00, 0x02, 0x00];
//! let mut offset = 0;
//! let first: u16 = read_le_at(&data, &mut offset)?;
//! assert_eq!(first, 1);
//! assert_eq!(offset, 2);
//!
//! let mut buf = Vec::new();
//! write_uleb128(&mut buf, 16384);
//! let mut offset = 0;
//! assert_eq!(read_uleb128_at(&buf, &mut offset)?, 16384);
//! # Ok::<(), bcdump::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All reading functions return [`crate::Result<T>`] and fail with
//! [`crate::Error::Truncated`] when insufficient bytes remain, or
//! [`crate::Error::MalformedVarint`] for an unterminated varint.

use crate::{Error::MalformedVarint, Error::Truncated, Result};

/// Maximum number of bytes a single uleb128 value may occupy.
///
/// Ten 7-bit groups cover the full 64-bit range; an eleventh continuation
/// byte can only come from corrupted or hostile input.
pub const MAX_ULEB128_BYTES: usize = 10;

/// Trait for implementing type-specific safe binary data reading operations.
///
/// This trait provides a unified interface for reading primitive types from byte slices
/// in a safe and endian-aware manner. It abstracts over the conversion from byte arrays
/// to typed values, supporting both the little-endian default and the big-endian mode a
/// dump can select through its global flags.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait DumpIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    ///
    /// This type must be convertible from a byte slice and is used for reading
    /// binary data in both little-endian and big-endian formats.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_dump_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl DumpIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_dump_io! {
    u8 => 1, i8 => 1,
    u16 => 2, i16 => 2,
    u32 => 4, i32 => 4,
    u64 => 8, i64 => 8,
    f32 => 4, f64 => 8,
}

/// Safely reads a value of type `T` in little-endian byte order from a data buffer.
///
/// Reads from the beginning of the buffer; supports all [`crate::file::io::DumpIO`] types.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
pub fn read_le<T: DumpIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes read.
///
/// # Arguments
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (advanced after reading)
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
///
/// # Examples
///
/// ```rust
/// use bcdump::file::io::read_le_at;
///
/// let data = [0x01, 0x00, 0x02, 0x00]; // Two u16 values: 1, 2
/// let mut offset = 0;
///
/// let first: u16 = read_le_at(&data, &mut offset)?;
/// assert_eq!(first, 1);
/// let second: u16 = read_le_at(&data, &mut offset)?;
/// assert_eq!(second, 2);
/// assert_eq!(offset, 4);
/// # Ok::<(), bcdump::Error>(())
/// ```
pub fn read_le_at<T: DumpIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Truncated);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(Truncated);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Safely reads a value of type `T` in big-endian byte order from a data buffer.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
pub fn read_be<T: DumpIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Safely reads a value of type `T` in big-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes read. Used for dumps whose
/// `BIG_ENDIAN` flag is set.
///
/// # Arguments
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (advanced after reading)
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes.
pub fn read_be_at<T: DumpIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Truncated);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(Truncated);
    };

    *offset += type_len;

    Ok(T::from_be_bytes(read))
}

/// Decodes a uleb128 variable-length unsigned integer at a specific offset.
///
/// Each byte contributes 7 value bits, least-significant group first; a set
/// high bit means another byte follows. The offset is advanced past the
/// terminating byte.
///
/// # Arguments
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (advanced after reading)
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if the buffer ends mid-value, or
/// [`crate::Error::MalformedVarint`] if no terminating byte appears within
/// [`MAX_ULEB128_BYTES`] bytes.
///
/// # Examples
///
/// ```rust
/// use bcdump::file::io::read_uleb128_at;
///
/// let data = [0x80, 0x01]; // 128
/// let mut offset = 0;
/// assert_eq!(read_uleb128_at(&data, &mut offset)?, 128);
/// assert_eq!(offset, 2);
/// # Ok::<(), bcdump::Error>(())
/// ```
pub fn read_uleb128_at(data: &[u8], offset: &mut usize) -> Result<u64> {
    let mut value = 0_u64;
    let mut shift = 0_u32;
    let mut consumed = 0_usize;

    loop {
        if *offset >= data.len() {
            return Err(Truncated);
        }
        if consumed >= MAX_ULEB128_BYTES {
            return Err(MalformedVarint);
        }

        let byte = data[*offset];
        *offset += 1;
        consumed += 1;

        value |= u64::from(byte & 0x7F) << shift;
        shift += 7;

        if (byte & 0x80) == 0 {
            break;
        }
    }

    Ok(value)
}

/// Encodes a uleb128 variable-length unsigned integer, appending to `out`.
///
/// The exact inverse of [`read_uleb128_at`]; exists so fixtures and
/// benchmarks can assemble dumps byte-exactly.
///
/// # Examples
///
/// ```rust
/// use bcdump::file::io::write_uleb128;
///
/// let mut out = Vec::new();
/// write_uleb128(&mut out, 128);
/// assert_eq!(out, [0x80, 0x01]);
/// ```
pub fn write_uleb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Safely writes a value of type `T` in little-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes written.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes in the buffer.
pub fn write_le_at<T: DumpIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()>
where
    T::Bytes: AsRef<[u8]>,
{
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Truncated);
    }

    data[*offset..*offset + type_len].copy_from_slice(value.to_le_bytes().as_ref());
    *offset += type_len;

    Ok(())
}

/// Safely writes a value of type `T` in big-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes written.
///
/// # Errors
/// Returns [`crate::Error::Truncated`] if there are insufficient bytes in the buffer.
pub fn write_be_at<T: DumpIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()>
where
    T::Bytes: AsRef<[u8]>,
{
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Truncated);
    }

    data[*offset..*offset + type_len].copy_from_slice(value.to_be_bytes().as_ref());
    *offset += type_len;

    Ok(())
}
