//! Compiled-bytecode dump container: header, chunk name, and prototype tree.
//!
//! A dump is the serialized form of a compiled chunk. It opens with a
//! three-byte magic, a format version, and a varint flag word, optionally
//! names its source chunk, and then carries the chunk's function prototypes
//! as length-prefixed records, children nested inside their parents' constant
//! pools. A zero-length record terminates the sequence and also ends the
//! container; anything after it is rejected.
//!
//! Decoding is strict and total: every declared length and count is checked
//! against the bytes that actually back it, hostile values hit fixed ceilings
//! before any proportional allocation, and any violation aborts the whole
//! decode with a typed [`crate::Error`]. On success the returned [`Dump`]
//! owns the entire tree and is immutable.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bcdump::Dump;
//!
//! let dump = Dump::from_file("chunk.bin")?;
//! println!(
//!     "version {} with {} top-level prototypes",
//!     dump.version(),
//!     dump.protos().len()
//! );
//! for proto in dump.protos() {
//!     println!("  {} instructions", proto.instructions().len());
//! }
//! # Ok::<(), bcdump::Error>(())
//! ```

use std::{fs::File, path::Path};

use memmap2::Mmap;

use crate::{
    file::parser::{Endian, Parser, MAX_PREFIX_LENGTH},
    Result,
};

pub mod constants;
pub mod debug;
pub mod flags;
pub mod proto;

pub use constants::{GcConstant, NumConstant, TableConstant, TableValue};
pub use debug::{DebugInfo, VarInfo, VarName};
pub use flags::{DumpFlags, ProtoFlags};
pub use proto::Proto;

/// The three magic bytes every dump starts with: `\x1B` `L` `J`.
pub const MAGIC: [u8; 3] = [0x1B, b'L', b'J'];

/// Lowest dump format version this decoder accepts.
pub const MIN_VERSION: u8 = 1;

/// Highest dump format version this decoder accepts.
pub const MAX_VERSION: u8 = 2;

/// Ceiling for any declared element count (instructions, constants, table
/// entries). Checked before allocating anything proportional to the count.
pub const MAX_COUNT: u64 = 1 << 20;

/// Ceiling for child-prototype nesting depth.
pub const MAX_PROTO_DEPTH: usize = 128;

/// Per-decode settings derived from the dump header, threaded through every
/// record decoder below it.
pub(crate) struct DecodeContext {
    /// Byte order for fixed-width fields, from the `BIG_ENDIAN` flag
    pub endian: Endian,
    /// Dump-wide strip bit; a proto is stripped if either this or its own bit is set
    pub strip: bool,
    /// Whether FFI constant tags are admissible
    pub ffi: bool,
}

/// Reads a varint whose value must fit 32 bits.
pub(crate) fn read_uleb128_u32(parser: &mut Parser<'_>) -> Result<u32> {
    let value = parser.read_uleb128()?;
    if value > u64::from(u32::MAX) {
        return Err(malformed_error!("varint {:#x} wider than 32 bits", value));
    }
    Ok(value as u32)
}

/// A fully decoded bytecode dump.
///
/// Owns the complete prototype tree. Construction goes through
/// [`Dump::from_slice`] or [`Dump::from_file`]; there is no partial or lazy
/// decoding, so every accessor is infallible.
#[derive(Debug, Clone, PartialEq)]
pub struct Dump {
    version: u8,
    flags: DumpFlags,
    chunk_name: Option<Vec<u8>>,
    protos: Vec<Proto>,
}

impl Dump {
    /// Decodes a dump from an in-memory byte slice.
    ///
    /// The slice must contain exactly one dump: bytes past the terminator
    /// are an error, not ignored trailer.
    ///
    /// # Errors
    /// Returns [`crate::Error::BadMagic`] or
    /// [`crate::Error::UnsupportedVersion`] if the input is not a dump this
    /// decoder understands, and the structural variants
    /// ([`crate::Error::Truncated`], [`crate::Error::CountMismatch`],
    /// [`crate::Error::Malformed`], ...) if it is damaged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bcdump::{Dump, Error};
    ///
    /// // Magic, version 2, stripped flag, terminator: the smallest valid dump.
    /// let dump = Dump::from_slice(&[0x1B, b'L', b'J', 0x02, 0x02, 0x00])?;
    /// assert!(dump.is_stripped());
    /// assert!(dump.protos().is_empty());
    /// # Ok::<(), Error>(())
    /// ```
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let mut parser = Parser::new(data);

        let magic = parser.read_bytes(MAGIC.len())?;
        if magic != MAGIC {
            return Err(crate::Error::BadMagic {
                found: [magic[0], magic[1], magic[2]],
            });
        }

        let version = parser.read::<u8>()?;
        if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
            return Err(crate::Error::UnsupportedVersion(version));
        }

        let flags = DumpFlags::from_bits_retain(parser.read_uleb128()?);
        let ctx = DecodeContext {
            endian: if flags.contains(DumpFlags::BIG_ENDIAN) {
                Endian::Big
            } else {
                Endian::Little
            },
            strip: flags.contains(DumpFlags::STRIP),
            ffi: flags.contains(DumpFlags::FFI),
        };
        parser.set_endian(ctx.endian);

        let chunk_name = if ctx.strip {
            None
        } else {
            Some(parser.read_prefixed_bytes()?.to_vec())
        };

        let mut protos = Vec::new();
        loop {
            let length = parser.read_uleb128()?;
            if length == 0 {
                break;
            }
            if length > MAX_PREFIX_LENGTH {
                return Err(crate::Error::LengthTooLarge {
                    declared: length,
                    limit: MAX_PREFIX_LENGTH,
                });
            }
            let record = parser.read_bytes(length as usize)?;
            protos.push(Proto::parse_record(record, &ctx, 0)?);
        }

        if parser.has_more_data() {
            return Err(malformed_error!(
                "{} bytes after the dump terminator",
                parser.remaining()
            ));
        }

        Ok(Dump {
            version,
            flags,
            chunk_name,
            protos,
        })
    }

    /// Memory-maps a file and decodes it as a dump.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// mapped, otherwise whatever [`Dump::from_slice`] returns for its
    /// contents.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        // Safety: the mapping is read-only and dropped before this function
        // returns; the decoded Dump borrows nothing from it.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_slice(&mmap)
    }

    /// Dump format version byte.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Dump flag bits, unknown bits preserved.
    #[must_use]
    pub fn flags(&self) -> DumpFlags {
        self.flags
    }

    /// Source chunk name bytes, `None` for stripped dumps.
    ///
    /// Arbitrary bytes; no text encoding is assumed.
    #[must_use]
    pub fn chunk_name(&self) -> Option<&[u8]> {
        self.chunk_name.as_deref()
    }

    /// Top-level prototypes, in encoding order.
    #[must_use]
    pub fn protos(&self) -> &[Proto] {
        &self.protos
    }

    /// Returns `true` if the dump was written without debug metadata.
    #[must_use]
    pub fn is_stripped(&self) -> bool {
        self.flags.contains(DumpFlags::STRIP)
    }

    /// Returns `true` if fixed-width fields use big-endian byte order.
    #[must_use]
    pub fn is_big_endian(&self) -> bool {
        self.flags.contains(DumpFlags::BIG_ENDIAN)
    }

    /// Returns `true` if the dump may carry FFI constant kinds.
    #[must_use]
    pub fn has_ffi(&self) -> bool {
        self.flags.contains(DumpFlags::FFI)
    }
}
