use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! count_mismatch_error {
    ($msg:expr) => {
        crate::Error::CountMismatch {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::CountMismatch {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure mode of the dump decoder maps to exactly one variant, so callers can
/// distinguish "this is not a bytecode dump at all" ([`Error::BadMagic`]) from "this dump
/// is damaged" ([`Error::Truncated`], [`Error::CountMismatch`], ...) and report or skip
/// accordingly. All variants abort the decode of the current dump; the decoder never
/// returns a partially populated tree.
///
/// # Examples
///
/// ```rust
/// use bcdump::{Dump, Error};
///
/// match Dump::from_slice(b"not a dump") {
///     Ok(dump) => println!("decoded {} prototypes", dump.protos().len()),
///     Err(Error::BadMagic { found }) => {
///         eprintln!("not a bytecode dump (starts with {:02x?})", found);
///     }
///     Err(Error::Truncated) => eprintln!("dump is cut short"),
///     Err(e) => eprintln!("decode failed: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input does not start with the dump signature.
    ///
    /// The first three bytes of every dump must equal `1B 4C 4A` (`"\x1BLJ"`).
    /// Anything else means the input is not a dump of this format at all; this
    /// is fatal and raised before any other field is read.
    #[error("Invalid dump signature - found {found:02x?}")]
    BadMagic {
        /// The three bytes that were found where the signature should be
        found: [u8; 3],
    },

    /// The dump declares a format version this library does not understand.
    ///
    /// Unknown *flag* bits are tolerated for forward compatibility, but an
    /// unknown version byte changes the meaning of everything that follows
    /// and cannot be decoded safely.
    #[error("Unsupported dump version - {0}")]
    UnsupportedVersion(u8),

    /// The input ended before a mandatory field could be read.
    ///
    /// Raised whenever fewer bytes remain than a field requires, including
    /// inside length-bounded sub-records. This is a safety check; no read
    /// ever goes past the end of the supplied byte source.
    #[error("Input ended before a mandatory field could be read")]
    Truncated,

    /// A variable-length integer never terminated.
    ///
    /// Each varint byte carries 7 value bits and a continuation bit; a
    /// 64-bit value fits in at most 10 bytes. More continuation bytes than
    /// that means the field is corrupt (or hostile), not merely large.
    #[error("Unterminated variable-length integer")]
    MalformedVarint,

    /// A declared byte length exceeds the sanity ceiling.
    ///
    /// Defends against corrupted or hostile length fields triggering
    /// multi-gigabyte allocations. The ceiling is generous; real dumps
    /// never come close.
    #[error("Declared length {declared} exceeds the limit of {limit} bytes")]
    LengthTooLarge {
        /// The length the dump declared
        declared: u64,
        /// The configured ceiling it exceeded
        limit: u64,
    },

    /// A declared element count exceeds the sanity ceiling.
    ///
    /// Checked before any proportional allocation happens, so a corrupted
    /// count field costs nothing but this error.
    #[error("Declared count {declared} exceeds the limit of {limit}")]
    CountTooLarge {
        /// The count the dump declared
        declared: u64,
        /// The configured ceiling it exceeded
        limit: u64,
    },

    /// A declared size does not reconcile with the bytes actually consumed.
    ///
    /// Prototype records and debug blocks carry their own byte length; when
    /// the fields inside consume more or fewer bytes than declared, the two
    /// views of the input disagree and nothing downstream can be trusted.
    ///
    /// # Fields
    ///
    /// * `message` - What disagreed, and by how much
    /// * `file` - Source file where the mismatch was detected
    /// * `line` - Source line where the mismatch was detected
    #[error("Count mismatch - {file}:{line}: {message}")]
    CountMismatch {
        /// The message to be printed for the CountMismatch error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The dump is damaged in a way no more specific variant covers.
    ///
    /// Examples: an integer constant payload wider than the format allows,
    /// bytes after the terminator record, a zero-length record where a child
    /// prototype is required.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A constant pool entry carries a discriminant this library does not know.
    ///
    /// Constant entries are not separately length-prefixed, so an unknown tag
    /// cannot be skipped - misreading the tag desynchronizes every field after
    /// it. The associated value is the offending discriminant.
    #[error("Unknown constant tag - {0}")]
    UnknownConstantTag(u64),

    /// Child prototypes nest deeper than the configured limit.
    ///
    /// The constant-pool tree is decoded by recursive descent; the cap keeps
    /// a hostile dump from exhausting the call stack. The associated value is
    /// the limit that was reached.
    #[error("Reached the maximum prototype nesting depth allowed - {0}")]
    RecursionLimit(usize),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors from [`crate::Dump::from_file`]; the slice
    /// decoder itself performs no I/O.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
