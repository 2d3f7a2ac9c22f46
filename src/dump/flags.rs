//! Flag bitfields for dumps and prototypes.
//!
//! Both flag fields travel as varints on the wire. Bit meanings are fixed by the
//! format version; bits this library does not know about are preserved verbatim
//! (`from_bits_retain`) rather than rejected, so dumps produced by a newer minor
//! version still decode.

use bitflags::bitflags;

bitflags! {
    /// Global flags carried in the dump header.
    ///
    /// These apply to every prototype in the dump: `BIG_ENDIAN` selects the
    /// byte order of all fixed-width fields, `STRIP` marks that debug
    /// metadata (chunk name included) was omitted at compile time, and `FFI`
    /// permits foreign-function constants in the GC pools.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DumpFlags: u64 {
        /// Fixed-width numeric fields use big-endian byte order
        const BIG_ENDIAN = 0x01;
        /// Debug info was omitted from the whole dump
        const STRIP = 0x02;
        /// The chunk may reference foreign-function constructs
        const FFI = 0x04;
    }
}

bitflags! {
    /// Per-prototype flags.
    ///
    /// The low three bits mirror the dump-level bits with the same meaning
    /// scoped to one function; the remaining bits are per-function
    /// properties recorded by the compiler.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProtoFlags: u64 {
        /// Fixed-width numeric fields use big-endian byte order
        const BIG_ENDIAN = 0x01;
        /// Debug info was omitted for this prototype
        const STRIP = 0x02;
        /// The function references foreign-function constructs
        const FFI = 0x04;
        /// The function accepts a variable number of arguments
        const VARARG = 0x08;
        /// The function encloses child prototypes
        const CHILD = 0x10;
        /// The compiler disabled JIT compilation for this function
        const NOJIT = 0x20;
        /// The function body contains a patched instruction loop
        const ILOOP = 0x40;
    }
}
