// Copyright 2026 the bcdump authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'dump/mod.rs' uses mmap to map a file into memory

//! # bcdump
//!
//! A strict decoder for compiled-bytecode dump files: the binary container a
//! just-in-time compiled scripting runtime writes when it serializes compiled
//! chunks. Built in pure Rust, `bcdump` parses the dump header, the optional
//! chunk name, and the tree of function prototypes - instruction streams,
//! upvalue tables, constant pools, and optional debug metadata - with full
//! structural validation and no runtime dependency on the source VM.
//!
//! ## Features
//!
//! - **Total decoding** - every declared length and count is reconciled
//!   against the bytes that back it; malformed input fails with a typed
//!   error, never a panic or a partially populated tree
//! - **Hostile-input ceilings** - corrupted length and count fields are
//!   rejected before they can trigger proportional allocations
//! - **Both byte orders** - dumps written on big-endian hosts decode
//!   transparently via the header's endianness flag
//! - **Memory-mapped files** - `from_file` maps the dump instead of reading
//!   it into a buffer
//! - **Owned results** - the decoded [`Dump`] borrows nothing from the input
//!
//! ## Quick Start
//!
//! Add `bcdump` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! bcdump = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust,no_run
//! use bcdump::prelude::*;
//!
//! let dump = Dump::from_file("chunk.bin")?;
//! println!("decoded {} prototypes", dump.protos().len());
//! # Ok::<(), bcdump::Error>(())
//! ```
//!
//! ### Basic Usage
//!
//! ```rust,no_run
//! use bcdump::Dump;
//!
//! let dump = Dump::from_file("chunk.bin")?;
//!
//! if let Some(name) = dump.chunk_name() {
//!     println!("chunk: {}", String::from_utf8_lossy(name));
//! }
//!
//! for proto in dump.protos() {
//!     println!(
//!         "{} params, {} instructions, {} constants",
//!         proto.num_params(),
//!         proto.instructions().len(),
//!         proto.gc_constants().len() + proto.num_constants().len(),
//!     );
//! }
//! # Ok::<(), bcdump::Error>(())
//! ```
//!
//! ### Walking the Prototype Tree
//!
//! Functions defined inside other functions live in their parent's GC
//! constant pool:
//!
//! ```rust,no_run
//! use bcdump::{Dump, Proto};
//!
//! fn count_protos(proto: &Proto) -> usize {
//!     1 + proto.children().map(count_protos).sum::<usize>()
//! }
//!
//! let dump = Dump::from_file("chunk.bin")?;
//! let total: usize = dump.protos().iter().map(count_protos).sum();
//! println!("{} prototypes in the tree", total);
//! # Ok::<(), bcdump::Error>(())
//! ```
//!
//! ### Handling Malformed Input
//!
//! All failures are values; a decode error never aborts the process, so
//! batch tooling can report and move on:
//!
//! ```rust
//! use bcdump::{Dump, Error};
//!
//! match Dump::from_slice(b"\x1BLJ\x63") {
//!     Ok(dump) => println!("version {}", dump.version()),
//!     Err(Error::UnsupportedVersion(v)) => eprintln!("version {} not supported", v),
//!     Err(e) => eprintln!("damaged dump: {}", e),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Byte-level primitives: the cursor [`Parser`], endianness handling, and
/// the varint codec shared by every decoder in the crate.
pub mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use bcdump::prelude::*;
///
/// let dump = Dump::from_file("chunk.bin")?;
/// assert!(dump.version() <= 2);
/// # Ok::<(), bcdump::Error>(())
/// ```
pub mod prelude;

/// The dump container and everything inside it: header flags, prototypes,
/// constant pools, and debug metadata.
///
/// # Key Types
///
/// - [`Dump`] - a fully decoded dump, the crate's main entry point
/// - [`Proto`] - one function prototype
/// - [`dump::GcConstant`] / [`dump::NumConstant`] - constant pool entries
/// - [`dump::DebugInfo`] - per-prototype line and variable metadata
///
/// # Examples
///
/// ```rust
/// use bcdump::Dump;
///
/// // Magic, version 2, stripped flag, terminator.
/// let dump = Dump::from_slice(&[0x1B, b'L', b'J', 0x02, 0x02, 0x00])?;
/// assert!(dump.is_stripped());
/// # Ok::<(), bcdump::Error>(())
/// ```
pub mod dump;

/// `bcdump` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. Used consistently throughout the crate for all fallible
/// operations.
///
/// # Examples
///
/// ```rust,no_run
/// use bcdump::{Dump, Result};
///
/// fn load(path: &str) -> Result<Dump> {
///     Dump::from_file(path)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `bcdump` Error type
///
/// The main error type for all operations in this crate. Provides detailed
/// error information for every way a dump can be unreadable or damaged.
///
/// # Examples
///
/// ```rust
/// use bcdump::{Dump, Error};
///
/// match Dump::from_slice(b"MZ\x90\x00") {
///     Ok(_) => println!("decoded"),
///     Err(Error::BadMagic { found }) => println!("not a dump: {:02x?}", found),
///     Err(e) => println!("error: {}", e),
/// }
/// ```
pub use error::Error;

/// A fully decoded bytecode dump.
///
/// See [`dump::Dump`] for the decode entry points and accessors.
///
/// # Example
///
/// ```rust,no_run
/// use bcdump::Dump;
/// let dump = Dump::from_file("chunk.bin")?;
/// println!("{} prototypes", dump.protos().len());
/// # Ok::<(), bcdump::Error>(())
/// ```
pub use dump::Dump;

/// One function prototype inside a dump.
///
/// See [`dump::Proto`] for the instruction stream, constant pools, and
/// debug metadata accessors.
pub use dump::Proto;

/// Low-level byte cursor used by all decoders, plus its byte-order mode.
///
/// # Example
///
/// ```rust
/// use bcdump::{Endian, Parser};
///
/// let mut parser = Parser::new(&[0x85, 0x02]);
/// assert_eq!(parser.endian(), Endian::Little);
/// assert_eq!(parser.read_uleb128()?, 0x105);
/// # Ok::<(), bcdump::Error>(())
/// ```
pub use file::parser::{Endian, Parser};
