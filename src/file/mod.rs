//! Byte-level access for dump decoding.
//!
//! This module provides the low-level reading infrastructure everything else in the
//! crate is built on. It abstracts over an in-memory byte source and provides
//! bounds-checked, endian-aware access to its contents.
//!
//! # Key Components
//!
//! - [`crate::file::parser::Parser`] - Cursor-based reader with a byte-order mode,
//!   varint decoding, and length-prefixed byte runs
//! - [`crate::file::io`] - Primitive endian-aware read/write functions and the
//!   [`crate::file::io::DumpIO`] trait
//!
//! The decoder never opens files itself at this layer; callers hand
//! [`crate::Dump::from_slice`] a byte source they obtained however they like
//! (the [`crate::Dump::from_file`] convenience maps the file and delegates here).
//!
//! # Examples
//!
//! ```rust
//! use bcdump::Parser;
//!
//! let data = [0x2A, 0x00];
//! let mut parser = Parser::new(&data);
//! assert_eq!(parser.read_uleb128()?, 42);
//! # Ok::<(), bcdump::Error>(())
//! ```

pub mod io;
pub mod parser;

pub use parser::{Endian, Parser};
