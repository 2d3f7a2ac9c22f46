//! # bcdump Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the bcdump library. Import this module to get quick access to the
//! essential types for working with compiled-bytecode dumps.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all bcdump operations
pub use crate::Error;

/// The result type used throughout bcdump
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Main entry point for decoding dumps
pub use crate::Dump;

/// Low-level byte parsing utilities
pub use crate::Parser;

// ================================================================================================
// Dump Contents
// ================================================================================================

/// One function prototype inside a dump
pub use crate::dump::Proto;

/// Dump and prototype header flag bits
pub use crate::dump::{DumpFlags, ProtoFlags};

/// Constant pool entry kinds
pub use crate::dump::{GcConstant, NumConstant, TableConstant, TableValue};

/// Optional per-prototype debug metadata
pub use crate::dump::{DebugInfo, VarInfo, VarName};

/// Magic bytes and format version bounds
pub use crate::dump::{MAGIC, MAX_VERSION, MIN_VERSION};
