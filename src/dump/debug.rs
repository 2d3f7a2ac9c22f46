//! Optional per-prototype debug metadata: line numbers, upvalue names, and
//! local variable scopes.
//!
//! Dumps written with the strip option omit this block entirely; the prototype
//! header then declares a zero-length debug area. When present, the block sits
//! at the very end of the prototype record and packs three tables back to back:
//!
//! 1. A *line table* with one entry per instruction, storing each instruction's
//!    source line as an offset from the prototype's first line. Entry width is
//!    chosen by the line span - one, two, or four bytes - and multi-byte entries
//!    follow the dump's declared byte order.
//! 2. An *upvalue name table*: one zero-terminated string per upvalue.
//! 3. A *variable table*: a sequence of scope records terminated by a zero
//!    byte. Compiler-internal loop variables are encoded as single-byte codes;
//!    user variables as zero-terminated names. Scope start points are
//!    delta-encoded against the previous record's start.
//!
//! The block's declared byte length must match what the three tables consume
//! exactly; any slack is reported as [`crate::Error::CountMismatch`].

use crate::{
    file::parser::{Endian, Parser},
    Result,
};

/// First byte value that can begin a user-supplied variable name.
///
/// Bytes below this are single-byte codes for compiler-internal variables;
/// real identifiers never start with a control byte, so the two encodings
/// cannot collide.
const VARNAME_MAX: u8 = 7;

/// Decoded debug metadata for one prototype.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DebugInfo {
    /// Byte length of the packed tables, as declared in the prototype header
    pub size: u32,
    /// Source line of the first instruction
    pub first_line: u32,
    /// Number of source lines the prototype spans
    pub line_count: u32,
    /// Absolute source line for each instruction, in instruction order
    pub lines: Vec<u32>,
    /// Name bytes for each upvalue, in upvalue table order
    pub upvalue_names: Vec<Vec<u8>>,
    /// Local variable scope records, in declaration order
    pub vars: Vec<VarInfo>,
}

/// The name of a local variable slot.
#[derive(Debug, Clone, PartialEq)]
pub enum VarName {
    /// Hidden index of a numeric `for` loop (code 0x01)
    ForIndex,
    /// Hidden stop value of a numeric `for` loop (code 0x02)
    ForStop,
    /// Hidden step value of a numeric `for` loop (code 0x03)
    ForStep,
    /// Hidden generator of a generic `for` loop (code 0x04)
    ForGenerator,
    /// Hidden state of a generic `for` loop (code 0x05)
    ForState,
    /// Hidden control variable of a generic `for` loop (code 0x06)
    ForControl,
    /// A user-supplied identifier; arbitrary bytes, no encoding is assumed
    Named(Vec<u8>),
}

/// One local variable's name and live range.
#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    /// Variable name or compiler-internal code
    pub name: VarName,
    /// First instruction index at which the variable is live
    pub start_pc: u32,
    /// First instruction index past the variable's live range
    pub end_pc: u32,
}

/// Reads bytes up to (and consuming) a zero terminator.
fn read_zero_terminated(parser: &mut Parser<'_>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    loop {
        let byte = parser.read::<u8>()?;
        if byte == 0 {
            return Ok(bytes);
        }
        bytes.push(byte);
    }
}

impl DebugInfo {
    /// Decodes a debug block of exactly `data.len()` bytes.
    ///
    /// `first_line` and `line_count` come from the prototype header;
    /// `instruction_count` and `upvalue_count` size the line and name tables.
    /// Multi-byte line entries are read with `endian`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Truncated`] if a table needs more bytes than
    /// the block holds, [`crate::Error::CountMismatch`] if bytes are left
    /// over after the variable table's terminator, or
    /// [`crate::Error::Malformed`] if a line offset overflows.
    pub(crate) fn parse(
        data: &[u8],
        endian: Endian,
        first_line: u32,
        line_count: u32,
        instruction_count: usize,
        upvalue_count: usize,
    ) -> Result<Self> {
        let mut parser = Parser::with_endian(data, endian);

        let mut lines = Vec::with_capacity(instruction_count);
        for _ in 0..instruction_count {
            let offset = if line_count < 0x100 {
                u32::from(parser.read::<u8>()?)
            } else if line_count < 0x1_0000 {
                u32::from(parser.read::<u16>()?)
            } else {
                parser.read::<u32>()?
            };
            let line = first_line.checked_add(offset).ok_or_else(|| {
                malformed_error!(
                    "line offset {} overflows from first line {}",
                    offset,
                    first_line
                )
            })?;
            lines.push(line);
        }

        let mut upvalue_names = Vec::with_capacity(upvalue_count);
        for _ in 0..upvalue_count {
            upvalue_names.push(read_zero_terminated(&mut parser)?);
        }

        let mut vars = Vec::new();
        let mut last_start: u64 = 0;
        loop {
            let first = parser.peek_byte()?;
            let name = if first >= VARNAME_MAX {
                VarName::Named(read_zero_terminated(&mut parser)?)
            } else {
                parser.advance_by(1)?;
                match first {
                    0 => break,
                    1 => VarName::ForIndex,
                    2 => VarName::ForStop,
                    3 => VarName::ForStep,
                    4 => VarName::ForGenerator,
                    5 => VarName::ForState,
                    _ => VarName::ForControl,
                }
            };

            let delta = parser.read_uleb128()?;
            let extent = parser.read_uleb128()?;
            let start = last_start
                .checked_add(delta)
                .filter(|start| *start <= u64::from(u32::MAX))
                .ok_or_else(|| malformed_error!("variable scope start overflows"))?;
            let end = start
                .checked_add(extent)
                .filter(|end| *end <= u64::from(u32::MAX))
                .ok_or_else(|| malformed_error!("variable scope end overflows"))?;
            last_start = start;

            vars.push(VarInfo {
                name,
                start_pc: start as u32,
                end_pc: end as u32,
            });
        }

        if parser.has_more_data() {
            return Err(count_mismatch_error!(
                "debug block declares {} bytes but {} remain after the variable table",
                data.len(),
                parser.remaining()
            ));
        }

        Ok(DebugInfo {
            size: data.len() as u32,
            first_line,
            line_count,
            lines,
            upvalue_names,
            vars,
        })
    }

    /// Source line of the instruction at `pc`, if the line table covers it.
    #[must_use]
    pub fn line_at(&self, pc: usize) -> Option<u32> {
        self.lines.get(pc).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: &[u8], names: &[&[u8]], vars: &[u8]) -> Vec<u8> {
        let mut data = lines.to_vec();
        for name in names {
            data.extend_from_slice(name);
            data.push(0);
        }
        data.extend_from_slice(vars);
        data.push(0);
        data
    }

    #[test]
    fn narrow_line_table_and_names() {
        // Two instructions on lines 10 and 12, one upvalue, no variables.
        let data = block(&[0, 2], &[b"counter"], &[]);
        let info = DebugInfo::parse(&data, Endian::Little, 10, 3, 2, 1).unwrap();
        assert_eq!(info.lines, vec![10, 12]);
        assert_eq!(info.upvalue_names, vec![b"counter".to_vec()]);
        assert!(info.vars.is_empty());
        assert_eq!(info.line_at(1), Some(12));
        assert_eq!(info.line_at(2), None);
    }

    #[test]
    fn wide_line_table_respects_endianness() {
        // A span of 300 lines forces two-byte entries.
        let little = DebugInfo::parse(&block(&[0x2C, 0x01], &[], &[]), Endian::Little, 1, 300, 1, 0)
            .unwrap();
        assert_eq!(little.lines, vec![1 + 0x012C]);

        let big =
            DebugInfo::parse(&block(&[0x01, 0x2C], &[], &[]), Endian::Big, 1, 300, 1, 0).unwrap();
        assert_eq!(big.lines, vec![1 + 0x012C]);

        // A span past 65535 lines widens entries to four bytes.
        let wide = DebugInfo::parse(
            &block(&[0x78, 0x56, 0x01, 0x00], &[], &[]),
            Endian::Little,
            1,
            0x2_0000,
            1,
            0,
        )
        .unwrap();
        assert_eq!(wide.lines, vec![1 + 0x0001_5678]);
    }

    #[test]
    fn variable_scopes_are_delta_decoded() {
        // A named variable starting at pc 2 for 3 instructions, then a loop
        // index starting 5 later for 1 instruction.
        let mut vars = Vec::new();
        vars.extend_from_slice(b"x");
        vars.push(0);
        vars.extend_from_slice(&[2, 3]);
        vars.push(1); // ForIndex code
        vars.extend_from_slice(&[5, 1]);

        let data = block(&[], &[], &vars);
        let info = DebugInfo::parse(&data, Endian::Little, 1, 1, 0, 0).unwrap();
        assert_eq!(
            info.vars,
            vec![
                VarInfo {
                    name: VarName::Named(b"x".to_vec()),
                    start_pc: 2,
                    end_pc: 5,
                },
                VarInfo {
                    name: VarName::ForIndex,
                    start_pc: 7,
                    end_pc: 8,
                },
            ]
        );
    }

    #[test]
    fn trailing_bytes_are_a_mismatch() {
        let mut data = block(&[], &[], &[]);
        data.push(0xAB);
        let err = DebugInfo::parse(&data, Endian::Little, 1, 1, 0, 0).unwrap_err();
        assert!(matches!(err, crate::Error::CountMismatch { .. }));
    }

    #[test]
    fn missing_terminator_is_truncated() {
        // Variable table never reaches its zero byte.
        let data = b"x\0\x02\x03".to_vec();
        let err = DebugInfo::parse(&data, Endian::Little, 1, 1, 0, 0).unwrap_err();
        assert!(matches!(err, crate::Error::Truncated));
    }
}
