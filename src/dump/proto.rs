//! Function prototype records: the unit of compiled code inside a dump.
//!
//! Each prototype is a length-prefixed record. The prefix lets the decoder
//! bound every field read to the record's own bytes, so a lying count inside
//! one prototype can never bleed into its neighbours, and the record payload
//! must reconcile exactly with what its fields consume.
//!
//! Prototypes form a strict ownership tree: a function's GC constant pool
//! embeds the records of the functions defined inside it, decoded recursively
//! with a depth cap.

use crate::{
    dump::constants::{GcConstant, NumConstant},
    dump::debug::DebugInfo,
    dump::flags::ProtoFlags,
    dump::{read_uleb128_u32, DecodeContext, MAX_COUNT, MAX_PROTO_DEPTH},
    file::parser::{Parser, MAX_PREFIX_LENGTH},
    Result,
};

/// A single decoded function prototype.
///
/// Instruction words and upvalue descriptors are carried as opaque integers
/// in host order; the decoder validates structure, not instruction semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct Proto {
    flags: ProtoFlags,
    num_params: u8,
    frame_size: u8,
    num_upvalues: u8,
    instructions: Vec<u32>,
    upvalues: Vec<u16>,
    gc_constants: Vec<GcConstant>,
    num_constants: Vec<NumConstant>,
    debug: Option<DebugInfo>,
}

impl Proto {
    /// Decodes the length-prefixed record at the parser's position.
    ///
    /// Used both for top-level prototypes and for children embedded in a GC
    /// pool; `depth` counts nesting levels already entered.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the record length is zero (the
    /// terminator is reserved and never valid where a record is required),
    /// [`crate::Error::LengthTooLarge`] for a hostile prefix, or any error
    /// from the record body.
    pub(crate) fn parse_child(
        parser: &mut Parser<'_>,
        ctx: &DecodeContext,
        depth: usize,
    ) -> Result<Self> {
        let length = parser.read_uleb128()?;
        if length == 0 {
            return Err(malformed_error!(
                "zero-length record where a child prototype is required"
            ));
        }
        if length > MAX_PREFIX_LENGTH {
            return Err(crate::Error::LengthTooLarge {
                declared: length,
                limit: MAX_PREFIX_LENGTH,
            });
        }
        let record = parser.read_bytes(length as usize)?;
        Self::parse_record(record, ctx, depth + 1)
    }

    /// Decodes one record payload of exactly `data.len()` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] past the nesting cap,
    /// [`crate::Error::CountMismatch`] if the record's fields consume fewer
    /// bytes than declared, [`crate::Error::Truncated`] if they need more,
    /// or any field-level decode error.
    pub(crate) fn parse_record(data: &[u8], ctx: &DecodeContext, depth: usize) -> Result<Self> {
        if depth > MAX_PROTO_DEPTH {
            return Err(crate::Error::RecursionLimit(MAX_PROTO_DEPTH));
        }

        let mut parser = Parser::with_endian(data, ctx.endian);

        let flags = ProtoFlags::from_bits_retain(parser.read_uleb128()?);
        let num_params = parser.read::<u8>()?;
        let frame_size = parser.read::<u8>()?;
        let num_upvalues = parser.read::<u8>()?;

        let num_gc = parser.read_uleb128()?;
        let num_num = parser.read_uleb128()?;
        let num_bc = parser.read_uleb128()?;
        for declared in [num_gc, num_num, num_bc] {
            if declared > MAX_COUNT {
                return Err(crate::Error::CountTooLarge {
                    declared,
                    limit: MAX_COUNT,
                });
            }
        }

        let stripped = ctx.strip || flags.contains(ProtoFlags::STRIP);
        let debug = if stripped {
            None
        } else {
            let debug_length = parser.read_uleb128()?;
            if debug_length > MAX_PREFIX_LENGTH {
                return Err(crate::Error::LengthTooLarge {
                    declared: debug_length,
                    limit: MAX_PREFIX_LENGTH,
                });
            }
            if debug_length == 0 {
                // Present but empty: the writer kept debug info enabled yet
                // had nothing to record.
                Some(DebugInfo::default())
            } else {
                let first_line = read_uleb128_u32(&mut parser)?;
                let line_count = read_uleb128_u32(&mut parser)?;
                let tables = parser.read_bytes(debug_length as usize)?;
                Some(DebugInfo::parse(
                    tables,
                    ctx.endian,
                    first_line,
                    line_count,
                    num_bc as usize,
                    usize::from(num_upvalues),
                )?)
            }
        };

        parser.ensure_remaining(num_bc as usize * 4)?;
        let mut instructions = Vec::with_capacity(num_bc as usize);
        for _ in 0..num_bc {
            instructions.push(parser.read::<u32>()?);
        }

        parser.ensure_remaining(usize::from(num_upvalues) * 2)?;
        let mut upvalues = Vec::with_capacity(usize::from(num_upvalues));
        for _ in 0..num_upvalues {
            upvalues.push(parser.read::<u16>()?);
        }

        // Every constant entry is at least one tag byte.
        parser.ensure_remaining((num_gc + num_num) as usize)?;
        let mut gc_constants = Vec::with_capacity(num_gc as usize);
        for _ in 0..num_gc {
            gc_constants.push(GcConstant::parse(&mut parser, ctx, depth)?);
        }

        let mut num_constants = Vec::with_capacity(num_num as usize);
        for _ in 0..num_num {
            num_constants.push(NumConstant::parse(&mut parser)?);
        }

        if parser.has_more_data() {
            return Err(count_mismatch_error!(
                "prototype record declares {} bytes but {} remain after its fields",
                data.len(),
                parser.remaining()
            ));
        }

        Ok(Proto {
            flags,
            num_params,
            frame_size,
            num_upvalues,
            instructions,
            upvalues,
            gc_constants,
            num_constants,
            debug,
        })
    }

    /// Prototype flag bits, unknown bits preserved.
    #[must_use]
    pub fn flags(&self) -> ProtoFlags {
        self.flags
    }

    /// Number of fixed parameters the function declares.
    #[must_use]
    pub fn num_params(&self) -> u8 {
        self.num_params
    }

    /// Register frame size the function requires.
    #[must_use]
    pub fn frame_size(&self) -> u8 {
        self.frame_size
    }

    /// Number of upvalue descriptors.
    #[must_use]
    pub fn num_upvalues(&self) -> u8 {
        self.num_upvalues
    }

    /// Instruction words in execution order, as opaque host-order integers.
    #[must_use]
    pub fn instructions(&self) -> &[u32] {
        &self.instructions
    }

    /// Upvalue descriptors, as opaque host-order integers.
    #[must_use]
    pub fn upvalues(&self) -> &[u16] {
        &self.upvalues
    }

    /// The GC constant pool, in encoding order.
    #[must_use]
    pub fn gc_constants(&self) -> &[GcConstant] {
        &self.gc_constants
    }

    /// The numeric constant pool, in encoding order.
    #[must_use]
    pub fn num_constants(&self) -> &[NumConstant] {
        &self.num_constants
    }

    /// Debug metadata, `None` for stripped prototypes.
    #[must_use]
    pub fn debug(&self) -> Option<&DebugInfo> {
        self.debug.as_ref()
    }

    /// Returns `true` if the function accepts variable arguments.
    #[must_use]
    pub fn is_vararg(&self) -> bool {
        self.flags.contains(ProtoFlags::VARARG)
    }

    /// Returns `true` if this prototype carries no debug metadata.
    #[must_use]
    pub fn is_stripped(&self) -> bool {
        self.debug.is_none()
    }

    /// Iterates over the child prototypes embedded in the GC pool.
    pub fn children(&self) -> impl Iterator<Item = &Proto> {
        self.gc_constants.iter().filter_map(GcConstant::as_child)
    }
}
