//! Shared fixture builders for integration tests.
//!
//! These encode synthetic dumps byte by byte, so each test controls exactly
//! what the decoder sees and can corrupt any individual field. Test
//! scaffolding only; the crate has no public encoding surface.

#![allow(dead_code)]

/// Magic bytes every fixture dump opens with.
pub const MAGIC: [u8; 3] = [0x1B, b'L', b'J'];

pub const FLAG_BIG_ENDIAN: u64 = 0x01;
pub const FLAG_STRIP: u64 = 0x02;
pub const FLAG_FFI: u64 = 0x04;

/// Encodes a varint into a fresh buffer.
pub fn uleb(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

fn push_u32(out: &mut Vec<u8>, value: u32, big_endian: bool) {
    if big_endian {
        out.extend_from_slice(&value.to_be_bytes());
    } else {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16, big_endian: bool) {
    if big_endian {
        out.extend_from_slice(&value.to_be_bytes());
    } else {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Encodes a string entry for a GC constant pool (tag `5 + len`).
pub fn gc_str(bytes: &[u8]) -> Vec<u8> {
    let mut out = uleb(5 + bytes.len() as u64);
    out.extend_from_slice(bytes);
    out
}

/// Encodes a child-prototype entry: tag 0 plus the length-prefixed record.
pub fn gc_child(record_body: &[u8]) -> Vec<u8> {
    let mut out = uleb(0);
    out.extend_from_slice(&uleb(record_body.len() as u64));
    out.extend_from_slice(record_body);
    out
}

/// Encodes a boxed i64 entry (tag 2, FFI dumps only).
pub fn gc_i64(value: i64) -> Vec<u8> {
    let bits = value as u64;
    let mut out = uleb(2);
    out.extend_from_slice(&uleb(bits & 0xFFFF_FFFF));
    out.extend_from_slice(&uleb(bits >> 32));
    out
}

/// Encodes a boxed u64 entry (tag 3, FFI dumps only).
pub fn gc_u64(value: u64) -> Vec<u8> {
    let mut out = uleb(3);
    out.extend_from_slice(&uleb(value & 0xFFFF_FFFF));
    out.extend_from_slice(&uleb(value >> 32));
    out
}

/// Encodes a boxed complex entry (tag 4, FFI dumps only).
pub fn gc_complex(re: f64, im: f64) -> Vec<u8> {
    let mut out = uleb(4);
    for value in [re, im] {
        let bits = value.to_bits();
        out.extend_from_slice(&uleb(bits & 0xFFFF_FFFF));
        out.extend_from_slice(&uleb(bits >> 32));
    }
    out
}

/// Encodes a table-literal entry (tag 1) from pre-encoded values.
pub fn gc_table(array: &[Vec<u8>], hash: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
    let mut out = uleb(1);
    out.extend_from_slice(&uleb(array.len() as u64));
    out.extend_from_slice(&uleb(hash.len() as u64));
    for value in array {
        out.extend_from_slice(value);
    }
    for (key, value) in hash {
        out.extend_from_slice(key);
        out.extend_from_slice(value);
    }
    out
}

/// Encodes a nil table value.
pub fn tab_nil() -> Vec<u8> {
    uleb(0)
}

/// Encodes a boolean table value.
pub fn tab_bool(value: bool) -> Vec<u8> {
    uleb(if value { 2 } else { 1 })
}

/// Encodes an integer table value.
pub fn tab_int(value: i32) -> Vec<u8> {
    let mut out = uleb(3);
    out.extend_from_slice(&uleb(u64::from(value as u32)));
    out
}

/// Encodes a float table value.
pub fn tab_num(value: f64) -> Vec<u8> {
    let bits = value.to_bits();
    let mut out = uleb(4);
    out.extend_from_slice(&uleb(bits & 0xFFFF_FFFF));
    out.extend_from_slice(&uleb(bits >> 32));
    out
}

/// Encodes a string table value.
pub fn tab_str(bytes: &[u8]) -> Vec<u8> {
    let mut out = uleb(5 + bytes.len() as u64);
    out.extend_from_slice(bytes);
    out
}

/// Encodes an integer entry for a numeric constant pool.
pub fn num_int(value: i32) -> Vec<u8> {
    uleb(u64::from(value as u32) << 1)
}

/// Encodes a float entry for a numeric constant pool.
pub fn num_f64(value: f64) -> Vec<u8> {
    let bits = value.to_bits();
    let mut out = uleb(1);
    out.extend_from_slice(&uleb(bits & 0xFFFF_FFFF));
    out.extend_from_slice(&uleb(bits >> 32));
    out
}

/// Builds one prototype record body, field by field.
#[derive(Clone)]
pub struct ProtoBuilder {
    flags: u64,
    num_params: u8,
    frame_size: u8,
    instructions: Vec<u32>,
    upvalues: Vec<u16>,
    gc_entries: Vec<Vec<u8>>,
    num_entries: Vec<Vec<u8>>,
    debug: Option<(u32, u32, Vec<u8>)>,
    big_endian: bool,
    under_stripped_dump: bool,
}

impl ProtoBuilder {
    pub fn new() -> Self {
        ProtoBuilder {
            flags: 0,
            num_params: 0,
            frame_size: 2,
            instructions: vec![0x0000_4C51], // a single return-shaped word
            upvalues: Vec::new(),
            gc_entries: Vec::new(),
            num_entries: Vec::new(),
            debug: None,
            big_endian: false,
            under_stripped_dump: false,
        }
    }

    pub fn flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    pub fn num_params(mut self, n: u8) -> Self {
        self.num_params = n;
        self
    }

    pub fn frame_size(mut self, n: u8) -> Self {
        self.frame_size = n;
        self
    }

    pub fn instructions(mut self, words: &[u32]) -> Self {
        self.instructions = words.to_vec();
        self
    }

    pub fn upvalues(mut self, descriptors: &[u16]) -> Self {
        self.upvalues = descriptors.to_vec();
        self
    }

    pub fn gc_entry(mut self, entry: Vec<u8>) -> Self {
        self.gc_entries.push(entry);
        self
    }

    pub fn num_entry(mut self, entry: Vec<u8>) -> Self {
        self.num_entries.push(entry);
        self
    }

    /// Attaches a debug block: header lines plus raw table bytes.
    pub fn debug(mut self, first_line: u32, line_count: u32, tables: Vec<u8>) -> Self {
        self.debug = Some((first_line, line_count, tables));
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Marks the enclosing dump as stripped, which suppresses the debug
    /// length field entirely.
    pub fn under_stripped_dump(mut self) -> Self {
        self.under_stripped_dump = true;
        self
    }

    /// Encodes the record body (without the length prefix).
    pub fn body(self) -> Vec<u8> {
        let mut out = uleb(self.flags);
        out.push(self.num_params);
        out.push(self.frame_size);
        out.push(self.upvalues.len() as u8);
        out.extend_from_slice(&uleb(self.gc_entries.len() as u64));
        out.extend_from_slice(&uleb(self.num_entries.len() as u64));
        out.extend_from_slice(&uleb(self.instructions.len() as u64));

        let stripped = self.under_stripped_dump || self.flags & FLAG_STRIP != 0;
        if !stripped {
            match &self.debug {
                None => out.extend_from_slice(&uleb(0)),
                Some((first_line, line_count, tables)) => {
                    out.extend_from_slice(&uleb(tables.len() as u64));
                    out.extend_from_slice(&uleb(u64::from(*first_line)));
                    out.extend_from_slice(&uleb(u64::from(*line_count)));
                    out.extend_from_slice(tables);
                }
            }
        }

        for word in &self.instructions {
            push_u32(&mut out, *word, self.big_endian);
        }
        for descriptor in &self.upvalues {
            push_u16(&mut out, *descriptor, self.big_endian);
        }
        for entry in &self.gc_entries {
            out.extend_from_slice(entry);
        }
        for entry in &self.num_entries {
            out.extend_from_slice(entry);
        }
        out
    }
}

/// Builds a whole dump from record bodies.
pub struct DumpBuilder {
    version: u8,
    flags: u64,
    chunk_name: Vec<u8>,
    protos: Vec<Vec<u8>>,
}

impl DumpBuilder {
    pub fn new() -> Self {
        DumpBuilder {
            version: 2,
            flags: 0,
            chunk_name: b"@fixture.lua".to_vec(),
            protos: Vec::new(),
        }
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    pub fn chunk_name(mut self, name: &[u8]) -> Self {
        self.chunk_name = name.to_vec();
        self
    }

    pub fn proto(mut self, body: Vec<u8>) -> Self {
        self.protos.push(body);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.push(self.version);
        out.extend_from_slice(&uleb(self.flags));
        if self.flags & FLAG_STRIP == 0 {
            out.extend_from_slice(&uleb(self.chunk_name.len() as u64));
            out.extend_from_slice(&self.chunk_name);
        }
        for body in &self.protos {
            out.extend_from_slice(&uleb(body.len() as u64));
            out.extend_from_slice(body);
        }
        out.push(0x00);
        out
    }
}

/// The smallest interesting well-formed dump: one stripped prototype.
pub fn minimal_dump() -> Vec<u8> {
    DumpBuilder::new()
        .flags(FLAG_STRIP)
        .proto(ProtoBuilder::new().under_stripped_dump().body())
        .build()
}
