//! Sereal wire constants: magic values, the type/version byte, and the tag
//! opcode space.

/// `=srl`, little-endian, as carried by protocol versions 1 and 2.
pub const MAGIC: u32 = 0x6c72_733d;

/// `=srl` with the high bit set on the `s`, versions 3 and up.
pub const MAGIC_HIGH_BIT: u32 = 0x6c72_f33d;

/// The high-bit magic after an accidental UTF-8 round-trip. Always rejected.
pub const MAGIC_HIGH_BIT_UTF8: u32 = 0x72b3_c33d;

/// Byte length of the fixed prefix: 4 magic bytes + the type/version byte.
pub const HEADER_SIZE: usize = 5;

/// Highest protocol version this codec understands.
pub const MAX_VERSION: u8 = 4;

/// Document type nibble from the type/version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DocumentType {
    Raw = 0,
    Snappy = 1,
    SnappyIncremental = 2,
    Zlib = 3,
    Zstd = 4,
}

impl DocumentType {
    pub fn from_nibble(nibble: u8) -> Option<DocumentType> {
        match nibble {
            0 => Some(DocumentType::Raw),
            1 => Some(DocumentType::Snappy),
            2 => Some(DocumentType::SnappyIncremental),
            3 => Some(DocumentType::Zlib),
            4 => Some(DocumentType::Zstd),
            _ => None,
        }
    }
}

// Tag opcodes. The high bit of every tag byte is the track flag; the values
// below are the flag-stripped opcodes.

/// When set, the tag's source offset must be recorded for back-references.
pub const TRACK_FLAG: u8 = 0x80;

/// Small positive integers 0..=15 encode directly as tags 0x00..=0x0f.
pub const TAG_POS_0: u8 = 0x00;
/// Small negative integers -16..=-1 encode as tags 0x10..=0x1f.
pub const TAG_NEG_16: u8 = 0x10;

pub const TAG_VARINT: u8 = 0x20;
pub const TAG_ZIGZAG: u8 = 0x21;
pub const TAG_FLOAT: u8 = 0x22;
pub const TAG_DOUBLE: u8 = 0x23;
pub const TAG_LONG_DOUBLE: u8 = 0x24;
pub const TAG_UNDEF: u8 = 0x25;
pub const TAG_BINARY: u8 = 0x26;
pub const TAG_STR_UTF8: u8 = 0x27;
pub const TAG_REFN: u8 = 0x28;
pub const TAG_REFP: u8 = 0x29;
pub const TAG_HASH: u8 = 0x2a;
pub const TAG_ARRAY: u8 = 0x2b;
pub const TAG_OBJECT: u8 = 0x2c;
pub const TAG_OBJECTV: u8 = 0x2d;
pub const TAG_ALIAS: u8 = 0x2e;
pub const TAG_COPY: u8 = 0x2f;
pub const TAG_WEAKEN: u8 = 0x30;
pub const TAG_REGEXP: u8 = 0x31;
pub const TAG_OBJECT_FREEZE: u8 = 0x32;
pub const TAG_OBJECTV_FREEZE: u8 = 0x33;
pub const TAG_CANONICAL_UNDEF: u8 = 0x39;
pub const TAG_FALSE: u8 = 0x3a;
pub const TAG_TRUE: u8 = 0x3b;
pub const TAG_MANY: u8 = 0x3c;
pub const TAG_PACKET_START: u8 = 0x3d;
pub const TAG_EXTEND: u8 = 0x3e;
pub const TAG_PAD: u8 = 0x3f;

/// Sequences of 0..=15 elements: 0x40..=0x4f, count in the low nibble.
pub const TAG_ARRAYREF_0: u8 = 0x40;
/// Mappings of 0..=15 pairs: 0x50..=0x5f, count in the low nibble.
pub const TAG_HASHREF_0: u8 = 0x50;
/// Byte strings of 0..=31 bytes inline: 0x60..=0x7f, length in the low 5 bits.
pub const TAG_SHORT_BINARY_0: u8 = 0x60;
