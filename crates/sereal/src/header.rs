//! Document header: the 5-byte magic/version prefix and the varint-sized
//! suffix that may carry a user header.

use crate::constants::{
    HEADER_SIZE, MAGIC, MAGIC_HIGH_BIT, MAGIC_HIGH_BIT_UTF8, MAX_VERSION,
};
use crate::error::Error;
use crate::varint;

/// Parsed document header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Document type nibble (compression framing), unvalidated.
    pub doctype: u8,
    /// Protocol version nibble.
    pub version: u8,
    /// Index of the first suffix byte.
    pub suffix_start: usize,
    /// Number of suffix bytes.
    pub suffix_size: usize,
    /// Index of the first body byte.
    pub body_start: usize,
}

/// Parses and validates the fixed prefix of `b`.
///
/// Accepts the plain magic for versions 1–2 and the high-bit magic for
/// versions 3+. The UTF-8-mangled magic is always rejected with its own
/// error so the caller can say what went wrong.
pub fn read_header(b: &[u8]) -> Result<Header, Error> {
    if b.len() <= HEADER_SIZE {
        return Err(Error::BadHeader);
    }

    let first4 = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
    let doctype = b[4] >> 4;
    let version = b[4] & 0x0f;

    let valid = match first4 {
        MAGIC => (1..=2).contains(&version),
        MAGIC_HIGH_BIT => version >= 3,
        MAGIC_HIGH_BIT_UTF8 => return Err(Error::BadHeaderUtf8),
        _ => false,
    };
    if !valid {
        return Err(Error::BadHeader);
    }

    let (suffix_size, sz) = varint::decode(&b[HEADER_SIZE..])?;
    let suffix_size = suffix_size as usize;
    let suffix_start = HEADER_SIZE + sz;

    Ok(Header {
        doctype,
        version,
        suffix_start,
        suffix_size,
        body_start: suffix_start + suffix_size,
    })
}

/// [`read_header`] plus the supported-version gate.
pub fn check_header(b: &[u8]) -> Result<Header, Error> {
    let header = read_header(b)?;
    if header.version == 0 || header.version > MAX_VERSION {
        return Err(Error::UnsupportedVersion(header.version));
    }
    Ok(header)
}

/// Quick and rudimentary check whether `b` starts with a Sereal document.
pub fn looks_like_sereal(b: &[u8]) -> bool {
    if b.len() < 7 {
        return false;
    }
    read_header(b).is_ok()
}

/// Magic bytes the encoder writes for a protocol version.
pub(crate) fn magic_for_version(version: u8) -> [u8; 4] {
    if version >= 3 {
        MAGIC_HIGH_BIT.to_le_bytes()
    } else {
        MAGIC.to_le_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_magic_v2() {
        let doc = [0x3d, 0x73, 0x72, 0x6c, 0x02, 0x00];
        let header = check_header(&doc).unwrap();
        assert_eq!(header.version, 2);
        assert_eq!(header.doctype, 0);
        assert_eq!(header.suffix_size, 0);
        assert_eq!(header.body_start, 6);
    }

    #[test]
    fn suffix_moves_body_start() {
        let doc = [0x3d, 0x73, 0x72, 0x6c, 0x02, 0x03, 0xaa, 0xbb, 0xcc, 0x00];
        let header = check_header(&doc).unwrap();
        assert_eq!(header.suffix_start, 6);
        assert_eq!(header.suffix_size, 3);
        assert_eq!(header.body_start, 9);
    }

    #[test]
    fn too_short_is_bad_header() {
        assert!(matches!(check_header(&[0x3d; 5]), Err(Error::BadHeader)));
    }

    #[test]
    fn looks_like_needs_seven_bytes() {
        let doc = [0x3d, 0x73, 0x72, 0x6c, 0x02, 0x00];
        assert!(!looks_like_sereal(&doc));
        let doc7 = [0x3d, 0x73, 0x72, 0x6c, 0x02, 0x00, 0x25];
        assert!(looks_like_sereal(&doc7));
    }

    #[test]
    fn magic_switches_at_v3() {
        assert_eq!(magic_for_version(2), [0x3d, 0x73, 0x72, 0x6c]);
        assert_eq!(magic_for_version(3), [0x3d, 0xf3, 0x72, 0x6c]);
    }
}
