//! Unsigned LEB128 varints: 7 value bits per byte, least-significant group
//! first, high bit marking continuation.

use sereal_buffers::Writer;

use crate::error::Error;

/// Decodes a varint from the start of `by`.
///
/// Returns the value and the number of bytes consumed. Fails with
/// [`Error::CorruptVarint`] when a chain would shift past 63 bits or when
/// the buffer ends before a terminating byte.
pub fn decode(by: &[u8]) -> Result<(u64, usize), Error> {
    let mut n: u64 = 0;
    let mut shift: u32 = 0;
    for (i, &b) in by.iter().enumerate() {
        n |= ((b & 0x7f) as u64) << shift;
        shift += 7;

        if b & 0x80 == 0 {
            return Ok((n, i + 1));
        }

        if shift > 63 {
            // too many continuation bits
            return Err(Error::CorruptVarint);
        }
    }

    // ran out of bytes without a terminating byte
    Err(Error::CorruptVarint)
}

/// Appends the varint encoding of `n` to the writer.
pub fn encode_into(w: &mut Writer, mut n: u64) {
    while n >= 0x80 {
        w.u8((n as u8 & 0x7f) | 0x80);
        n >>= 7;
    }
    w.u8(n as u8);
}

/// Number of bytes `encode_into` would produce for `n`.
pub fn encoded_len(mut n: u64) -> usize {
    let mut len = 1;
    while n >= 0x80 {
        n >>= 7;
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(n: u64) -> Vec<u8> {
        let mut w = Writer::new();
        encode_into(&mut w, n);
        w.flush()
    }

    #[test]
    fn roundtrip_boundaries() {
        for n in [
            0u64,
            1,
            0x7f,
            0x80,
            0x3fff,
            0x4000,
            u32::MAX as u64,
            i64::MAX as u64,
            u64::MAX,
        ] {
            let bytes = encode(n);
            assert_eq!(bytes.len(), encoded_len(n));
            let (value, consumed) = decode(&bytes).unwrap();
            assert_eq!(value, n);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn max_value_is_ten_bytes() {
        assert_eq!(encoded_len(u64::MAX), 10);
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(decode(&[]), Err(Error::CorruptVarint)));
    }

    #[test]
    fn unterminated_chain_fails() {
        assert!(matches!(decode(&[0x80, 0x80, 0x80]), Err(Error::CorruptVarint)));
    }

    #[test]
    fn overlong_chain_fails() {
        // 11 continuation bytes would shift past 63 bits.
        let bytes = [0x80u8; 11];
        assert!(matches!(decode(&bytes), Err(Error::CorruptVarint)));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let (value, consumed) = decode(&[0x05, 0xff, 0xff]).unwrap();
        assert_eq!(value, 5);
        assert_eq!(consumed, 1);
    }

    // Every byte sequence either decodes to a (value, consumed) pair that
    // re-encodes into the canonical prefix, or fails cleanly. Exhaustive for
    // short inputs, deterministic sweep for longer ones.
    #[test]
    fn decode_is_total_and_consistent() {
        fn check(bytes: &[u8]) {
            match decode(bytes) {
                Ok((value, consumed)) => {
                    assert!(consumed <= 10);
                    assert!(consumed <= bytes.len());
                    let (again, consumed_again) = decode(&bytes[..consumed]).unwrap();
                    assert_eq!(again, value);
                    assert_eq!(consumed_again, consumed);
                }
                Err(Error::CorruptVarint) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        for a in 0u16..256 {
            check(&[a as u8]);
            for b in 0u16..256 {
                check(&[a as u8, b as u8]);
            }
        }

        // longer sequences from a deterministic generator
        let mut state = 0x9e37_79b9_7f4a_7c15u64;
        for _ in 0..4096 {
            let mut bytes = [0u8; 12];
            for byte in bytes.iter_mut() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                *byte = (state >> 33) as u8;
            }
            for len in 1..=bytes.len() {
                check(&bytes[..len]);
            }
        }
    }
}
