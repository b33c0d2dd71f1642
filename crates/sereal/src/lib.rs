//! Sereal binary serialization: self-describing, tagged, length-prefixed
//! documents with back-references, class-tagged objects, and optional body
//! compression.
//!
//! Two decode strategies are available: the untyped path rebuilds a
//! [`Value`] tree, the typed path drives serde `Deserialize` directly from
//! the tag stream. The encoder mirrors both through [`Encoder::encode`] and
//! [`Encoder::marshal`].
//!
//! ```
//! use sereal::{Decoder, Encoder, Value};
//!
//! let mut encoder = Encoder::new();
//! let doc = encoder
//!     .encode(&Value::Array(vec![Value::Integer(1), Value::Str("two".into())]))
//!     .unwrap();
//!
//! assert!(sereal::looks_like_sereal(&doc));
//! let value = Decoder::new().decode(&doc).unwrap();
//! assert_eq!(
//!     value,
//!     Value::Array(vec![Value::Integer(1), Value::Str("two".into())])
//! );
//! ```

pub mod constants;
mod compress;
mod de;
mod decoder;
mod encoder;
mod error;
mod freeze;
mod header;
mod ser;
mod value;
mod varint;

pub use compress::Compression;
pub use de::{from_slice, Deserializer};
pub use decoder::{decompress_document, Decoder};
pub use encoder::Encoder;
pub use error::Error;
pub use freeze::{
    deserialize_frozen, serialize_frozen, ClassUnmarshaler, FreezeMarshal, FreezeUnmarshal, Frozen,
};
pub use header::{check_header, looks_like_sereal, read_header, Header};
pub use ser::{to_vec, Serializer};
pub use value::{Object, Regexp, Value};
pub use varint::{decode as varint_decode, encode_into as varint_encode_into};

/// Encodes a [`Value`] with a default encoder.
pub fn encode(value: &Value) -> Result<Vec<u8>, Error> {
    Encoder::new().encode(value)
}

/// Decodes a document body into a [`Value`] with a default decoder.
pub fn decode(b: &[u8]) -> Result<Value, Error> {
    Decoder::new().decode(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_roundtrip_smoke() {
        let value = Value::Hash(vec![
            ("num".to_string(), Value::Integer(-300)),
            ("text".to_string(), Value::Str("hello".to_string())),
            ("nested".to_string(), Value::Array(vec![Value::Bool(true)])),
        ]);
        let doc = encode(&value).unwrap();
        assert_eq!(decode(&doc).unwrap(), value);
    }

    #[test]
    fn typed_roundtrip_smoke() {
        let doc = to_vec(&vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = from_slice(&doc).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn typed_decodes_untyped_output() {
        let doc = encode(&Value::Array(vec![
            Value::Str("a".to_string()),
            Value::Str("b".to_string()),
        ]))
        .unwrap();
        let back: Vec<String> = from_slice(&doc).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }
}
