//! [`Value`], the universal tagged value produced by the untyped decode
//! path and accepted by the untyped encode path.

use std::rc::Rc;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::freeze::Frozen;

/// Universal value type spanning everything a Sereal body can carry.
///
/// Mappings are ordered key/value pairs: wire order is preserved through a
/// decode/encode round-trip.
///
/// `Ref` and `Weak` are the one-level indirection wrappers of compatibility
/// mode. They hold `Rc` handles so that shared substructure keeps its
/// identity: the encoder emits REFP for a repeated handle, and REFP tags
/// resolving to one tracked offset share one allocation after decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UNDEF.
    Null,
    /// CANONICAL_UNDEF, the distinguished shared null.
    CanonicalNull,
    /// TRUE / FALSE.
    Bool(bool),
    /// Small integers, VARINT, and ZIGZAG.
    Integer(i64),
    /// A VARINT whose signed interpretation is negative, bit pattern kept.
    UInteger(u64),
    /// FLOAT, 32-bit IEEE little-endian.
    Float(f32),
    /// DOUBLE, 64-bit IEEE little-endian.
    Double(f64),
    /// BINARY / SHORT_BINARY, an opaque byte string.
    Bytes(Vec<u8>),
    /// STR_UTF8.
    Str(String),
    /// ARRAY / ARRAYREF.
    Array(Vec<Value>),
    /// HASH / HASHREF, ordered pairs.
    Hash(Vec<(String, Value)>),
    /// REFN in compatibility mode.
    Ref(Rc<Value>),
    /// WEAKEN in compatibility mode.
    Weak(Rc<Value>),
    /// REGEXP: pattern and modifier bytes.
    Regexp(Regexp),
    /// OBJECT / OBJECTV: a class-tagged payload.
    Object(Box<Object>),
    /// OBJECT_FREEZE / OBJECTV_FREEZE: a class-tagged opaque byte payload.
    Frozen(Frozen),
}

impl Value {
    /// Shorthand for building a `Ref` wrapper.
    pub fn reference(value: Value) -> Value {
        Value::Ref(Rc::new(value))
    }
}

/// A regular expression: pattern bytes plus modifier bytes, both kept
/// verbatim from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regexp {
    pub pattern: Vec<u8>,
    pub modifiers: Vec<u8>,
}

/// A class-tagged object: class name plus an arbitrary payload value.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub class: String,
    pub value: Value,
}

/// Newtype-struct name the Sereal serde layer intercepts to emit REGEXP.
pub(crate) const REGEXP_TOKEN: &str = "$sereal::regexp";

impl Serialize for Regexp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(
            REGEXP_TOKEN,
            &RegexpParts {
                pattern: &self.pattern,
                modifiers: &self.modifiers,
            },
        )
    }
}

struct RegexpParts<'a> {
    pattern: &'a [u8],
    modifiers: &'a [u8],
}

impl Serialize for RegexpParts<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&BytesWrap(self.pattern))?;
        tuple.serialize_element(&BytesWrap(self.modifiers))?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Regexp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Regexp, D::Error> {
        struct RegexpVisitor;

        impl<'de> serde::de::Visitor<'de> for RegexpVisitor {
            type Value = Regexp;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a regular expression (pattern, modifiers)")
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Regexp, A::Error> {
                let pattern: ByteBuf = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
                let modifiers: ByteBuf = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
                Ok(Regexp {
                    pattern: pattern.0,
                    modifiers: modifiers.0,
                })
            }
        }

        deserializer.deserialize_newtype_struct(REGEXP_TOKEN, RegexpVisitor)
    }
}

/// Serializes a byte slice through `serialize_bytes` so binary-aware formats
/// keep it a byte string instead of a numeric sequence.
pub(crate) struct BytesWrap<'a>(pub &'a [u8]);

impl Serialize for BytesWrap<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

/// Owned byte buffer that deserializes from byte strings, u8 sequences, or
/// plain strings.
pub(crate) struct ByteBuf(pub Vec<u8>);

impl<'de> Deserialize<'de> for ByteBuf {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<ByteBuf, D::Error> {
        struct ByteBufVisitor;

        impl<'de> serde::de::Visitor<'de> for ByteBufVisitor {
            type Value = ByteBuf;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a byte string")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<ByteBuf, E> {
                Ok(ByteBuf(v.to_vec()))
            }

            fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<ByteBuf, E> {
                Ok(ByteBuf(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<ByteBuf, E> {
                Ok(ByteBuf(v.as_bytes().to_vec()))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<ByteBuf, A::Error> {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(b) = seq.next_element::<u8>()? {
                    bytes.push(b);
                }
                Ok(ByteBuf(bytes))
            }
        }

        deserializer.deserialize_byte_buf(ByteBufVisitor)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInteger(u)
                } else {
                    Value::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Hash(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null | Value::CanonicalNull => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::json!(i),
            Value::UInteger(u) => serde_json::json!(u),
            Value::Float(f) => serde_json::json!(f),
            Value::Double(f) => serde_json::json!(f),
            Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(&b).into_owned()),
            Value::Str(s) => serde_json::Value::String(s),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Hash(pairs) => serde_json::Value::Object(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::Ref(inner) | Value::Weak(inner) => {
                serde_json::Value::from(inner.as_ref().clone())
            }
            Value::Regexp(re) => serde_json::json!({
                "pattern": String::from_utf8_lossy(&re.pattern),
                "modifiers": String::from_utf8_lossy(&re.modifiers),
            }),
            Value::Object(obj) => serde_json::json!({
                "class": obj.class,
                "value": serde_json::Value::from(obj.value),
            }),
            Value::Frozen(frozen) => serde_json::json!({
                "class": frozen.class,
                "data": String::from_utf8_lossy(&frozen.data),
            }),
        }
    }
}
