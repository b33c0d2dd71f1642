//! FROZEN objects: class-tagged opaque byte payloads produced by a type's
//! binary-marshal capability and consumed by a matching unmarshal capability
//! or a registered class handler.

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::{ByteBuf, BytesWrap, Value};

/// A decoded OBJECT_FREEZE payload: the class name and the marshaled bytes.
///
/// Serializing a `Frozen` through the Sereal serializer emits a proper
/// OBJECT_FREEZE wrapper; other serde formats see a `(class, bytes)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frozen {
    pub class: String,
    pub data: Vec<u8>,
}

/// Newtype-struct name the Sereal serde layer intercepts for FROZEN objects.
pub(crate) const FROZEN_TOKEN: &str = "$sereal::frozen";

impl Serialize for Frozen {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(
            FROZEN_TOKEN,
            &FrozenParts {
                class: &self.class,
                data: &self.data,
            },
        )
    }
}

struct FrozenParts<'a> {
    class: &'a str,
    data: &'a [u8],
}

impl Serialize for FrozenParts<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.class)?;
        tuple.serialize_element(&BytesWrap(self.data))?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Frozen {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Frozen, D::Error> {
        struct FrozenVisitor;

        impl<'de> serde::de::Visitor<'de> for FrozenVisitor {
            type Value = Frozen;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a frozen object (class, bytes)")
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Frozen, A::Error> {
                let class: String = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
                let data: ByteBuf = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
                Ok(Frozen {
                    class,
                    data: data.0,
                })
            }
        }

        deserializer.deserialize_newtype_struct(FROZEN_TOKEN, FrozenVisitor)
    }
}

/// Binary-marshal capability discovered by the encoder helpers. Emitting a
/// type through [`serialize_frozen`] produces OBJECT_FREEZE with the type's
/// class name.
pub trait FreezeMarshal {
    /// Class name recorded in the document.
    fn freeze_class(&self) -> &str;
    /// Marshals the value to its opaque byte payload.
    fn marshal_binary(&self) -> Result<Vec<u8>, Error>;
}

/// Binary-unmarshal capability: rebuilds a value from the payload bytes of a
/// matching FROZEN object.
pub trait FreezeUnmarshal: Sized {
    fn unmarshal_binary(data: &[u8]) -> Result<Self, Error>;
}

/// Unmarshaler registered on a [`crate::Decoder`] for a class name. During
/// untyped decode, a FROZEN object of that class is handed to the handler
/// and the returned value replaces the `Frozen` wrapper. Handler errors
/// propagate to the caller unchanged.
pub trait ClassUnmarshaler: Send + Sync {
    fn unmarshal_binary(&self, data: &[u8]) -> Result<Value, Error>;
}

impl<F> ClassUnmarshaler for F
where
    F: Fn(&[u8]) -> Result<Value, Error> + Send + Sync,
{
    fn unmarshal_binary(&self, data: &[u8]) -> Result<Value, Error> {
        self(data)
    }
}

/// `#[serde(serialize_with = "sereal::serialize_frozen")]` helper: routes a
/// [`FreezeMarshal`] type through the FROZEN wire form.
pub fn serialize_frozen<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: FreezeMarshal,
    S: serde::Serializer,
{
    let data = value.marshal_binary().map_err(serde::ser::Error::custom)?;
    Frozen {
        class: value.freeze_class().to_string(),
        data,
    }
    .serialize(serializer)
}

/// `#[serde(deserialize_with = "sereal::deserialize_frozen")]` helper:
/// rebuilds a [`FreezeUnmarshal`] type from a FROZEN payload.
pub fn deserialize_frozen<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FreezeUnmarshal,
    D: serde::Deserializer<'de>,
{
    let frozen = Frozen::deserialize(deserializer)?;
    T::unmarshal_binary(&frozen.data).map_err(serde::de::Error::custom)
}
