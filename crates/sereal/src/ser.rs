//! Typed encode path: a serde [`Serializer`] that drives the encoder's
//! emission helpers, so typed and untyped output share the dedup tables and
//! compression gate.

use serde::ser::{self, Impossible, Serialize};

use crate::encoder::Encoder;
use crate::error::Error;
use crate::freeze::FROZEN_TOKEN;
use crate::value::REGEXP_TOKEN;

impl Encoder {
    /// Encodes any `Serialize` value into a complete document.
    pub fn marshal<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<Vec<u8>, Error> {
        self.begin_document()?;
        self.write_empty_suffix();
        self.set_body_start();
        value.serialize(Serializer { enc: &mut *self })?;
        self.finish_document()
    }

    /// Encodes a document with an optional typed user header in the suffix.
    pub fn marshal_header_body<H, B>(
        &mut self,
        header: Option<&H>,
        body: &B,
    ) -> Result<Vec<u8>, Error>
    where
        H: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        self.begin_document()?;
        match header {
            None => self.write_empty_suffix(),
            Some(value) => {
                let saved = self.begin_user_header();
                let result = value.serialize(Serializer { enc: &mut *self });
                let header_doc = self.end_user_header(saved);
                result?;
                self.write_header_suffix(&header_doc);
            }
        }
        self.set_body_start();
        body.serialize(Serializer { enc: &mut *self })?;
        self.finish_document()
    }
}

/// serde serializer writing through an [`Encoder`].
pub struct Serializer<'a> {
    enc: &'a mut Encoder,
}

impl<'a> ser::Serializer for Serializer<'a> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = SeqEmitter<'a>;
    type SerializeTuple = SeqEmitter<'a>;
    type SerializeTupleStruct = SeqEmitter<'a>;
    type SerializeTupleVariant = SeqEmitter<'a>;
    type SerializeMap = MapEmitter<'a>;
    type SerializeStruct = MapEmitter<'a>;
    type SerializeStructVariant = MapEmitter<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), Error> {
        self.enc.write_bool(v);
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<(), Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<(), Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<(), Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<(), Error> {
        self.enc.write_integer(v);
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<(), Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<(), Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<(), Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<(), Error> {
        self.enc.write_uinteger(v);
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), Error> {
        self.enc.write_float(v);
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<(), Error> {
        self.enc.write_double(v);
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<(), Error> {
        let mut buf = [0u8; 4];
        self.enc.write_str_value(v.encode_utf8(&mut buf));
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<(), Error> {
        self.enc.write_str_value(v);
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), Error> {
        self.enc.write_bytes_value(v);
        Ok(())
    }

    fn serialize_none(self) -> Result<(), Error> {
        self.enc.write_null();
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Error> {
        self.enc.write_null();
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Error> {
        self.enc.write_null();
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<(), Error> {
        self.enc.write_str_value(variant);
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        match name {
            FROZEN_TOKEN => value.serialize(TokenTupleSerializer {
                enc: self.enc,
                kind: TokenKind::Frozen,
            }),
            REGEXP_TOKEN => value.serialize(TokenTupleSerializer {
                enc: self.enc,
                kind: TokenKind::Regexp,
            }),
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.enc.write_hash_start(1);
        self.enc.write_str_value(variant);
        value.serialize(Serializer { enc: self.enc })
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        let len = len.ok_or_else(|| {
            Error::Message("sequences of unknown length are not supported".to_string())
        })?;
        self.enc.write_array_start(len);
        Ok(SeqEmitter { enc: self.enc })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        self.enc.write_hash_start(1);
        self.enc.write_str_value(variant);
        self.enc.write_array_start(len);
        Ok(SeqEmitter { enc: self.enc })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Error> {
        let len = len.ok_or_else(|| {
            Error::Message("mappings of unknown length are not supported".to_string())
        })?;
        self.enc.write_hash_start(len);
        Ok(MapEmitter { enc: self.enc })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Error> {
        if !self.enc.struct_as_map {
            self.enc.write_object_start(name);
        }
        self.enc.write_hash_start(len);
        Ok(MapEmitter { enc: self.enc })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        self.enc.write_hash_start(1);
        self.enc.write_str_value(variant);
        self.enc.write_hash_start(len);
        Ok(MapEmitter { enc: self.enc })
    }
}

pub struct SeqEmitter<'a> {
    enc: &'a mut Encoder,
}

impl ser::SerializeSeq for SeqEmitter<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        value.serialize(Serializer {
            enc: &mut *self.enc,
        })
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeTuple for SeqEmitter<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for SeqEmitter<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for SeqEmitter<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

pub struct MapEmitter<'a> {
    enc: &'a mut Encoder,
}

impl ser::SerializeMap for MapEmitter<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Error> {
        key.serialize(KeySerializer {
            enc: &mut *self.enc,
        })
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        value.serialize(Serializer {
            enc: &mut *self.enc,
        })
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeStruct for MapEmitter<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.enc.write_str_value(key);
        value.serialize(Serializer {
            enc: &mut *self.enc,
        })
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for MapEmitter<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

/// Mapping keys must land on the wire as stringish tags.
struct KeySerializer<'a> {
    enc: &'a mut Encoder,
}

fn key_error() -> Error {
    Error::Message("mapping keys must be strings".to_string())
}

impl<'a> ser::Serializer for KeySerializer<'a> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Impossible<(), Error>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_str(self, v: &str) -> Result<(), Error> {
        self.enc.write_str_value(v);
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<(), Error> {
        let mut buf = [0u8; 4];
        self.enc.write_str_value(v.encode_utf8(&mut buf));
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<(), Error> {
        self.enc.write_str_value(variant);
        Ok(())
    }

    fn serialize_bool(self, _v: bool) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_f32(self, _v: f32) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_f64(self, _v: f64) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_none(self) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_unit(self) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), Error> {
        Err(key_error())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        Err(key_error())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Error> {
        Err(key_error())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        Err(key_error())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        Err(key_error())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Error> {
        Err(key_error())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Error> {
        Err(key_error())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        Err(key_error())
    }
}

#[derive(Clone, Copy)]
enum TokenKind {
    Frozen,
    Regexp,
}

/// One captured element of a token carrier tuple.
enum Part {
    Str(String),
    Bytes(Vec<u8>),
}

/// Intercepts the `(class, bytes)` / `(pattern, modifiers)` tuple behind a
/// token newtype and turns it into the corresponding wire construct.
struct TokenTupleSerializer<'a> {
    enc: &'a mut Encoder,
    kind: TokenKind,
}

fn token_error() -> Error {
    Error::Message("malformed token carrier".to_string())
}

impl<'a> ser::Serializer for TokenTupleSerializer<'a> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = TokenTupleCollector<'a>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Impossible<(), Error>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Error> {
        if len != 2 {
            return Err(token_error());
        }
        Ok(TokenTupleCollector {
            enc: self.enc,
            kind: self.kind,
            parts: Vec::with_capacity(2),
        })
    }

    fn serialize_bool(self, _v: bool) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_f32(self, _v: f32) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_f64(self, _v: f64) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_char(self, _v: char) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_str(self, _v: &str) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_none(self) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_unit(self) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), Error> {
        Err(token_error())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        Err(token_error())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        Err(token_error())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        Err(token_error())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Error> {
        Err(token_error())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Error> {
        Err(token_error())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        Err(token_error())
    }
}

struct TokenTupleCollector<'a> {
    enc: &'a mut Encoder,
    kind: TokenKind,
    parts: Vec<Part>,
}

impl ser::SerializeTuple for TokenTupleCollector<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let part = value.serialize(PartCollector)?;
        self.parts.push(part);
        Ok(())
    }

    fn end(self) -> Result<(), Error> {
        let mut parts = self.parts.into_iter();
        match (self.kind, parts.next(), parts.next()) {
            (TokenKind::Frozen, Some(Part::Str(class)), Some(Part::Bytes(data))) => {
                self.enc.write_frozen(&class, &data)
            }
            (TokenKind::Regexp, Some(Part::Bytes(pattern)), Some(Part::Bytes(modifiers))) => {
                self.enc.write_regexp(&pattern, &modifiers);
                Ok(())
            }
            _ => Err(token_error()),
        }
    }
}

/// Captures a single string or byte-string element.
struct PartCollector;

impl ser::Serializer for PartCollector {
    type Ok = Part;
    type Error = Error;
    type SerializeSeq = Impossible<Part, Error>;
    type SerializeTuple = Impossible<Part, Error>;
    type SerializeTupleStruct = Impossible<Part, Error>;
    type SerializeTupleVariant = Impossible<Part, Error>;
    type SerializeMap = Impossible<Part, Error>;
    type SerializeStruct = Impossible<Part, Error>;
    type SerializeStructVariant = Impossible<Part, Error>;

    fn serialize_str(self, v: &str) -> Result<Part, Error> {
        Ok(Part::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Part, Error> {
        Ok(Part::Bytes(v.to_vec()))
    }

    fn serialize_bool(self, _v: bool) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_i8(self, _v: i8) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_i16(self, _v: i16) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_i32(self, _v: i32) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_i64(self, _v: i64) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_u8(self, _v: u8) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_u16(self, _v: u16) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_u32(self, _v: u32) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_u64(self, _v: u64) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_f32(self, _v: f32) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_f64(self, _v: f64) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_char(self, _v: char) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_none(self) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_unit(self) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Part, Error> {
        Err(token_error())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        Err(token_error())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Error> {
        Err(token_error())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        Err(token_error())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        Err(token_error())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Error> {
        Err(token_error())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Error> {
        Err(token_error())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        Err(token_error())
    }
}

/// Encodes any `Serialize` value with a default encoder.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    Encoder::new().marshal(value)
}
