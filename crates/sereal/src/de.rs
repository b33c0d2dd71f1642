//! Typed decode path: a serde [`Deserializer`] that walks the caller's
//! target shape in lockstep with tag reads.
//!
//! Back-references re-decode at the tracked source offset, which copies the
//! referent instead of aliasing it; unknown mapping keys are decoded and
//! discarded; sequence elements past a fixed-length target are drained.

use std::collections::HashSet;

use serde::de::{self, Deserialize, DeserializeOwned, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

use crate::compress::decompressor_for;
use crate::constants::{
    TAG_ALIAS, TAG_ARRAY, TAG_ARRAYREF_0, TAG_BINARY, TAG_CANONICAL_UNDEF, TAG_COPY, TAG_DOUBLE,
    TAG_FALSE, TAG_FLOAT, TAG_HASH, TAG_HASHREF_0, TAG_OBJECT, TAG_OBJECTV, TAG_OBJECTV_FREEZE,
    TAG_OBJECT_FREEZE, TAG_PAD, TAG_REFN, TAG_REFP, TAG_REGEXP, TAG_SHORT_BINARY_0, TAG_STR_UTF8,
    TAG_TRUE, TAG_UNDEF, TAG_VARINT, TAG_WEAKEN, TAG_ZIGZAG, TRACK_FLAG,
};
use crate::decoder::{body_view, prepare_document, Decoder};
use crate::error::Error;
use crate::freeze::FROZEN_TOKEN;
use crate::header::check_header;
use crate::value::REGEXP_TOKEN;
use crate::varint;

impl Decoder {
    /// Decodes the document body into a typed destination.
    pub fn unmarshal<T: DeserializeOwned>(&self, b: &[u8]) -> Result<T, Error> {
        let (header, doc) = prepare_document(b)?;
        let (body, start) = body_view(&doc, header);
        let mut de = Deserializer::new(body, start);
        T::deserialize(&mut de)
    }

    /// Decodes only the user header into a typed destination, if present.
    pub fn unmarshal_header<T: DeserializeOwned>(&self, b: &[u8]) -> Result<Option<T>, Error> {
        let header = check_header(b)?;
        decompressor_for(header.version, header.doctype)?;
        if header.body_start > b.len() {
            return Err(Error::CorruptOffset);
        }
        if header.suffix_size == 0 || b[header.suffix_start] & 1 == 0 {
            return Ok(None);
        }
        let mut de = Deserializer::new(&b[..header.body_start], header.suffix_start + 1);
        T::deserialize(&mut de).map(Some)
    }

    /// Decodes the user header and the body into typed destinations.
    pub fn unmarshal_header_body<H, T>(&self, b: &[u8]) -> Result<(Option<H>, T), Error>
    where
        H: DeserializeOwned,
        T: DeserializeOwned,
    {
        let (header, doc) = prepare_document(b)?;
        let user_header = if header.suffix_size > 0 && doc[header.suffix_start] & 1 == 1 {
            let mut de = Deserializer::new(&doc[..header.body_start], header.suffix_start + 1);
            Some(H::deserialize(&mut de)?)
        } else {
            None
        };
        let (body, start) = body_view(&doc, header);
        let mut de = Deserializer::new(body, start);
        let value = T::deserialize(&mut de)?;
        Ok((user_header, value))
    }
}

/// serde deserializer over a prepared (header + raw body) document.
pub struct Deserializer<'de> {
    by: &'de [u8],
    x: usize,
    /// Offsets whose tracked value finished decoding; REFP/ALIAS may only
    /// jump to these.
    tracked: HashSet<usize>,
    copy_depth: u32,
}

impl<'de> Deserializer<'de> {
    pub(crate) fn new(by: &'de [u8], start: usize) -> Self {
        Self {
            by,
            x: start,
            tracked: HashSet::new(),
            copy_depth: 0,
        }
    }

    fn skip_pad(&mut self) -> Result<(), Error> {
        loop {
            if self.x >= self.by.len() {
                return Err(Error::Truncated);
            }
            let tag = self.by[self.x];
            if tag == TAG_PAD || tag == TAG_PAD | TRACK_FLAG {
                self.x += 1;
            } else {
                return Ok(());
            }
        }
    }

    /// Tag of the next value with the track flag stripped, pads skipped,
    /// cursor untouched.
    fn peek_tag(&mut self) -> Result<u8, Error> {
        self.skip_pad()?;
        Ok(self.by[self.x] & !TRACK_FLAG)
    }

    /// Consumes the next tag byte. Returns the stripped opcode and, when the
    /// track flag was set, the offset to mark completed afterwards.
    fn begin_value(&mut self) -> Result<(u8, Option<usize>), Error> {
        self.skip_pad()?;
        let at = self.x;
        let raw = self.by[self.x];
        self.x += 1;
        let track_at = (raw & TRACK_FLAG != 0).then_some(at);
        Ok((raw & !TRACK_FLAG, track_at))
    }

    fn finish_value(&mut self, track_at: Option<usize>) {
        if let Some(at) = track_at {
            self.tracked.insert(at);
        }
    }

    fn read_varint(&mut self) -> Result<u64, Error> {
        let (n, sz) = varint::decode(&self.by[self.x..])?;
        self.x += sz;
        Ok(n)
    }

    fn read_bytes(&mut self, ln: u64) -> Result<&'de [u8], Error> {
        if ln > i32::MAX as u64 {
            return Err(Error::CorruptStringSize);
        }
        let ln = ln as usize;
        if self.x + ln > self.by.len() {
            return Err(Error::Truncated);
        }
        let bytes = &self.by[self.x..self.x + ln];
        self.x += ln;
        Ok(bytes)
    }

    fn read_stringish_bytes(&mut self) -> Result<Vec<u8>, Error> {
        self.skip_pad()?;
        let tag_at = self.x;
        let tag = self.by[self.x] & !TRACK_FLAG;
        self.x += 1;

        match tag {
            TAG_BINARY | TAG_STR_UTF8 => {
                let ln = self.read_varint()?;
                self.read_bytes(ln).map(<[u8]>::to_vec)
            }
            TAG_SHORT_BINARY_0..=0x7f => self.read_bytes((tag & 0x1f) as u64).map(<[u8]>::to_vec),
            TAG_COPY => {
                if self.copy_depth > 0 {
                    return Err(Error::NestedCopy);
                }
                let before = self.x;
                let offs = self.read_varint()? as usize;
                if offs >= before {
                    return Err(Error::CorruptOffset);
                }

                let saved = self.x;
                self.x = offs;
                self.copy_depth += 1;
                let bytes = self.read_stringish_bytes();
                self.copy_depth -= 1;
                self.x = saved;
                bytes
            }
            _ => Err(Error::ExpectedString(tag_at)),
        }
    }

    fn read_stringish(&mut self) -> Result<String, Error> {
        let bytes = self.read_stringish_bytes()?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }

    /// Class name of an OBJECTV/OBJECTV_FREEZE: a varint offset to a
    /// previously decoded string.
    fn read_stringish_at_offset(&mut self) -> Result<String, Error> {
        let offs = self.read_varint()? as usize;
        let saved = self.x;
        self.x = offs;
        let class = self.read_stringish();
        self.x = saved;
        class
    }

    fn skip_value(&mut self) -> Result<(), Error> {
        de::IgnoredAny::deserialize(&mut *self)?;
        Ok(())
    }

    /// REFN + single-element ARRAY wrapping a byte string: the payload of a
    /// FROZEN object.
    fn read_freeze_payload(&mut self) -> Result<Vec<u8>, Error> {
        if self.x + 1 >= self.by.len() {
            return Err(Error::Truncated);
        }
        if self.by[self.x] != TAG_REFN || self.by[self.x + 1] != TAG_ARRAY {
            return Err(Error::FreezeNotRefnArray);
        }
        self.x += 2;
        let ln = self.read_varint()?;
        if ln != 1 {
            return Err(Error::FreezeMultipleElements);
        }
        self.read_freeze_element()
    }

    fn read_freeze_element(&mut self) -> Result<Vec<u8>, Error> {
        self.skip_pad()?;
        let tag = self.by[self.x] & !TRACK_FLAG;
        self.x += 1;
        match tag {
            TAG_BINARY => {
                let ln = self.read_varint()?;
                self.read_bytes(ln).map(<[u8]>::to_vec)
            }
            TAG_SHORT_BINARY_0..=0x7f => self.read_bytes((tag & 0x1f) as u64).map(<[u8]>::to_vec),
            TAG_COPY => {
                if self.copy_depth > 0 {
                    return Err(Error::NestedCopy);
                }
                let before = self.x;
                let offs = self.read_varint()? as usize;
                if offs >= before {
                    return Err(Error::CorruptOffset);
                }
                let saved = self.x;
                self.x = offs;
                self.copy_depth += 1;
                let bytes = self.read_freeze_element();
                self.copy_depth -= 1;
                self.x = saved;
                bytes
            }
            _ => Err(Error::FreezeNotBytes),
        }
    }

    /// Dispatches one value to the visitor. The tag byte is already
    /// consumed.
    fn dispatch<V: Visitor<'de>>(&mut self, tag: u8, visitor: V) -> Result<V::Value, Error> {
        match tag {
            0x00..=0x0f => visitor.visit_i64(tag as i64),
            0x10..=0x1f => visitor.visit_i64(tag as i64 - 32),

            TAG_VARINT => {
                let n = self.read_varint()?;
                if n > i64::MAX as u64 {
                    visitor.visit_u64(n)
                } else {
                    visitor.visit_i64(n as i64)
                }
            }
            TAG_ZIGZAG => {
                let n = self.read_varint()?;
                visitor.visit_i64(-((n >> 1) as i64) - 1)
            }
            TAG_FLOAT => {
                if self.x + 4 > self.by.len() {
                    return Err(Error::Truncated);
                }
                let bits = [
                    self.by[self.x],
                    self.by[self.x + 1],
                    self.by[self.x + 2],
                    self.by[self.x + 3],
                ];
                self.x += 4;
                visitor.visit_f32(f32::from_le_bytes(bits))
            }
            TAG_DOUBLE => {
                if self.x + 8 > self.by.len() {
                    return Err(Error::Truncated);
                }
                let mut bits = [0u8; 8];
                bits.copy_from_slice(&self.by[self.x..self.x + 8]);
                self.x += 8;
                visitor.visit_f64(f64::from_le_bytes(bits))
            }
            TAG_TRUE => visitor.visit_bool(true),
            TAG_FALSE => visitor.visit_bool(false),
            TAG_UNDEF | TAG_CANONICAL_UNDEF => visitor.visit_unit(),

            TAG_BINARY => {
                let ln = self.read_varint()?;
                let bytes = self.read_bytes(ln)?;
                visitor.visit_bytes(bytes)
            }
            TAG_STR_UTF8 => {
                let ln = self.read_varint()?;
                let bytes = self.read_bytes(ln)?;
                let s = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
                visitor.visit_str(s)
            }
            TAG_SHORT_BINARY_0..=0x7f => {
                let bytes = self.read_bytes((tag & 0x1f) as u64)?;
                visitor.visit_bytes(bytes)
            }

            TAG_ARRAY => {
                let ln = self.read_varint()?;
                self.visit_array(ln, visitor)
            }
            TAG_ARRAYREF_0..=0x4f => self.visit_array((tag & 0x0f) as u64, visitor),
            TAG_HASH => {
                let ln = self.read_varint()?;
                self.visit_hash(ln, visitor)
            }
            TAG_HASHREF_0..=0x5f => self.visit_hash((tag & 0x0f) as u64, visitor),

            TAG_REFN | TAG_WEAKEN => de::Deserializer::deserialize_any(&mut *self, visitor),
            TAG_REFP | TAG_ALIAS => {
                let offs = self.read_backref_offset(tag == TAG_REFP)?;
                self.redecode_at(offs, visitor)
            }
            TAG_COPY => {
                if self.copy_depth > 0 {
                    return Err(Error::NestedCopy);
                }
                let before = self.x;
                let offs = self.read_varint()? as usize;
                if offs >= before {
                    return Err(Error::CorruptOffset);
                }
                self.copy_depth += 1;
                let value = self.redecode_at(offs, visitor);
                self.copy_depth -= 1;
                value
            }

            TAG_REGEXP => {
                let pattern = self.read_stringish_bytes()?;
                let modifiers = self.read_stringish_bytes()?;
                visitor.visit_seq(PartsAccess::new(vec![
                    Part::Bytes(pattern),
                    Part::Bytes(modifiers),
                ]))
            }

            TAG_OBJECT => {
                self.read_stringish_bytes()?;
                de::Deserializer::deserialize_any(&mut *self, visitor)
            }
            TAG_OBJECTV => {
                self.read_varint()?;
                de::Deserializer::deserialize_any(&mut *self, visitor)
            }
            TAG_OBJECT_FREEZE => {
                self.read_stringish_bytes()?;
                let data = self.read_freeze_payload()?;
                visitor.visit_byte_buf(data)
            }
            TAG_OBJECTV_FREEZE => {
                self.read_varint()?;
                let data = self.read_freeze_payload()?;
                visitor.visit_byte_buf(data)
            }

            other => Err(Error::UnknownTag(other)),
        }
    }

    fn read_backref_offset(&mut self, is_refp: bool) -> Result<usize, Error> {
        let before = self.x;
        let offs = self.read_varint()? as usize;
        if offs >= before {
            return Err(Error::CorruptOffset);
        }
        if !self.tracked.contains(&offs) {
            return Err(if is_refp {
                Error::UntrackedOffsetRefp
            } else {
                Error::UntrackedOffsetAlias
            });
        }
        Ok(offs)
    }

    /// Re-decodes the value at `offs` into the visitor, then restores the
    /// cursor. Back-references copy the referent in this path.
    fn redecode_at<V: Visitor<'de>>(&mut self, offs: usize, visitor: V) -> Result<V::Value, Error> {
        let saved = self.x;
        self.x = offs;
        let value = de::Deserializer::deserialize_any(&mut *self, visitor);
        self.x = saved;
        value
    }

    fn visit_array<V: Visitor<'de>>(&mut self, ln: u64, visitor: V) -> Result<V::Value, Error> {
        if ln > i32::MAX as u64 {
            return Err(Error::CorruptArraySize);
        }
        let ln = ln as usize;
        if self.x + ln > self.by.len() {
            return Err(Error::Truncated);
        }

        let mut access = SeqReader {
            de: &mut *self,
            remaining: ln,
        };
        let value = visitor.visit_seq(&mut access)?;
        // fixed-length targets stop early; keep the stream aligned
        let leftover = access.remaining;
        for _ in 0..leftover {
            self.skip_value()?;
        }
        Ok(value)
    }

    fn visit_hash<V: Visitor<'de>>(&mut self, ln: u64, visitor: V) -> Result<V::Value, Error> {
        if ln > i32::MAX as u64 {
            return Err(Error::CorruptHashSize);
        }
        let ln = ln as usize;
        if self.x + 2 * ln > self.by.len() {
            return Err(Error::Truncated);
        }

        let mut access = MapReader {
            de: &mut *self,
            remaining: ln,
        };
        let value = visitor.visit_map(&mut access)?;
        let leftover = access.remaining;
        for _ in 0..leftover {
            self.read_stringish_bytes()?;
            self.skip_value()?;
        }
        Ok(value)
    }
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let (tag, track_at) = self.begin_value()?;
        let value = self.dispatch(tag, visitor)?;
        self.finish_value(track_at);
        Ok(value)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.peek_tag()? {
            TAG_UNDEF | TAG_CANONICAL_UNDEF => {
                let (_, track_at) = self.begin_value()?;
                self.finish_value(track_at);
                visitor.visit_none()
            }
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        // A byte-string wire value feeds sequence targets like Vec<u8>
        // element-wise, FROZEN payloads included. Wrappers and
        // back-references are resolved here so a COPY of a byte string
        // still reaches the byte-wise access.
        match self.peek_tag()? {
            TAG_BINARY | TAG_STR_UTF8 | TAG_SHORT_BINARY_0..=0x7f => {
                let (tag, track_at) = self.begin_value()?;
                let bytes = match tag {
                    TAG_BINARY | TAG_STR_UTF8 => {
                        let ln = self.read_varint()?;
                        self.read_bytes(ln)?.to_vec()
                    }
                    _ => self.read_bytes((tag & 0x1f) as u64)?.to_vec(),
                };
                self.finish_value(track_at);
                visitor.visit_seq(ByteSeqAccess {
                    bytes: bytes.into_iter(),
                })
            }
            TAG_OBJECT_FREEZE | TAG_OBJECTV_FREEZE => {
                let (tag, track_at) = self.begin_value()?;
                if tag == TAG_OBJECT_FREEZE {
                    self.read_stringish_bytes()?;
                } else {
                    self.read_varint()?;
                }
                let data = self.read_freeze_payload()?;
                self.finish_value(track_at);
                visitor.visit_seq(ByteSeqAccess {
                    bytes: data.into_iter(),
                })
            }
            TAG_REFN | TAG_WEAKEN => {
                self.begin_value()?;
                de::Deserializer::deserialize_seq(&mut *self, visitor)
            }
            TAG_COPY => {
                if self.copy_depth > 0 {
                    return Err(Error::NestedCopy);
                }
                let (_, track_at) = self.begin_value()?;
                let before = self.x;
                let offs = self.read_varint()? as usize;
                if offs >= before {
                    return Err(Error::CorruptOffset);
                }
                let saved = self.x;
                self.x = offs;
                self.copy_depth += 1;
                let value = de::Deserializer::deserialize_seq(&mut *self, visitor);
                self.copy_depth -= 1;
                self.x = saved;
                self.finish_value(track_at);
                value
            }
            TAG_REFP | TAG_ALIAS => {
                let (tag, track_at) = self.begin_value()?;
                let offs = self.read_backref_offset(tag == TAG_REFP)?;
                let saved = self.x;
                self.x = offs;
                let value = de::Deserializer::deserialize_seq(&mut *self, visitor);
                self.x = saved;
                self.finish_value(track_at);
                value
            }
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        match name {
            REGEXP_TOKEN => {
                let (tag, track_at) = self.begin_value()?;
                if tag != TAG_REGEXP {
                    return Err(Error::Message(format!(
                        "expected a REGEXP tag, found 0x{tag:02x}"
                    )));
                }
                let pattern = self.read_stringish_bytes()?;
                let modifiers = self.read_stringish_bytes()?;
                self.finish_value(track_at);
                visitor.visit_seq(PartsAccess::new(vec![
                    Part::Bytes(pattern),
                    Part::Bytes(modifiers),
                ]))
            }
            FROZEN_TOKEN => {
                let (tag, track_at) = self.begin_value()?;
                let class = match tag {
                    TAG_OBJECT_FREEZE => self.read_stringish()?,
                    TAG_OBJECTV_FREEZE => self.read_stringish_at_offset()?,
                    _ => {
                        return Err(Error::Message(format!(
                            "expected an OBJECT_FREEZE tag, found 0x{tag:02x}"
                        )))
                    }
                };
                let data = self.read_freeze_payload()?;
                self.finish_value(track_at);
                visitor.visit_seq(PartsAccess::new(vec![Part::Str(class), Part::Bytes(data)]))
            }
            _ => visitor.visit_newtype_struct(self),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        // Unit variants travel as plain strings, data variants as a
        // single-pair mapping {variant: payload}. REFN wrappers from
        // compatibility-mode encoders are transparent.
        loop {
            match self.peek_tag()? {
                TAG_REFN | TAG_WEAKEN => {
                    // consume the wrapper; its offset stays unresolvable for
                    // back-references since the wrapped value is still open
                    self.begin_value()?;
                }
                TAG_BINARY | TAG_STR_UTF8 | TAG_SHORT_BINARY_0..=0x7f | TAG_COPY => {
                    let variant = self.read_stringish()?;
                    return visitor.visit_enum(variant.into_deserializer());
                }
                TAG_HASH => {
                    let (_, track_at) = self.begin_value()?;
                    let ln = self.read_varint()?;
                    if ln != 1 {
                        return Err(Error::Message(
                            "enum mapping must have exactly one pair".to_string(),
                        ));
                    }
                    let variant = self.read_stringish()?;
                    let value = visitor.visit_enum(WireEnumAccess {
                        de: &mut *self,
                        variant,
                    })?;
                    self.finish_value(track_at);
                    return Ok(value);
                }
                tag if (TAG_HASHREF_0..=0x5f).contains(&tag) => {
                    let (tag, track_at) = self.begin_value()?;
                    if tag & 0x0f != 1 {
                        return Err(Error::Message(
                            "enum mapping must have exactly one pair".to_string(),
                        ));
                    }
                    let variant = self.read_stringish()?;
                    let value = visitor.visit_enum(WireEnumAccess {
                        de: &mut *self,
                        variant,
                    })?;
                    self.finish_value(track_at);
                    return Ok(value);
                }
                tag => {
                    return Err(Error::Message(format!(
                        "cannot decode enum from tag 0x{tag:02x}"
                    )))
                }
            }
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_any(visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct map struct identifier
    }
}

struct SeqReader<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
}

impl<'de> de::SeqAccess<'de> for &mut SeqReader<'_, 'de> {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Error> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct MapReader<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
}

impl<'de> de::MapAccess<'de> for &mut MapReader<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Error> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let key = self.de.read_stringish()?;
        seed.deserialize(key.into_deserializer()).map(Some)
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
        seed.deserialize(&mut *self.de)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// Serves the bytes of a wire byte-string as a sequence of `u8`.
struct ByteSeqAccess {
    bytes: std::vec::IntoIter<u8>,
}

impl<'de> de::SeqAccess<'de> for ByteSeqAccess {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Error> {
        match self.bytes.next() {
            Some(b) => seed.deserialize(b.into_deserializer()).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.bytes.len())
    }
}

enum Part {
    Str(String),
    Bytes(Vec<u8>),
}

/// Serves a short fixed list of decoded parts, used for REGEXP and FROZEN
/// carriers.
struct PartsAccess {
    parts: std::vec::IntoIter<Part>,
}

impl PartsAccess {
    fn new(parts: Vec<Part>) -> Self {
        Self {
            parts: parts.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for PartsAccess {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Error> {
        match self.parts.next() {
            Some(Part::Str(s)) => seed.deserialize(s.into_deserializer()).map(Some),
            Some(Part::Bytes(b)) => seed.deserialize(ByteBufDeserializer(b)).map(Some),
            None => Ok(None),
        }
    }
}

/// Hands an owned byte buffer to any visitor via `visit_byte_buf`.
struct ByteBufDeserializer(Vec<u8>);

impl<'de> de::Deserializer<'de> for ByteBufDeserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_byte_buf(self.0)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_seq(ByteSeqAccess {
            bytes: self.0.into_iter(),
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct WireEnumAccess<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    variant: String,
}

impl<'de> de::EnumAccess<'de> for WireEnumAccess<'_, 'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), Error> {
        let variant = seed.deserialize(de::value::StringDeserializer::<Error>::new(
            self.variant.clone(),
        ))?;
        Ok((variant, self))
    }
}

impl<'de> de::VariantAccess<'de> for WireEnumAccess<'_, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Error> {
        self.de.skip_value()
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Error> {
        seed.deserialize(&mut *self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        de::Deserializer::deserialize_seq(&mut *self.de, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        de::Deserializer::deserialize_any(&mut *self.de, visitor)
    }
}

/// Decodes the document body into any type implementing `Deserialize`.
pub fn from_slice<T: DeserializeOwned>(b: &[u8]) -> Result<T, Error> {
    Decoder::new().unmarshal(b)
}
