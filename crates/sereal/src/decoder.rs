//! Untyped decoder: a tag-dispatched reader that rebuilds a [`Value`] tree
//! from a document, resolving back-references through a table of tracked
//! offsets.

use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use crate::compress::decompressor_for;
use crate::constants::{
    TAG_ALIAS, TAG_ARRAY, TAG_ARRAYREF_0, TAG_BINARY, TAG_CANONICAL_UNDEF, TAG_COPY, TAG_DOUBLE,
    TAG_FALSE, TAG_FLOAT, TAG_HASH, TAG_HASHREF_0, TAG_OBJECT, TAG_OBJECTV, TAG_OBJECTV_FREEZE,
    TAG_OBJECT_FREEZE, TAG_PAD, TAG_REFN, TAG_REFP, TAG_REGEXP, TAG_SHORT_BINARY_0, TAG_STR_UTF8,
    TAG_TRUE, TAG_UNDEF, TAG_VARINT, TAG_WEAKEN, TAG_ZIGZAG, TRACK_FLAG,
};
use crate::error::Error;
use crate::freeze::{ClassUnmarshaler, Frozen};
use crate::header::{check_header, Header};
use crate::value::{Object, Regexp, Value};
use crate::varint;

/// Reads Sereal documents.
///
/// One instance carries only configuration and the class registry; the
/// per-call state (tracked offsets, COPY depth) lives on the stack of each
/// decode, so a decoder can be reused across documents. An instance must not
/// be shared across concurrent calls.
pub struct Decoder {
    /// Preserve the source idiom's reference wrappers: REFN and the inline
    /// ARRAYREF/HASHREF tags produce [`Value::Ref`], WEAKEN produces
    /// [`Value::Weak`].
    pub compat_mode: bool,
    registry: HashMap<String, Box<dyn ClassUnmarshaler>>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Returns a decoder with default flags and an empty class registry.
    pub fn new() -> Self {
        Self {
            compat_mode: false,
            registry: HashMap::new(),
        }
    }

    /// Associates `class` with a FROZEN-object unmarshaler. Re-registering a
    /// class replaces the previous handler. Registration must happen before
    /// the decoder is shared for concurrent use.
    pub fn register_name<H: ClassUnmarshaler + 'static>(&mut self, class: &str, handler: H) {
        self.registry.insert(class.to_string(), Box::new(handler));
    }

    /// Decodes the document body into a [`Value`].
    pub fn decode(&self, b: &[u8]) -> Result<Value, Error> {
        let (header, doc) = prepare_document(b)?;
        self.decode_body(&doc, header)
    }

    /// Decodes only the user header, if the suffix carries one.
    pub fn decode_header(&self, b: &[u8]) -> Result<Option<Value>, Error> {
        let header = check_header(b)?;
        decompressor_for(header.version, header.doctype)?;
        if header.body_start > b.len() {
            return Err(Error::CorruptOffset);
        }
        self.read_user_header(b, header)
    }

    /// Decodes the user header and the body.
    pub fn decode_header_body(&self, b: &[u8]) -> Result<(Option<Value>, Value), Error> {
        let (header, doc) = prepare_document(b)?;
        let user_header = self.read_user_header(&doc, header)?;
        let body = self.decode_body(&doc, header)?;
        Ok((user_header, body))
    }

    fn read_user_header(&self, doc: &[u8], header: Header) -> Result<Option<Value>, Error> {
        if header.suffix_size == 0 {
            return Ok(None);
        }
        if header.suffix_start >= doc.len() {
            return Err(Error::Truncated);
        }
        if doc[header.suffix_start] & 1 == 0 {
            return Ok(None);
        }
        // The user header is decoded with absolute offsets, confined to the
        // region before the body.
        let mut reader = ValueReader::new(
            &doc[..header.body_start],
            header.suffix_start + 1,
            self.compat_mode,
            &self.registry,
        );
        reader.read_any().map(Some)
    }

    fn decode_body(&self, doc: &[u8], header: Header) -> Result<Value, Error> {
        let (body, start) = body_view(doc, header);
        let mut reader = ValueReader::new(body, start, self.compat_mode, &self.registry);
        reader.read_any()
    }
}

/// Validates the header, applies the version-gated decompressor, and returns
/// the document with its body laid out exactly as back-reference offsets
/// expect it.
pub(crate) fn prepare_document(b: &[u8]) -> Result<(Header, Cow<'_, [u8]>), Error> {
    let header = check_header(b)?;
    let decomp = decompressor_for(header.version, header.doctype)?;
    if header.body_start > b.len() {
        return Err(Error::CorruptOffset);
    }
    match decomp {
        None => Ok((header, Cow::Borrowed(b))),
        Some(compression) => {
            let mut doc = Vec::with_capacity(b.len() * 2);
            doc.extend_from_slice(&b[..header.body_start]);
            compression.decompress_into(&mut doc, &b[header.body_start..])?;
            Ok((header, Cow::Owned(doc)))
        }
    }
}

/// Body slice and starting cursor for the document's offset base: version 1
/// offsets are absolute, version 2+ offsets are 1-based into the body.
pub(crate) fn body_view(doc: &[u8], header: Header) -> (&[u8], usize) {
    if header.version == 1 {
        (doc, header.body_start)
    } else {
        (&doc[header.body_start - 1..], 1)
    }
}

/// Re-frames a document as document type Raw without re-serializing the
/// body: the compressed body is inflated in place behind the original
/// header and the type nibble cleared.
///
/// The output is written into `dst`; when `dst` already has enough capacity
/// its storage is reused.
pub fn decompress_document(dst: &mut Vec<u8>, b: &[u8]) -> Result<(), Error> {
    let header = check_header(b)?;
    let decomp = decompressor_for(header.version, header.doctype)?;
    if header.body_start > b.len() {
        return Err(Error::CorruptOffset);
    }

    dst.clear();
    match decomp {
        None => dst.extend_from_slice(b),
        Some(compression) => {
            dst.extend_from_slice(&b[..header.body_start]);
            compression.decompress_into(dst, &b[header.body_start..])?;
            dst[4] &= 0x0f;
        }
    }
    Ok(())
}

/// Per-call reader state for the untyped path.
struct ValueReader<'a, 'r> {
    by: &'a [u8],
    x: usize,
    tracked: HashMap<usize, Rc<Value>>,
    copy_depth: u32,
    compat_mode: bool,
    registry: &'r HashMap<String, Box<dyn ClassUnmarshaler>>,
}

impl<'a, 'r> ValueReader<'a, 'r> {
    fn new(
        by: &'a [u8],
        start: usize,
        compat_mode: bool,
        registry: &'r HashMap<String, Box<dyn ClassUnmarshaler>>,
    ) -> Self {
        Self {
            by,
            x: start,
            tracked: HashMap::new(),
            copy_depth: 0,
            compat_mode,
            registry,
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

    fn read_varint(&mut self) -> Result<u64, Error> {
        let (n, sz) = varint::decode(&self.by[self.x..])?;
        self.x += sz;
        Ok(n)
    }

    fn read_any(&mut self) -> Result<Value, Error> {
        self.skip_pad()?;
        let track_at = self.x;
        let mut tag = self.by[self.x];
        let track = tag & TRACK_FLAG != 0;
        tag &= !TRACK_FLAG;
        self.x += 1;

        let value = self.read_tag(tag)?;
        if track {
            self.tracked.insert(track_at, Rc::new(value.clone()));
        }
        Ok(value)
    }

    fn read_tag(&mut self, tag: u8) -> Result<Value, Error> {
        match tag {
            0x00..=0x0f => Ok(Value::Integer(tag as i64)),
            0x10..=0x1f => Ok(Value::Integer(tag as i64 - 32)),

            TAG_VARINT => {
                let n = self.read_varint()?;
                if n > i64::MAX as u64 {
                    Ok(Value::UInteger(n))
                } else {
                    Ok(Value::Integer(n as i64))
                }
            }
            TAG_ZIGZAG => {
                let n = self.read_varint()?;
                Ok(Value::Integer(-((n >> 1) as i64) - 1))
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
                Ok(Value::Float(f32::from_le_bytes(bits)))
            }
            TAG_DOUBLE => {
                if self.x + 8 > self.by.len() {
                    return Err(Error::Truncated);
                }
                let mut bits = [0u8; 8];
                bits.copy_from_slice(&self.by[self.x..self.x + 8]);
                self.x += 8;
                Ok(Value::Double(f64::from_le_bytes(bits)))
            }
            TAG_TRUE => Ok(Value::Bool(true)),
            TAG_FALSE => Ok(Value::Bool(false)),
            TAG_UNDEF => Ok(Value::Null),
            TAG_CANONICAL_UNDEF => Ok(Value::CanonicalNull),

            TAG_BINARY => {
                let ln = self.read_varint()?;
                self.read_bytes(ln).map(Value::Bytes)
            }
            TAG_STR_UTF8 => {
                let ln = self.read_varint()?;
                let bytes = self.read_bytes(ln)?;
                String::from_utf8(bytes)
                    .map(Value::Str)
                    .map_err(|_| Error::InvalidUtf8)
            }
            TAG_SHORT_BINARY_0..=0x7f => {
                self.read_bytes((tag & 0x1f) as u64).map(Value::Bytes)
            }

            TAG_ARRAY => {
                let ln = self.read_varint()?;
                self.read_array(ln, false)
            }
            TAG_ARRAYREF_0..=0x4f => {
                self.read_array((tag & 0x0f) as u64, self.compat_mode)
            }
            TAG_HASH => {
                let ln = self.read_varint()?;
                self.read_hash(ln, false)
            }
            TAG_HASHREF_0..=0x5f => {
                self.read_hash((tag & 0x0f) as u64, self.compat_mode)
            }

            TAG_REFN => {
                let inner = self.read_any()?;
                if self.compat_mode {
                    Ok(Value::Ref(Rc::new(inner)))
                } else {
                    Ok(inner)
                }
            }
            TAG_REFP | TAG_ALIAS => self.read_refp_alias(tag == TAG_REFP),
            TAG_WEAKEN => {
                let inner = self.read_any()?;
                if self.compat_mode {
                    match inner {
                        Value::Ref(rc) => Ok(Value::Weak(rc)),
                        other => Ok(Value::Weak(Rc::new(other))),
                    }
                } else {
                    Ok(inner)
                }
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

                let saved = self.x;
                self.x = offs;
                self.copy_depth += 1;
                let value = self.read_any();
                self.copy_depth -= 1;
                self.x = saved;
                value
            }

            TAG_REGEXP => {
                let pattern = self.read_stringish_bytes()?;
                let modifiers = self.read_stringish_bytes()?;
                Ok(Value::Regexp(Regexp { pattern, modifiers }))
            }

            TAG_OBJECT | TAG_OBJECTV => {
                let class = if tag == TAG_OBJECT {
                    self.read_stringish()?
                } else {
                    self.read_stringish_at_offset()?
                };
                let value = self.read_any()?;
                Ok(Value::Object(Box::new(Object { class, value })))
            }
            TAG_OBJECT_FREEZE | TAG_OBJECTV_FREEZE => {
                let class = if tag == TAG_OBJECT_FREEZE {
                    self.read_stringish()?
                } else {
                    self.read_stringish_at_offset()?
                };
                let data = self.read_freeze_payload()?;
                match self.registry.get(&class) {
                    Some(handler) => handler.unmarshal_binary(&data),
                    None => Ok(Value::Frozen(Frozen { class, data })),
                }
            }

            other => Err(Error::UnknownTag(other)),
        }
    }

    fn read_bytes(&mut self, ln: u64) -> Result<Vec<u8>, Error> {
        if ln > i32::MAX as u64 {
            return Err(Error::CorruptStringSize);
        }
        let ln = ln as usize;
        if self.x + ln > self.by.len() {
            return Err(Error::Truncated);
        }
        let bytes = self.by[self.x..self.x + ln].to_vec();
        self.x += ln;
        Ok(bytes)
    }

    fn read_array(&mut self, ln: u64, is_ref: bool) -> Result<Value, Error> {
        if ln > i32::MAX as u64 {
            return Err(Error::CorruptArraySize);
        }
        let ln = ln as usize;
        if self.x + ln > self.by.len() {
            return Err(Error::Truncated);
        }

        let mut arr = Vec::with_capacity(ln);
        for _ in 0..ln {
            arr.push(self.read_any()?);
        }
        let value = Value::Array(arr);
        if is_ref {
            Ok(Value::Ref(Rc::new(value)))
        } else {
            Ok(value)
        }
    }

    fn read_hash(&mut self, ln: u64, is_ref: bool) -> Result<Value, Error> {
        if ln > i32::MAX as u64 {
            return Err(Error::CorruptHashSize);
        }
        let ln = ln as usize;
        if self.x + 2 * ln > self.by.len() {
            return Err(Error::Truncated);
        }

        let mut pairs = Vec::with_capacity(ln);
        for _ in 0..ln {
            let key = self.read_stringish()?;
            let value = self.read_any()?;
            pairs.push((key, value));
        }
        let value = Value::Hash(pairs);
        if is_ref {
            Ok(Value::Ref(Rc::new(value)))
        } else {
            Ok(value)
        }
    }

    fn read_refp_alias(&mut self, is_refp: bool) -> Result<Value, Error> {
        let before = self.x;
        let offs = self.read_varint()? as usize;
        if offs >= before {
            return Err(Error::CorruptOffset);
        }

        let rc = match self.tracked.get(&offs) {
            Some(rc) => rc,
            None if is_refp => return Err(Error::UntrackedOffsetRefp),
            None => return Err(Error::UntrackedOffsetAlias),
        };

        if is_refp && self.compat_mode {
            // Share the referent's allocation so repeated REFPs keep one
            // identity through a later encode.
            match rc.as_ref() {
                Value::Ref(inner) => Ok(Value::Ref(inner.clone())),
                _ => Ok(Value::Ref(rc.clone())),
            }
        } else {
            Ok(rc.as_ref().clone())
        }
    }

    /// Reads the class name of an OBJECTV/OBJECTV_FREEZE: a varint offset to
    /// a previously decoded string.
    fn read_stringish_at_offset(&mut self) -> Result<String, Error> {
        let offs = self.read_varint()? as usize;
        let saved = self.x;
        self.x = offs;
        let class = self.read_stringish();
        self.x = saved;
        class
    }

    fn read_stringish(&mut self) -> Result<String, Error> {
        let bytes = self.read_stringish_bytes()?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }

    fn read_stringish_bytes(&mut self) -> Result<Vec<u8>, Error> {
        self.skip_pad()?;
        let tag_at = self.x;
        let tag = self.by[self.x] & !TRACK_FLAG;
        self.x += 1;

        match tag {
            TAG_BINARY | TAG_STR_UTF8 => {
                let ln = self.read_varint()?;
                if ln > i32::MAX as u64 {
                    return Err(Error::CorruptStringSize);
                }
                self.read_bytes(ln)
            }
            TAG_SHORT_BINARY_0..=0x7f => self.read_bytes((tag & 0x1f) as u64),
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

    fn read_freeze_payload(&mut self) -> Result<Vec<u8>, Error> {
        if self.x + 1 >= self.by.len() {
            return Err(Error::Truncated);
        }
        if self.by[self.x] != TAG_REFN || self.by[self.x + 1] != TAG_ARRAY {
            return Err(Error::FreezeNotRefnArray);
        }

        let wrapper = match self.read_any()? {
            Value::Ref(rc) => rc.as_ref().clone(),
            other => other,
        };
        let mut arr = match wrapper {
            Value::Array(arr) => arr,
            _ => return Err(Error::FreezeNotArray),
        };
        if arr.len() != 1 {
            return Err(Error::FreezeMultipleElements);
        }
        match arr.pop() {
            Some(Value::Bytes(data)) => Ok(data),
            _ => Err(Error::FreezeNotBytes),
        }
    }
}
