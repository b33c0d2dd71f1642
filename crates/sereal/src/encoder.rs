//! Encoder: walks a value tree emitting tag bytes into a growing buffer,
//! deduplicating repeated strings through COPY and repeated reference
//! handles through REFP, then optionally compresses the body.

use std::collections::HashMap;
use std::rc::Rc;

use sereal_buffers::Writer;

use crate::compress::Compression;
use crate::constants::{
    DocumentType, TAG_ARRAY, TAG_BINARY, TAG_CANONICAL_UNDEF, TAG_COPY, TAG_DOUBLE, TAG_FALSE,
    TAG_FLOAT, TAG_HASH, TAG_OBJECT, TAG_OBJECTV, TAG_OBJECTV_FREEZE, TAG_OBJECT_FREEZE, TAG_REFN,
    TAG_REFP, TAG_REGEXP, TAG_SHORT_BINARY_0, TAG_STR_UTF8, TAG_TRUE, TAG_UNDEF, TAG_VARINT,
    TAG_WEAKEN, TAG_ZIGZAG, TRACK_FLAG, MAX_VERSION,
};
use crate::error::Error;
use crate::header::magic_for_version;
use crate::value::{Object, Value};
use crate::varint;

/// Default protocol version written by a fresh encoder.
const DEFAULT_VERSION: u8 = 2;

/// Strings shorter than this are cheaper to repeat than to COPY.
const MIN_COPY_LEN: usize = 4;

const KIND_TEXT: u8 = 0;
const KIND_BINARY: u8 = 1;

/// Writes Sereal documents.
///
/// Configuration lives in the public fields; the dedup tables and output
/// buffer are per-call state, reset at the top of every encode. An instance
/// must not be shared across concurrent calls.
pub struct Encoder {
    /// Protocol version to emit, 1 through 4.
    pub version: u8,
    /// Wrap sequences and mappings in REFN so compatibility-mode decoders
    /// reconstruct the source idiom's references.
    pub compat_mode: bool,
    /// Body compression. Checked against `version` at encode time.
    pub compression: Compression,
    /// Minimum body length before `compression` kicks in.
    pub compression_threshold: usize,
    /// Emit struct-kind values as plain mappings keyed by field name
    /// instead of class-tagged objects.
    pub struct_as_map: bool,

    w: Writer,
    str_table: HashMap<(u8, Vec<u8>), usize>,
    ptr_table: HashMap<usize, usize>,
    body_start: usize,
    in_header: bool,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Returns an encoder with default settings: version 2, no compression,
    /// no compatibility mode.
    pub fn new() -> Self {
        Self {
            version: DEFAULT_VERSION,
            compat_mode: false,
            compression: Compression::None,
            compression_threshold: 0,
            struct_as_map: false,
            w: Writer::new(),
            str_table: HashMap::new(),
            ptr_table: HashMap::new(),
            body_start: 0,
            in_header: false,
        }
    }

    /// Encodes `body` into a complete document.
    pub fn encode(&mut self, body: &Value) -> Result<Vec<u8>, Error> {
        self.encode_header_body(None, body)
    }

    /// Encodes a document with an optional user header in the suffix.
    pub fn encode_header_body(
        &mut self,
        header: Option<&Value>,
        body: &Value,
    ) -> Result<Vec<u8>, Error> {
        self.begin_document()?;
        match header {
            None => self.write_empty_suffix(),
            Some(value) => {
                let header_doc = self.encode_user_header(value)?;
                self.write_header_suffix(&header_doc);
            }
        }
        self.set_body_start();
        self.write_value(body)?;
        self.finish_document()
    }

    // ------------------------------------------------------------ document

    pub(crate) fn begin_document(&mut self) -> Result<(), Error> {
        if self.version == 0 || self.version > MAX_VERSION {
            return Err(Error::UnsupportedVersion(self.version));
        }
        self.compression.check_version(self.version)?;

        self.w.clear();
        self.str_table.clear();
        self.ptr_table.clear();
        self.body_start = 0;
        self.in_header = false;

        self.w.buf(&magic_for_version(self.version));
        // doctype nibble patched after the compression decision
        self.w.u8(self.version);
        Ok(())
    }

    /// Encodes a value destined for the header suffix. Offset-emitting
    /// constructs are disabled there: suffix values have no body base for
    /// COPY/REFP/OBJECTV operands.
    pub(crate) fn encode_user_header(&mut self, value: &Value) -> Result<Vec<u8>, Error> {
        let saved = self.begin_user_header();
        let result = self.write_value(value);
        let header_doc = self.end_user_header(saved);
        result.map(|_| header_doc)
    }

    /// Redirects output to a fresh buffer for user-header encoding. The
    /// returned writer must be handed back through [`Self::end_user_header`].
    pub(crate) fn begin_user_header(&mut self) -> Writer {
        self.in_header = true;
        std::mem::take(&mut self.w)
    }

    pub(crate) fn end_user_header(&mut self, saved: Writer) -> Vec<u8> {
        self.in_header = false;
        let header_doc = self.w.flush();
        self.w = saved;
        header_doc
    }

    pub(crate) fn set_body_start(&mut self) {
        self.body_start = self.w.x;
    }

    pub(crate) fn write_empty_suffix(&mut self) {
        varint::encode_into(&mut self.w, 0);
    }

    pub(crate) fn write_header_suffix(&mut self, header_doc: &[u8]) {
        varint::encode_into(&mut self.w, 1 + header_doc.len() as u64);
        self.w.u8(1);
        self.w.buf(header_doc);
    }

    pub(crate) fn finish_document(&mut self) -> Result<Vec<u8>, Error> {
        let mut doc = self.w.flush();
        let mut doctype = DocumentType::Raw;

        if self.compression != Compression::None
            && doc.len() - self.body_start >= self.compression_threshold
        {
            let framed = self.compression.compress(&doc[self.body_start..])?;
            doc.truncate(self.body_start);
            doc.extend_from_slice(&framed);
            doctype = self.compression.doctype();
        }

        doc[4] = ((doctype as u8) << 4) | self.version;
        Ok(doc)
    }

    /// Translates an absolute writer position into the document's offset
    /// base: absolute for v1, 1-based body-relative for v2+.
    fn offset_of(&self, pos: usize) -> u64 {
        if self.version == 1 {
            pos as u64
        } else {
            (pos - self.body_start + 1) as u64
        }
    }

    // ------------------------------------------------------------ values

    pub(crate) fn write_value(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Null => {
                self.w.u8(TAG_UNDEF);
                Ok(())
            }
            Value::CanonicalNull => {
                self.w.u8(TAG_CANONICAL_UNDEF);
                Ok(())
            }
            Value::Bool(b) => {
                self.write_bool(*b);
                Ok(())
            }
            Value::Integer(i) => {
                self.write_integer(*i);
                Ok(())
            }
            Value::UInteger(u) => {
                self.write_uinteger(*u);
                Ok(())
            }
            Value::Float(f) => {
                self.write_float(*f);
                Ok(())
            }
            Value::Double(f) => {
                self.write_double(*f);
                Ok(())
            }
            Value::Bytes(b) => {
                self.write_bytes_value(b);
                Ok(())
            }
            Value::Str(s) => {
                self.write_str_value(s);
                Ok(())
            }
            Value::Array(arr) => {
                self.write_array_start(arr.len());
                for item in arr {
                    self.write_value(item)?;
                }
                Ok(())
            }
            Value::Hash(pairs) => {
                self.write_hash_start(pairs.len());
                for (key, val) in pairs {
                    self.write_str_value(key);
                    self.write_value(val)?;
                }
                Ok(())
            }
            Value::Ref(rc) => self.write_ref(rc),
            Value::Weak(rc) => {
                self.w.u8(TAG_WEAKEN);
                self.write_ref(rc)
            }
            Value::Regexp(re) => {
                self.write_regexp(&re.pattern, &re.modifiers);
                Ok(())
            }
            Value::Object(obj) => self.write_object(obj),
            Value::Frozen(frozen) => self.write_frozen(&frozen.class, &frozen.data),
        }
    }

    pub(crate) fn write_null(&mut self) {
        self.w.u8(TAG_UNDEF);
    }

    pub(crate) fn write_bool(&mut self, b: bool) {
        self.w.u8(if b { TAG_TRUE } else { TAG_FALSE });
    }

    pub(crate) fn write_integer(&mut self, i: i64) {
        if (0..=15).contains(&i) {
            self.w.u8(i as u8);
        } else if (-16..=-1).contains(&i) {
            self.w.u8((i + 32) as u8);
        } else if i > 0 {
            self.w.u8(TAG_VARINT);
            varint::encode_into(&mut self.w, i as u64);
        } else {
            // this codec zigzags only negative values
            self.w.u8(TAG_ZIGZAG);
            let magnitude = i.unsigned_abs();
            varint::encode_into(&mut self.w, (magnitude - 1) * 2 + 1);
        }
    }

    pub(crate) fn write_uinteger(&mut self, u: u64) {
        if u <= i64::MAX as u64 {
            self.write_integer(u as i64);
        } else {
            self.w.u8(TAG_VARINT);
            varint::encode_into(&mut self.w, u);
        }
    }

    pub(crate) fn write_float(&mut self, f: f32) {
        self.w.u8(TAG_FLOAT);
        self.w.f32(f);
    }

    pub(crate) fn write_double(&mut self, f: f64) {
        self.w.u8(TAG_DOUBLE);
        self.w.f64(f);
    }

    /// Emits a text string, or COPY when the same text was written before.
    pub(crate) fn write_str_value(&mut self, s: &str) {
        if self.write_copy_if_seen(KIND_TEXT, s.as_bytes()) {
            return;
        }
        let pos = self.w.x;
        self.w.u8(TAG_STR_UTF8);
        varint::encode_into(&mut self.w, s.len() as u64);
        self.w.utf8(s);
        self.record_string(KIND_TEXT, s.as_bytes(), pos);
    }

    /// Emits a byte string, or COPY when the same bytes were written before.
    pub(crate) fn write_bytes_value(&mut self, b: &[u8]) {
        if self.write_copy_if_seen(KIND_BINARY, b) {
            return;
        }
        let pos = self.w.x;
        if b.len() <= 31 {
            self.w.u8(TAG_SHORT_BINARY_0 + b.len() as u8);
        } else {
            self.w.u8(TAG_BINARY);
            varint::encode_into(&mut self.w, b.len() as u64);
        }
        self.w.buf(b);
        self.record_string(KIND_BINARY, b, pos);
    }

    fn write_copy_if_seen(&mut self, kind: u8, bytes: &[u8]) -> bool {
        if self.in_header || bytes.len() < MIN_COPY_LEN {
            return false;
        }
        if let Some(&pos) = self.str_table.get(&(kind, bytes.to_vec())) {
            self.w.u8(TAG_COPY);
            let offset = self.offset_of(pos);
            varint::encode_into(&mut self.w, offset);
            return true;
        }
        false
    }

    fn record_string(&mut self, kind: u8, bytes: &[u8], pos: usize) {
        if self.in_header || bytes.len() < MIN_COPY_LEN {
            return;
        }
        self.str_table.entry((kind, bytes.to_vec())).or_insert(pos);
    }

    /// Sequences are emitted as bare ARRAY tags; compatibility mode adds the
    /// REFN wrapper that compat decoders turn back into a reference. The
    /// inline ARRAYREF/HASHREF forms are accepted on decode for
    /// interoperability but never produced, so documents from this encoder
    /// read back identically under either decode mode.
    pub(crate) fn write_array_start(&mut self, len: usize) {
        if self.compat_mode {
            self.w.u8(TAG_REFN);
        }
        self.w.u8(TAG_ARRAY);
        varint::encode_into(&mut self.w, len as u64);
    }

    pub(crate) fn write_hash_start(&mut self, len: usize) {
        if self.compat_mode {
            self.w.u8(TAG_REFN);
        }
        self.w.u8(TAG_HASH);
        varint::encode_into(&mut self.w, len as u64);
    }

    /// Emits an explicit reference. A handle seen before becomes REFP to the
    /// first emission, whose tag byte gets the track flag retrofitted.
    fn write_ref(&mut self, rc: &Rc<Value>) -> Result<(), Error> {
        let addr = Rc::as_ptr(rc) as usize;
        if !self.in_header {
            if let Some(&pos) = self.ptr_table.get(&addr) {
                self.w.u8(TAG_REFP);
                let offset = self.offset_of(pos);
                varint::encode_into(&mut self.w, offset);
                self.w.uint8[pos] |= TRACK_FLAG;
                return Ok(());
            }
        }

        let pos = self.w.x;
        self.w.u8(TAG_REFN);
        if !self.in_header {
            self.ptr_table.insert(addr, pos);
        }
        // the referent itself is emitted bare so the one level of
        // indirection stays one level
        match rc.as_ref() {
            Value::Array(arr) => {
                self.w.u8(TAG_ARRAY);
                varint::encode_into(&mut self.w, arr.len() as u64);
                for item in arr {
                    self.write_value(item)?;
                }
                Ok(())
            }
            Value::Hash(pairs) => {
                self.w.u8(TAG_HASH);
                varint::encode_into(&mut self.w, pairs.len() as u64);
                for (key, val) in pairs {
                    self.write_str_value(key);
                    self.write_value(val)?;
                }
                Ok(())
            }
            other => self.write_value(other),
        }
    }

    pub(crate) fn write_regexp(&mut self, pattern: &[u8], modifiers: &[u8]) {
        self.w.u8(TAG_REGEXP);
        self.write_bytes_value(pattern);
        self.write_bytes_value(modifiers);
    }

    /// Emits the OBJECT class prefix, as OBJECTV when the class name was
    /// written before.
    pub(crate) fn write_object_start(&mut self, class: &str) {
        let key = (KIND_TEXT, class.as_bytes().to_vec());
        match (!self.in_header)
            .then(|| self.str_table.get(&key).copied())
            .flatten()
        {
            Some(pos) => {
                self.w.u8(TAG_OBJECTV);
                let offset = self.offset_of(pos);
                varint::encode_into(&mut self.w, offset);
            }
            None => {
                self.w.u8(TAG_OBJECT);
                self.write_str_value(class);
            }
        }
    }

    fn write_object(&mut self, obj: &Object) -> Result<(), Error> {
        self.write_object_start(&obj.class);
        self.write_value(&obj.value)
    }

    /// OBJECT_FREEZE: class name plus the payload wrapped as
    /// REFN + ARRAY(1) + BINARY.
    pub(crate) fn write_frozen(&mut self, class: &str, data: &[u8]) -> Result<(), Error> {
        let key = (KIND_TEXT, class.as_bytes().to_vec());
        match (!self.in_header)
            .then(|| self.str_table.get(&key).copied())
            .flatten()
        {
            Some(pos) => {
                self.w.u8(TAG_OBJECTV_FREEZE);
                let offset = self.offset_of(pos);
                varint::encode_into(&mut self.w, offset);
            }
            None => {
                self.w.u8(TAG_OBJECT_FREEZE);
                self.write_str_value(class);
            }
        }

        self.w.u8(TAG_REFN);
        self.w.u8(TAG_ARRAY);
        varint::encode_into(&mut self.w, 1);
        self.w.u8(TAG_BINARY);
        varint::encode_into(&mut self.w, data.len() as u64);
        self.w.buf(data);
        Ok(())
    }
}
