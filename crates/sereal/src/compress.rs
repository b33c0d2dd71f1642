//! Body compression adapters.
//!
//! The variant set is closed by the wire format, so the adapter is a plain
//! enum with one match in the decompressor factory rather than an open
//! trait. Codec internals are delegated to `snap`, `flate2`, and `zstd`.

use std::io::Read;

use sereal_buffers::Writer;

use crate::constants::DocumentType;
use crate::error::Error;
use crate::varint;

/// Body compression applied after encoding, selected by the document type
/// nibble when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Doctype 0: body used verbatim.
    #[default]
    None,
    /// Doctype 1: one-shot Snappy block, protocol version 1 only.
    Snappy,
    /// Doctype 2: varint length prefix + Snappy block of that exact length.
    SnappyIncremental,
    /// Doctype 3: varint uncompressed/compressed lengths + zlib stream,
    /// protocol version 3 and up.
    Zlib,
    /// Doctype 4: varint compressed length + zstd frame, protocol version 4
    /// and up.
    Zstd,
}

impl Compression {
    /// Document type nibble this compression writes.
    pub(crate) fn doctype(&self) -> DocumentType {
        match self {
            Compression::None => DocumentType::Raw,
            Compression::Snappy => DocumentType::Snappy,
            Compression::SnappyIncremental => DocumentType::SnappyIncremental,
            Compression::Zlib => DocumentType::Zlib,
            Compression::Zstd => DocumentType::Zstd,
        }
    }

    /// Rejects codec/protocol-version combinations the wire format forbids.
    pub(crate) fn check_version(&self, version: u8) -> Result<(), Error> {
        match self {
            Compression::Snappy if version != 1 => Err(Error::BadSnappyVersion),
            Compression::Zlib if version < 3 => Err(Error::BadZlibVersion),
            Compression::Zstd if version < 4 => Err(Error::BadZstdVersion),
            _ => Ok(()),
        }
    }

    /// Compresses `body` into its framed wire form.
    pub(crate) fn compress(&self, body: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            Compression::None => Ok(body.to_vec()),
            Compression::Snappy => {
                Ok(snap::raw::Encoder::new().compress_vec(body)?)
            }
            Compression::SnappyIncremental => {
                let compressed = snap::raw::Encoder::new().compress_vec(body)?;
                let mut framed = Writer::with_alloc_size(compressed.len() + 10);
                varint::encode_into(&mut framed, compressed.len() as u64);
                framed.buf(&compressed);
                Ok(framed.flush())
            }
            Compression::Zlib => {
                use std::io::Write;
                let mut encoder = flate2::write::ZlibEncoder::new(
                    Vec::with_capacity(body.len() / 2),
                    flate2::Compression::default(),
                );
                encoder.write_all(body)?;
                let compressed = encoder.finish()?;
                let mut framed = Writer::with_alloc_size(compressed.len() + 20);
                varint::encode_into(&mut framed, body.len() as u64);
                varint::encode_into(&mut framed, compressed.len() as u64);
                framed.buf(&compressed);
                Ok(framed.flush())
            }
            Compression::Zstd => {
                let compressed = zstd::stream::encode_all(body, 0)?;
                let mut framed = Writer::with_alloc_size(compressed.len() + 10);
                varint::encode_into(&mut framed, compressed.len() as u64);
                framed.buf(&compressed);
                Ok(framed.flush())
            }
        }
    }

    /// Decompresses a framed `body`, appending the output to `dst`.
    ///
    /// When `dst` has enough spare capacity no reallocation happens, so
    /// callers can reuse one buffer across documents.
    pub(crate) fn decompress_into(&self, dst: &mut Vec<u8>, body: &[u8]) -> Result<(), Error> {
        match self {
            Compression::None => {
                dst.extend_from_slice(body);
                Ok(())
            }
            Compression::Snappy => {
                let len = snap::raw::decompress_len(body)?;
                let start = dst.len();
                dst.resize(start + len, 0);
                let written = snap::raw::Decoder::new().decompress(body, &mut dst[start..])?;
                dst.truncate(start + written);
                Ok(())
            }
            Compression::SnappyIncremental => {
                let (declared, sz) = varint::decode(body)?;
                let frame = &body[sz..];
                if (frame.len() as u64) < declared {
                    return Err(Error::Truncated);
                }
                if frame.len() as u64 != declared {
                    return Err(Error::CorruptCompressedSize);
                }
                let len = snap::raw::decompress_len(frame)?;
                let start = dst.len();
                dst.resize(start + len, 0);
                let written = snap::raw::Decoder::new().decompress(frame, &mut dst[start..])?;
                dst.truncate(start + written);
                Ok(())
            }
            Compression::Zlib => {
                let (uncompressed_len, s1) = varint::decode(body)?;
                let (compressed_len, s2) = varint::decode(&body[s1..])?;
                let frame = &body[s1 + s2..];
                if (frame.len() as u64) < compressed_len {
                    return Err(Error::Truncated);
                }
                if frame.len() as u64 != compressed_len {
                    return Err(Error::CorruptCompressedSize);
                }
                let start = dst.len();
                dst.reserve(uncompressed_len as usize);
                flate2::read::ZlibDecoder::new(frame).read_to_end(dst)?;
                if (dst.len() - start) as u64 != uncompressed_len {
                    return Err(Error::CorruptCompressedSize);
                }
                Ok(())
            }
            Compression::Zstd => {
                let (compressed_len, sz) = varint::decode(body)?;
                let frame = &body[sz..];
                if (frame.len() as u64) < compressed_len {
                    return Err(Error::Truncated);
                }
                if frame.len() as u64 != compressed_len {
                    return Err(Error::CorruptCompressedSize);
                }
                zstd::stream::read::Decoder::new(frame)?.read_to_end(dst)?;
                Ok(())
            }
        }
    }
}

/// Maps a document's type nibble to its decompressor, enforcing the
/// version gates of the wire format. Raw documents need no decompressor.
pub(crate) fn decompressor_for(version: u8, doctype: u8) -> Result<Option<Compression>, Error> {
    match DocumentType::from_nibble(doctype) {
        Some(DocumentType::Raw) => Ok(None),
        Some(DocumentType::Snappy) => {
            if version != 1 {
                return Err(Error::BadSnappyVersion);
            }
            Ok(Some(Compression::Snappy))
        }
        Some(DocumentType::SnappyIncremental) => Ok(Some(Compression::SnappyIncremental)),
        Some(DocumentType::Zlib) => {
            if version < 3 {
                return Err(Error::BadZlibVersion);
            }
            Ok(Some(Compression::Zlib))
        }
        Some(DocumentType::Zstd) => {
            if version < 4 {
                return Err(Error::BadZstdVersion);
            }
            Ok(Some(Compression::Zstd))
        }
        None => Err(Error::UnsupportedDocumentType(doctype)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"a body that repeats itself, repeats itself, repeats itself";

    #[test]
    fn roundtrip_all_codecs() {
        for compression in [
            Compression::Snappy,
            Compression::SnappyIncremental,
            Compression::Zlib,
            Compression::Zstd,
        ] {
            let framed = compression.compress(SAMPLE).unwrap();
            let mut out = Vec::new();
            compression.decompress_into(&mut out, &framed).unwrap();
            assert_eq!(out, SAMPLE, "{compression:?}");
        }
    }

    #[test]
    fn decompress_appends_after_existing_prefix() {
        let framed = Compression::SnappyIncremental.compress(SAMPLE).unwrap();
        let mut out = b"prefix".to_vec();
        Compression::SnappyIncremental
            .decompress_into(&mut out, &framed)
            .unwrap();
        assert_eq!(&out[..6], b"prefix");
        assert_eq!(&out[6..], SAMPLE);
    }

    #[test]
    fn incremental_length_mismatch_is_rejected() {
        let mut framed = Compression::SnappyIncremental.compress(SAMPLE).unwrap();
        framed.push(0xff);
        let mut out = Vec::new();
        assert!(matches!(
            Compression::SnappyIncremental.decompress_into(&mut out, &framed),
            Err(Error::CorruptCompressedSize)
        ));
    }

    #[test]
    fn factory_enforces_version_gates() {
        assert!(matches!(decompressor_for(2, 1), Err(Error::BadSnappyVersion)));
        assert!(matches!(decompressor_for(2, 3), Err(Error::BadZlibVersion)));
        assert!(matches!(decompressor_for(3, 4), Err(Error::BadZstdVersion)));
        assert!(matches!(decompressor_for(1, 1), Ok(Some(Compression::Snappy))));
        assert!(matches!(decompressor_for(4, 4), Ok(Some(Compression::Zstd))));
        assert!(matches!(decompressor_for(2, 0), Ok(None)));
        assert!(matches!(
            decompressor_for(2, 9),
            Err(Error::UnsupportedDocumentType(9))
        ));
    }
}
