//! Byte-to-text decoding for streamed response bodies
//!
//! The answer body arrives as raw transport chunks. Two stateful decoders
//! turn those chunks into text fragments:
//!
//! - [`BodyDecoder`] undoes `content-encoding: gzip`/`deflate` compression
//!   incrementally, chunk by chunk.
//! - [`Utf8StreamDecoder`] decodes UTF-8 while carrying partial multi-byte
//!   sequences across chunk boundaries, so a character split between two
//!   transport chunks is never mangled or dropped.

use crate::error::{Result, VeridocError};
use flate2::write::{GzDecoder, ZlibDecoder};
use std::io::Write;

/// Streaming decompressor selected from the `content-encoding` header.
#[derive(Debug)]
pub enum BodyDecoder {
    /// No compression declared
    Identity,
    /// `content-encoding: gzip`
    Gzip(GzDecoder<Vec<u8>>),
    /// `content-encoding: deflate` (zlib-wrapped per RFC 1950)
    Deflate(ZlibDecoder<Vec<u8>>),
}

impl BodyDecoder {
    /// Select a decoder from the response's `content-encoding` header value.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Stream` for encodings this client cannot undo.
    pub fn for_content_encoding(encoding: Option<&str>) -> Result<Self> {
        let normalized = encoding.map(|e| e.trim().to_ascii_lowercase());
        match normalized.as_deref() {
            None | Some("") | Some("identity") => Ok(BodyDecoder::Identity),
            Some("gzip") => Ok(BodyDecoder::Gzip(GzDecoder::new(Vec::new()))),
            Some("deflate") => Ok(BodyDecoder::Deflate(ZlibDecoder::new(Vec::new()))),
            Some(other) => {
                Err(VeridocError::Stream(format!("Unsupported content-encoding: {}", other)).into())
            }
        }
    }

    /// Feed one transport chunk, returning whatever decompressed bytes are
    /// available so far. Compression state carries over to the next call.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Stream` if the compressed data is corrupt.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        match self {
            BodyDecoder::Identity => Ok(chunk.to_vec()),
            BodyDecoder::Gzip(decoder) => {
                decoder
                    .write_all(chunk)
                    .and_then(|_| decoder.flush())
                    .map_err(|e| VeridocError::Stream(format!("Gzip decode failed: {}", e)))?;
                Ok(std::mem::take(decoder.get_mut()))
            }
            BodyDecoder::Deflate(decoder) => {
                decoder
                    .write_all(chunk)
                    .and_then(|_| decoder.flush())
                    .map_err(|e| VeridocError::Stream(format!("Deflate decode failed: {}", e)))?;
                Ok(std::mem::take(decoder.get_mut()))
            }
        }
    }

    /// Finish the stream, returning any decompressed bytes still buffered.
    ///
    /// # Errors
    ///
    /// Returns `VeridocError::Stream` if the compressed stream is truncated.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        match std::mem::replace(self, BodyDecoder::Identity) {
            BodyDecoder::Identity => Ok(Vec::new()),
            BodyDecoder::Gzip(decoder) => decoder
                .finish()
                .map_err(|e| VeridocError::Stream(format!("Gzip stream truncated: {}", e)).into()),
            BodyDecoder::Deflate(decoder) => decoder.finish().map_err(|e| {
                VeridocError::Stream(format!("Deflate stream truncated: {}", e)).into()
            }),
        }
    }
}

/// Incremental UTF-8 decoder.
///
/// Bytes that end mid-character are held back and prepended to the next
/// chunk; invalid sequences become U+FFFD replacement characters rather than
/// failing the stream.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    /// Create a decoder with no carried-over state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning the complete characters available so far.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        if bytes.is_empty() && self.pending.is_empty() {
            return String::new();
        }

        self.pending.extend_from_slice(bytes);
        let buffer = std::mem::take(&mut self.pending);
        let mut out = String::new();
        let mut rest: &[u8] = &buffer;

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        // Invalid sequence in the middle: replace and continue.
                        Some(len) => {
                            out.push('\u{FFFD}');
                            rest = &rest[valid + len..];
                        }
                        // Incomplete sequence at the end: carry it over.
                        None => {
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush any carried-over bytes at end-of-stream.
    ///
    /// A dangling partial sequence decodes lossily to replacement characters.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&tail).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_identity_passthrough() {
        let mut decoder = BodyDecoder::for_content_encoding(None).unwrap();
        assert_eq!(decoder.push(b"hello").unwrap(), b"hello");
        assert!(decoder.finish().unwrap().is_empty());
    }

    #[test]
    fn test_identity_aliases() {
        assert!(BodyDecoder::for_content_encoding(Some("identity")).is_ok());
        assert!(BodyDecoder::for_content_encoding(Some("")).is_ok());
        assert!(BodyDecoder::for_content_encoding(Some(" GZIP ")).is_ok());
    }

    #[test]
    fn test_unsupported_encoding_rejected() {
        let err = BodyDecoder::for_content_encoding(Some("br")).unwrap_err();
        assert!(err.to_string().contains("Unsupported content-encoding"));
    }

    #[test]
    fn test_gzip_round_trip_single_chunk() {
        let compressed = gzip("Hi there!".as_bytes());
        let mut decoder = BodyDecoder::for_content_encoding(Some("gzip")).unwrap();
        let mut out = decoder.push(&compressed).unwrap();
        out.extend(decoder.finish().unwrap());
        assert_eq!(out, b"Hi there!");
    }

    #[test]
    fn test_gzip_split_across_chunks() {
        let compressed = gzip("streamed over many chunks".as_bytes());
        let mut decoder = BodyDecoder::for_content_encoding(Some("gzip")).unwrap();

        let mut out = Vec::new();
        for chunk in compressed.chunks(3) {
            out.extend(decoder.push(chunk).unwrap());
        }
        out.extend(decoder.finish().unwrap());
        assert_eq!(out, b"streamed over many chunks");
    }

    #[test]
    fn test_deflate_round_trip() {
        let compressed = deflate("deflated".as_bytes());
        let mut decoder = BodyDecoder::for_content_encoding(Some("deflate")).unwrap();
        let mut out = Vec::new();
        for chunk in compressed.chunks(2) {
            out.extend(decoder.push(chunk).unwrap());
        }
        out.extend(decoder.finish().unwrap());
        assert_eq!(out, b"deflated");
    }

    #[test]
    fn test_gzip_corrupt_data_errors() {
        let mut decoder = BodyDecoder::for_content_encoding(Some("gzip")).unwrap();
        let result = decoder.push(b"definitely not gzip data");
        assert!(result.is_err());
    }

    #[test]
    fn test_utf8_ascii_passthrough() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b"hello"), "hello");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_utf8_multibyte_split_across_chunks() {
        // U+00E9 is 0xC3 0xA9; split it between two chunks.
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(&[b'c', b'a', b'f', 0xC3]), "caf");
        assert_eq!(decoder.push(&[0xA9]), "\u{00E9}");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_utf8_four_byte_char_split_three_ways() {
        // U+1F600 is F0 9F 98 80.
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(&[0xF0]), "");
        assert_eq!(decoder.push(&[0x9F, 0x98]), "");
        assert_eq!(decoder.push(&[0x80]), "\u{1F600}");
    }

    #[test]
    fn test_utf8_invalid_sequence_becomes_replacement() {
        let mut decoder = Utf8StreamDecoder::new();
        let out = decoder.push(&[b'a', 0xFF, b'b']);
        assert_eq!(out, "a\u{FFFD}b");
    }

    #[test]
    fn test_utf8_dangling_partial_flushes_lossy() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(&[b'x', 0xC3]), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_utf8_empty_input() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.push(b""), "");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_gzip_then_utf8_equals_direct_decode() {
        // Decoding compressed chunks must be byte-identical to decoding the
        // decompressed body directly, even with multi-byte chars split.
        let text = "héllo wörld \u{1F600} end";
        let compressed = gzip(text.as_bytes());

        let mut body = BodyDecoder::for_content_encoding(Some("gzip")).unwrap();
        let mut utf8 = Utf8StreamDecoder::new();
        let mut out = String::new();
        for chunk in compressed.chunks(5) {
            out.push_str(&utf8.push(&body.push(chunk).unwrap()));
        }
        out.push_str(&utf8.push(&body.finish().unwrap()));
        out.push_str(&utf8.finish());

        assert_eq!(out, text);
    }
}
