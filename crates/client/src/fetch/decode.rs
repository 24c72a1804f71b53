//! Response body decoding.
//!
//! The page client leaves gzip bodies untouched so a malformed stream can
//! fall back to the raw bytes instead of failing the whole fetch.

use std::io::Read;

use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Whether a body should be treated as gzip, by header or by magic bytes.
pub fn is_gzip(content_encoding: Option<&str>, body: &[u8]) -> bool {
    let declared = content_encoding.is_some_and(|enc| {
        enc.split(',')
            .any(|token| matches!(token.trim().to_ascii_lowercase().as_str(), "gzip" | "x-gzip"))
    });
    declared || body.starts_with(&GZIP_MAGIC)
}

/// Decode a body to text, decompressing gzip when present.
///
/// Invalid UTF-8 is replaced rather than rejected. If decompression fails
/// the raw bytes are decoded as-is.
pub fn decode_body(content_encoding: Option<&str>, body: &[u8]) -> String {
    if is_gzip(content_encoding, body) {
        let mut decoder = GzDecoder::new(body);
        let mut decoded = Vec::new();
        match decoder.read_to_end(&mut decoded) {
            Ok(_) => return String::from_utf8_lossy(&decoded).into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "gzip decode failed; using raw body");
            }
        }
    }

    String::from_utf8_lossy(body).into_owned()
}
