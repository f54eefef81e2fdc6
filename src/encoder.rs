//! # Encoder
//!
//! Pure byte-level conversions between the UTF-8 text we read and the UTF-16LE
//! layout `rc.exe` accepts. Nothing in here touches the file system.

use std::borrow::Cow;
use std::str::Utf8Error;
use encoding_rs::UTF_16LE;

/// The UTF-16 little-endian byte-order mark.
pub const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Decodes `bytes` as strict UTF-8.
///
/// A leading UTF-8 BOM (`EF BB BF`) is *not* stripped; it decodes to U+FEFF and
/// travels through the conversion like any other character.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str, Utf8Error> {
    std::str::from_utf8(bytes)
}

/// Encodes `text` as UTF-16LE, prefixed with [`UTF16LE_BOM`].
///
/// Characters outside the basic multilingual plane become surrogate pairs.
pub fn encode_utf16le_with_bom(text: &str) -> Vec<u8> {
    // Every char is at most two code units; len() is a cheap upper bound on chars.
    let mut out = Vec::with_capacity(UTF16LE_BOM.len() + text.len() * 2);
    out.extend_from_slice(&UTF16LE_BOM);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Decodes a BOM-prefixed UTF-16LE buffer back into a `String`.
///
/// Returns `None` if the BOM is missing or the payload is malformed (odd length,
/// unpaired surrogates). Nothing is replaced with U+FFFD.
pub fn decode_utf16le_with_bom(bytes: &[u8]) -> Option<String> {
    let payload = bytes.strip_prefix(&UTF16LE_BOM)?;
    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(payload)
        .map(Cow::into_owned)
}
