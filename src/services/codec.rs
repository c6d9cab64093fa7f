//! Decoding of transport-encoded file content.

use crate::error::AppError;
use crate::models::FileEntry;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encoding tag Gitea uses for file bodies.
pub const BASE64_ENCODING: &str = "base64";

/// Encoding tag written after a body has been decoded.
pub const PLAIN_TEXT_ENCODING: &str = "utf-8";

/// Decode a base64 payload into text.
///
/// Line breaks and other ASCII whitespace inside the payload are ignored.
/// Bytes that are not valid UTF-8 are rejected rather than replaced.
pub fn decode_content(encoded: &str) -> Result<String, AppError> {
    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| AppError::Decode(format!("invalid base64 content: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| AppError::Decode(format!("content is not valid UTF-8: {}", e)))
}

/// Decode an entry's content if it is base64-tagged and non-empty.
///
/// On success the encoding tag becomes [`PLAIN_TEXT_ENCODING`]. Entries with
/// no tag, another tag, or no content are returned untouched.
pub fn decode_entry(mut entry: FileEntry) -> Result<FileEntry, AppError> {
    let is_base64 = entry
        .encoding
        .as_deref()
        .is_some_and(|tag| tag.eq_ignore_ascii_case(BASE64_ENCODING));

    match entry.content.as_deref() {
        Some(content) if is_base64 && !content.is_empty() => {
            entry.content = Some(decode_content(content)?);
            entry.encoding = Some(PLAIN_TEXT_ENCODING.to_string());
        }
        _ => {}
    }

    Ok(entry)
}
