//! Hex text handling for find/replace patterns and byte previews.

use crate::error::{Error, Result};

/// Default number of bytes shown by [`hex_preview`]
pub const DEFAULT_PREVIEW_BYTES: usize = 512;

/// Parse user-entered hex text into bytes.
///
/// Surrounding whitespace is trimmed and inner whitespace is ignored, so
/// `"FF D8 ff"` decodes to `[0xFF, 0xD8, 0xFF]`. Errors name `field`.
pub fn parse_hex_field(field: &'static str, text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "value is required"));
    }

    let digits: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(Error::validation(
            field,
            format!("contains invalid hex character '{}' (expected 0-9, A-F)", bad),
        ));
    }

    if digits.len() % 2 != 0 {
        return Err(Error::validation(
            field,
            format!(
                "has {} hex digits; expected an even number (complete bytes)",
                digits.len()
            ),
        ));
    }

    ::hex::decode(&digits).map_err(|e| Error::validation(field, e.to_string()))
}

/// Render the first `limit` bytes as space separated upper-case hex.
pub fn hex_preview(data: &[u8], limit: usize) -> String {
    let shown = &data[..limit.min(data.len())];
    let mut out = String::with_capacity(shown.len() * 3);

    for (i, byte) in shown.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:02X}", byte));
    }

    out
}
