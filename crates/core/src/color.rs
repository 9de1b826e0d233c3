//! Hex/RGB conversion with output-path clamping.
//!
//! Decoding is strict: anything that is not exactly six hex digits is an
//! error, and out-of-range input is never silently corrected. Encoding is
//! forgiving: channels are clamped to the displayable range, so a color can
//! always be written once it is in the model.

use crate::error::{Error, Result};

/// Clamp a raw channel value to 0..=255.
pub fn clamp_channel(x: i64) -> u8 {
    x.clamp(0, 255) as u8
}

/// Decode exactly six hex digits into an RGB triple.
///
/// A leading `#` is not accepted here; callers strip it first.
pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8)> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidHex(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::InvalidHex(hex.to_string()))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

/// Encode an RGB triple as six lowercase hex digits, no leading `#`.
///
/// Each channel is clamped to 0..=255 independently before encoding.
pub fn rgb_to_hex(r: i64, g: i64, b: i64) -> String {
    format!(
        "{:02x}{:02x}{:02x}",
        clamp_channel(r),
        clamp_channel(g),
        clamp_channel(b)
    )
}
