//! UTF-8 / UTF-16 conversion helpers

use crate::Result;

/// Number of UTF-16 code units needed to hold `s`, without terminator.
#[inline]
pub fn encoded_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Truncates `units` at the first NUL, if any.
pub fn until_nul(units: &[u16]) -> &[u16] {
    match units.iter().position(|&u| u == 0) {
        Some(end) => &units[..end],
        None => units,
    }
}

/// Decodes UTF-16 into a `String`, replacing unpaired surrogates with U+FFFD.
pub fn decode(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Decodes UTF-16 into a `String`, failing on unpaired surrogates.
pub fn try_decode(units: &[u16]) -> Result<String> {
    Ok(String::from_utf16(units)?)
}
