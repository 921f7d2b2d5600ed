//! Percent escaping for the delta and patch wire formats.
//!
//! The encoder keeps the characters that JavaScript's `encodeURI` leaves
//! alone, so payloads stay compact and byte-compatible across ports. The
//! decoder is strict: a malformed escape or a decoded sequence that is not
//! valid UTF-8 is a typed error rather than a silently altered payload.

use thiserror::Error;

/// Characters that survive escaping besides ASCII alphanumerics.
const SAFE: &[u8] = b" -_.!~*'();/?:@&=+$,#";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
    #[error("invalid UTF-8 after unescaping: {0:?}")]
    InvalidUtf8(String),
}

/// Escape `text` for the wire, keeping the fixed safe-character set.
///
/// # Examples
///
/// ```
/// use dmp_util::percent::encode_query;
///
/// assert_eq!(encode_query("a b"), "a b");
/// assert_eq!(encode_query("100%"), "100%25");
/// assert_eq!(encode_query("\u{0682}"), "%DA%82");
/// ```
pub fn encode_query(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &b in text.as_bytes() {
        if b.is_ascii_alphanumeric() || SAFE.contains(&b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(char::from_digit((b >> 4) as u32, 16).unwrap_or('0').to_ascii_uppercase());
            out.push(char::from_digit((b & 0xf) as u32, 16).unwrap_or('0').to_ascii_uppercase());
        }
    }
    out
}

/// Reverse [`encode_query`]. `+` and space decode to themselves; `%XX`
/// escapes accept either hex case.
pub fn decode_query(text: &str) -> Result<String, DecodeError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16));
            let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16));
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                }
                _ => {
                    let end = (i + 3).min(bytes.len());
                    let snippet = String::from_utf8_lossy(&bytes[i..end]).into_owned();
                    return Err(DecodeError::InvalidEscape(snippet));
                }
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out)
        .map_err(|e| DecodeError::InvalidUtf8(String::from_utf8_lossy(e.as_bytes()).into_owned()))
}
