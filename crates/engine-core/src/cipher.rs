//! Legacy shift cipher used for stored passwords.
//!
//! The legacy system shifted every UTF-16 code unit down by a key-derived
//! amount and let the result wrap modulo 2^16. That wrap is kept exactly,
//! since passwords recovered earlier were hashed from it.
//!
//! A shift can land on an unpaired surrogate. The legacy runtime never
//! rejected that: the text went on to the hasher as UTF-8, with each unpaired
//! surrogate written as U+FFFD. [`recover_password`] reproduces that under the
//! configured shift, so it never falls back to [`DEFAULT_SHIFT`] for a key
//! that parses to something else.

use crate::error::CipherError;
use tracing::warn;

/// Shift used when the key is missing, unparseable or out of range.
pub const DEFAULT_SHIFT: u16 = 13;

/// Derives the shift from a key the way a base-10 `parseInt` would: leading
/// whitespace, optional sign, then the longest run of ASCII digits. Anything
/// not strictly between 0 and 256 falls back to [`DEFAULT_SHIFT`].
pub fn parse_shift(key: &str) -> u16 {
    let trimmed = key.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() || negative {
        return DEFAULT_SHIFT;
    }

    match digits.parse::<u64>() {
        Ok(n) if n > 0 && n < 256 => n as u16,
        _ => DEFAULT_SHIFT,
    }
}

/// Recovers plaintext from `cipher_text` using the shift derived from `key`.
pub fn decode(key: &str, cipher_text: &str) -> Result<String, CipherError> {
    shift_strict(cipher_text, parse_shift(key), u16::wrapping_sub)
}

/// Inverse of [`decode`] for the same key.
pub fn encode(key: &str, plain_text: &str) -> Result<String, CipherError> {
    shift_strict(plain_text, parse_shift(key), u16::wrapping_add)
}

/// Plaintext exactly as the legacy system fed it to the password hash.
///
/// Decodes with the configured key; unpaired surrogates in the result become
/// U+FFFD instead of failing the row.
pub fn recover_password(key: &str, cipher_text: &str) -> String {
    match decode(key, cipher_text) {
        Ok(plain) => plain,
        Err(err) => {
            warn!(error = %err, "Cipher output is not valid UTF-16, replacing unpaired surrogates");
            decode_lossy(cipher_text, parse_shift(key))
        }
    }
}

fn shifted_units(text: &str, shift: u16, op: fn(u16, u16) -> u16) -> Vec<u16> {
    text.encode_utf16().map(|unit| op(unit, shift)).collect()
}

fn shift_strict(text: &str, shift: u16, op: fn(u16, u16) -> u16) -> Result<String, CipherError> {
    if text.is_empty() {
        return Ok(String::new());
    }
    let units = shifted_units(text, shift, op);
    String::from_utf16(&units).map_err(|_| CipherError::InvalidUtf16 {
        shift,
        position: first_unpaired(&units).unwrap_or(0),
    })
}

fn decode_lossy(text: &str, shift: u16) -> String {
    String::from_utf16_lossy(&shifted_units(text, shift, u16::wrapping_sub))
}

fn first_unpaired(units: &[u16]) -> Option<usize> {
    let mut offset = 0;
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(c) => offset += c.len_utf16(),
            Err(_) => return Some(offset),
        }
    }
    None
}
