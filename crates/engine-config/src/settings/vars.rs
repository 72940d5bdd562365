use crate::error::SettingsError;
use std::{collections::HashMap, fmt::Display, str::FromStr};

/// Read-only view over the merged process and `.env` variables.
pub struct Vars<'a> {
    inner: &'a HashMap<String, String>,
}

impl<'a> Vars<'a> {
    pub fn new(inner: &'a HashMap<String, String>) -> Self {
        Self { inner }
    }

    /// The trimmed value, treating blank as unset.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.inner
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, key: &str) -> Result<&'a str, SettingsError> {
        self.get(key)
            .ok_or_else(|| SettingsError::Missing(key.to_string()))
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Parses `key` as `T`, falling back to `default` when unset.
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, SettingsError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| SettingsError::Invalid {
                key: key.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Like [`Vars::parse_or`] but rejects values outside `min..=max`.
    pub fn bounded_or<T>(&self, key: &str, default: T, min: T, max: T) -> Result<T, SettingsError>
    where
        T: FromStr + PartialOrd + Display + Copy,
        T::Err: Display,
    {
        let value = self.parse_or(key, default)?;
        if value < min || value > max {
            return Err(SettingsError::Invalid {
                key: key.to_string(),
                value: value.to_string(),
                reason: format!("must be between {min} and {max}"),
            });
        }
        Ok(value)
    }
}

/// Percent-encodes the characters that would break a URL's user-info part.
pub(crate) fn encode_userinfo(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
