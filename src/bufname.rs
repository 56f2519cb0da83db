//! Addressable buffer names.
//!
//! Virtual buffers are addressed by a name that encodes everything needed
//! to (re)build their content: a scheme tag, a path expression, a flag map,
//! and a free-text fragment:
//!
//! ```text
//! scheme://expr;key=value&key2=value2#fragment
//! ```
//!
//! Bytes that would collide with the separators (or that editors treat
//! specially in buffer names, like `%` and `#`) are percent-encoded so the
//! name round-trips through the host's buffer-name storage. Params are kept
//! in sorted order so formatting is deterministic.

use crate::error::{GitbufError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Structured form of an addressable buffer name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bufname {
    pub scheme: String,
    pub expr: String,
    pub params: BTreeMap<String, String>,
    pub fragment: Option<String>,
}

impl Bufname {
    /// Render into the encoded string form.
    pub fn format(&self) -> String {
        let mut name = format!("{}://{}", self.scheme, encode(&self.expr));
        if !self.params.is_empty() {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|(key, value)| {
                    if value.is_empty() {
                        encode(key)
                    } else {
                        format!("{}={}", encode(key), encode(value))
                    }
                })
                .collect();
            name.push(';');
            name.push_str(&params.join("&"));
        }
        if let Some(fragment) = &self.fragment {
            name.push('#');
            name.push_str(&encode(fragment));
        }
        name
    }
}

impl fmt::Display for Bufname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Parse an encoded buffer name back into its structured form.
pub fn parse(name: &str) -> Result<Bufname> {
    let (scheme, rest) = name.split_once("://").ok_or_else(|| {
        GitbufError::Validation(format!("buffer name '{}' has no scheme", name))
    })?;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(GitbufError::Validation(format!(
            "buffer name '{}' has an invalid scheme",
            name
        )));
    }

    let (body, fragment) = match rest.split_once('#') {
        Some((body, fragment)) => (body, Some(decode(fragment)?)),
        None => (rest, None),
    };

    let (expr, params_str) = match body.split_once(';') {
        Some((expr, params)) => (expr, Some(params)),
        None => (body, None),
    };

    let mut params = BTreeMap::new();
    if let Some(params_str) = params_str {
        for pair in params_str.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (decode(key)?, decode(value)?),
                None => (decode(pair)?, String::new()),
            };
            params.insert(key, value);
        }
    }

    Ok(Bufname {
        scheme: scheme.to_string(),
        expr: decode(expr)?,
        params,
        fragment,
    })
}

/// Bytes safe to leave bare inside any component of a buffer name.
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~' | b'/' | b':' | b'@')
}

fn encode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for &byte in text.as_bytes() {
        if is_unreserved(byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn decode(text: &str) -> Result<String> {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).ok_or_else(|| {
                GitbufError::Validation(format!("truncated percent-escape in '{}'", text))
            })?;
            let hex = std::str::from_utf8(hex).map_err(|_| {
                GitbufError::Validation(format!("invalid percent-escape in '{}'", text))
            })?;
            let byte = u8::from_str_radix(hex, 16).map_err(|_| {
                GitbufError::Validation(format!("invalid percent-escape in '{}'", text))
            })?;
            decoded.push(byte);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded)
        .map_err(|_| GitbufError::Validation(format!("buffer name '{}' is not UTF-8", text)))
}
