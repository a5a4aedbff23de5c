// Licensed under the Apache-2.0 license

//! Numeric values as they appear in input documents.
//!
//! Addresses and offsets are usually written as hex strings (`"0x4000_0000"`)
//! while bit positions are plain JSON integers. [`Value`] accepts either form
//! and [`Value::as_u64`] resolves it once, at load time.

use serde::Deserialize;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    U64(u64),
    I64(i64),
    String(String),
}

impl Value {
    pub fn as_u64(&self) -> Result<u64, String> {
        match self {
            Value::U64(v) => Ok(*v),
            Value::I64(v) => Err(format!("negative value {v} is not allowed")),
            Value::String(s) => parse_u64(s),
        }
    }

    /// Resolve to a `u32`, for bit positions and widths.
    pub fn as_u32(&self) -> Result<u32, String> {
        let v = self.as_u64()?;
        u32::try_from(v).map_err(|_| format!("value {v} does not fit in 32 bits"))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U64(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Parse hexadecimal (`0x` prefix) or decimal text. Underscore digit
/// separators are allowed in either form.
pub fn parse_u64(text: &str) -> Result<u64, String> {
    let trimmed = text.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() || digits.starts_with('_') {
        return Err(format!("{text:?} is not a number"));
    }
    u64::from_str_radix(&cleaned, radix).map_err(|e| format!("{text:?} is not a number: {e}"))
}
