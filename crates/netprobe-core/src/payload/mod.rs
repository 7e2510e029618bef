//! Payload decoding.
//!
//! Turns the text a user typed into the bytes sent to the target. Three
//! conventions are supported, selected by [`DataFormat`]:
//! - `hex_comma`: `0x68,0x65` (prefix optional, empty tokens skipped)
//! - `hex_slash`: `\x68\x65` (exactly two digits per marker)
//! - `raw_string`: the UTF-8 bytes of the text itself
//!
//! Decoding is pure; it knows nothing about the network or about message
//! catalogs. Errors carry a category key and are localized by the caller.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::DecodeError;

/// Textual convention of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    #[default]
    HexComma,
    HexSlash,
    RawString,
}

impl DataFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            DataFormat::HexComma => layout::FORMAT_HEX_COMMA,
            DataFormat::HexSlash => layout::FORMAT_HEX_SLASH,
            DataFormat::RawString => layout::FORMAT_RAW_STRING,
        }
    }

    /// Map a format tag, falling back to [`DataFormat::HexComma`] for
    /// anything unrecognized.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            layout::FORMAT_HEX_COMMA => Ok(DataFormat::HexComma),
            layout::FORMAT_HEX_SLASH => Ok(DataFormat::HexSlash),
            layout::FORMAT_RAW_STRING => Ok(DataFormat::RawString),
            other => Err(format!("unknown data format '{other}'")),
        }
    }
}

/// Decode `input` according to `format`.
///
/// # Examples
/// ```
/// use netprobe_core::{DataFormat, decode};
///
/// assert_eq!(decode("0x41,0x42", DataFormat::HexComma).unwrap(), b"AB");
/// assert_eq!(decode("\\x41\\x42", DataFormat::HexSlash).unwrap(), b"AB");
/// assert_eq!(decode("AB", DataFormat::RawString).unwrap(), b"AB");
/// assert!(decode("", DataFormat::HexSlash).unwrap().is_empty());
/// ```
pub fn decode(input: &str, format: DataFormat) -> Result<Vec<u8>, DecodeError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    match format {
        DataFormat::HexComma => parser::parse_comma_hex(input),
        DataFormat::HexSlash => parser::parse_slash_hex(input),
        DataFormat::RawString => Ok(input.as_bytes().to_vec()),
    }
}
