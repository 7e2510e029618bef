use thiserror::Error;

use crate::locale::{MessageKey, Translate};

/// Errors returned by payload decoding.
///
/// # Examples
/// ```
/// use netprobe_core::{DataFormat, DecodeError, decode};
///
/// let err = decode("zz", DataFormat::HexComma).unwrap_err();
/// assert_eq!(err, DecodeError::ParseHex { token: "zz".to_string() });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid hex byte \"{token}\"")]
    ParseHex { token: String },
    #[error("slash-hex input must start with \\x")]
    InvalidFormat,
    #[error("slash-hex byte needs 2 hex characters")]
    InvalidLength,
}

impl DecodeError {
    pub fn key(&self) -> MessageKey {
        match self {
            DecodeError::ParseHex { .. } => MessageKey::ParseHexFailed,
            DecodeError::InvalidFormat => MessageKey::InvalidSlashHexFormat,
            DecodeError::InvalidLength => MessageKey::InvalidSlashHexLength,
        }
    }

    /// Localized detail, without the `parseDataFailed` prefix.
    pub fn localize<T: Translate + ?Sized>(&self, tr: &T) -> String {
        match self {
            DecodeError::ParseHex { token } => {
                format!("{}: \"{}\"", tr.message(self.key()), token)
            }
            DecodeError::InvalidFormat | DecodeError::InvalidLength => tr.message(self.key()),
        }
    }
}
