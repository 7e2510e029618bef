use super::error::DecodeError;

/// Parse one hex token into a byte.
///
/// Only ASCII hex digits are accepted, so sign characters that
/// `u8::from_str_radix` would tolerate are rejected here.
pub fn read_hex_byte(token: &str) -> Result<u8, DecodeError> {
    let invalid = || DecodeError::ParseHex {
        token: token.to_string(),
    };
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u8::from_str_radix(token, 16).map_err(|_| invalid())
}
