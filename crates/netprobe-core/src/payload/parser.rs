use super::error::DecodeError;
use super::layout;
use super::reader::read_hex_byte;

/// Decode `0x68, 0x65,0X6c` style input. Empty tokens are skipped.
pub fn parse_comma_hex(input: &str) -> Result<Vec<u8>, DecodeError> {
    let mut bytes = Vec::new();
    for token in input.split(layout::COMMA_SEPARATOR) {
        let mut token = token.trim();
        for prefix in layout::COMMA_PREFIXES {
            token = token.strip_prefix(prefix).unwrap_or(token);
        }
        if token.is_empty() {
            continue;
        }
        bytes.push(read_hex_byte(token)?);
    }
    Ok(bytes)
}

/// Decode `\x68\x65` style input.
///
/// Spaces are ignored. Each segment after a `\x` marker contributes its
/// first two characters; anything after those is dropped.
pub fn parse_slash_hex(input: &str) -> Result<Vec<u8>, DecodeError> {
    let compact = input.replace(' ', "");
    if compact.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = compact.split(layout::SLASH_MARKER);
    if segments.next() != Some("") {
        return Err(DecodeError::InvalidFormat);
    }

    let mut bytes = Vec::new();
    for segment in segments {
        if segment.len() < layout::SLASH_DIGITS {
            return Err(DecodeError::InvalidLength);
        }
        let digits = segment
            .get(..layout::SLASH_DIGITS)
            .ok_or_else(|| DecodeError::ParseHex {
                token: segment.chars().take(layout::SLASH_DIGITS).collect(),
            })?;
        bytes.push(read_hex_byte(digits)?);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_hex_with_prefixes_and_case() {
        let bytes = parse_comma_hex("0x68, 0X65,6C ,0x6c,6f").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn comma_hex_skips_empty_tokens() {
        let bytes = parse_comma_hex("0x68,0x65,,0x6c,").unwrap();
        assert_eq!(bytes, vec![0x68, 0x65, 0x6c]);
    }

    #[test]
    fn comma_hex_bare_prefix_is_skipped() {
        assert_eq!(parse_comma_hex("0x, 0x41").unwrap(), vec![0x41]);
    }

    #[test]
    fn comma_hex_rejects_invalid_token() {
        let err = parse_comma_hex("0x41,zz").unwrap_err();
        assert_eq!(
            err,
            DecodeError::ParseHex {
                token: "zz".to_string()
            }
        );
    }

    #[test]
    fn comma_hex_rejects_wide_value() {
        let err = parse_comma_hex("0x1ff").unwrap_err();
        assert_eq!(
            err,
            DecodeError::ParseHex {
                token: "1ff".to_string()
            }
        );
    }

    #[test]
    fn slash_hex_hello() {
        let bytes = parse_slash_hex("\\x68\\x65\\x6c\\x6c\\x6f").unwrap();
        assert_eq!(bytes, vec![0x68, 0x65, 0x6c, 0x6c, 0x6f]);
    }

    #[test]
    fn slash_hex_ignores_spaces() {
        let bytes = parse_slash_hex(" \\x41 \\x4 2 ").unwrap();
        assert_eq!(bytes, vec![0x41, 0x42]);
    }

    #[test]
    fn slash_hex_only_spaces_is_empty() {
        assert!(parse_slash_hex("   ").unwrap().is_empty());
    }

    #[test]
    fn slash_hex_requires_leading_marker() {
        assert_eq!(
            parse_slash_hex("68,65,6c").unwrap_err(),
            DecodeError::InvalidFormat
        );
    }

    #[test]
    fn slash_hex_short_segment() {
        assert_eq!(
            parse_slash_hex("\\x41\\x4").unwrap_err(),
            DecodeError::InvalidLength
        );
        assert_eq!(parse_slash_hex("\\x").unwrap_err(), DecodeError::InvalidLength);
    }

    #[test]
    fn slash_hex_extra_characters_are_dropped() {
        assert_eq!(parse_slash_hex("\\x41zz\\x42").unwrap(), vec![0x41, 0x42]);
    }

    #[test]
    fn slash_hex_bad_digits() {
        assert_eq!(
            parse_slash_hex("\\xg1").unwrap_err(),
            DecodeError::ParseHex {
                token: "g1".to_string()
            }
        );
    }

    #[test]
    fn slash_hex_multibyte_segment_is_parse_error() {
        let err = parse_slash_hex("\\xé1").unwrap_err();
        assert!(matches!(err, DecodeError::ParseHex { .. }));
    }
}
