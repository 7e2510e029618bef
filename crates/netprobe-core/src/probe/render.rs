//! Renderings of the bytes received from the target.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

static LOCAL_OFFSET: OnceLock<Option<UtcOffset>> = OnceLock::new();

/// The same byte sequence rendered four ways.
///
/// # Examples
/// ```
/// use netprobe_core::Rendering;
///
/// let rendering = Rendering::of(&[0x41, 0x42]);
/// assert_eq!(rendering.hex_go, "[0x41, 0x42]");
/// assert_eq!(rendering.hex_slash, "\\x41\\x42");
/// assert_eq!(rendering.decimal, vec![65, 66]);
/// assert_eq!(rendering.string, "AB");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendering {
    /// Bracketed, comma-separated `0x` bytes.
    pub hex_go: String,
    /// Concatenated `\x` bytes.
    pub hex_slash: String,
    /// One integer per byte.
    pub decimal: Vec<u8>,
    /// Bytes as text; invalid UTF-8 becomes U+FFFD.
    pub string: String,
}

impl Rendering {
    pub fn of(bytes: &[u8]) -> Self {
        Self {
            hex_go: hex_list(bytes),
            hex_slash: hex_slash(bytes),
            decimal: bytes.to_vec(),
            string: String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

pub fn hex_list(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(|b| format!("0x{b:02x}")).collect();
    format!("[{}]", items.join(", "))
}

pub fn hex_slash(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for b in bytes {
        out.push_str(&format!("\\x{b:02x}"));
    }
    out
}

/// Determine the local UTC offset once and cache it for
/// [`completion_timestamp`].
///
/// On Unix the offset can only be read while the process is single-threaded,
/// so binaries should call this first thing in `main`. Later calls return the
/// cached value.
pub fn capture_local_offset() -> Option<UtcOffset> {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().ok())
}

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS`.
///
/// Uses the offset cached by [`capture_local_offset`], capturing it on first
/// use. When the offset could not be determined (for instance because the
/// first capture happened on a multithreaded Unix process) the time is
/// rendered in UTC.
pub fn completion_timestamp() -> String {
    let offset = capture_local_offset().unwrap_or(UtcOffset::UTC);
    format_timestamp(OffsetDateTime::now_utc().to_offset(offset))
}

fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use time::macros::{datetime, offset};

    use super::*;
    use crate::payload::{DataFormat, decode};

    #[test]
    fn empty_bytes_render_empty() {
        let rendering = Rendering::of(&[]);
        assert_eq!(rendering.hex_go, "[]");
        assert_eq!(rendering.hex_slash, "");
        assert!(rendering.decimal.is_empty());
        assert_eq!(rendering.string, "");
    }

    #[test]
    fn hex_list_is_lowercase_and_padded() {
        assert_eq!(hex_list(&[0x0a, 0xff]), "[0x0a, 0xff]");
    }

    #[test]
    fn hex_list_round_trips_through_comma_decoder() {
        let bytes = decode("0X0A,ff, 0x7f", DataFormat::HexComma).unwrap();
        let list = hex_list(&bytes);
        let inner = list.trim_start_matches('[').trim_end_matches(']');
        assert_eq!(decode(inner, DataFormat::HexComma).unwrap(), bytes);
    }

    #[test]
    fn hex_slash_round_trips_through_slash_decoder() {
        let bytes = vec![0x00, 0x5c, 0x78, 0xfe];
        assert_eq!(decode(&hex_slash(&bytes), DataFormat::HexSlash).unwrap(), bytes);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(Rendering::of(&[0x41, 0xff]).string, "A\u{fffd}");
    }

    #[test]
    fn hex_slash_pads_every_byte() {
        assert_eq!(hex_slash(&[0x00, 0x0f, 0xab]), "\\x00\\x0f\\xab");
    }

    #[test]
    fn timestamp_uses_given_offset() {
        let at = datetime!(2024-03-09 23:30:05 UTC).to_offset(offset!(+8));
        assert_eq!(format_timestamp(at), "2024-03-10 07:30:05");
    }

    #[test]
    fn local_offset_is_captured_once() {
        let first = capture_local_offset();
        assert_eq!(capture_local_offset(), first);
        assert_eq!(LOCAL_OFFSET.get().copied().flatten(), first);
    }

    #[test]
    fn timestamp_shape() {
        let ts = completion_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert_eq!(&ts[13..14], ":");
    }
}
