pub const COMMA_SEPARATOR: char = ',';
pub const COMMA_PREFIXES: [&str; 2] = ["0x", "0X"];

pub const SLASH_MARKER: &str = "\\x";
pub const SLASH_DIGITS: usize = 2;

pub const FORMAT_HEX_COMMA: &str = "hex_comma";
pub const FORMAT_HEX_SLASH: &str = "hex_slash";
pub const FORMAT_RAW_STRING: &str = "raw_string";
