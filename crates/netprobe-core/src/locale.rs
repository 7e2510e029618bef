//! Message catalogs for user-facing error categories.
//!
//! Errors produced by the decoder and the probe engine carry a
//! [`MessageKey`] instead of text. The invocation surface resolves keys
//! through a [`Translate`] implementation; [`Catalog`] is the built-in one,
//! holding the `zh-CN` and `en-US` tables and the active locale behind a
//! read/write lock.
//!
//! Lookup order: active locale, then [`DEFAULT_LOCALE`], then the raw key.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Locale used when none is selected and as the lookup fallback.
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// Localization keys for every failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    ParseDataFailed,
    ParseHexFailed,
    InvalidSlashHexFormat,
    InvalidSlashHexLength,
    TcpConnectionFailed,
    ResolveUdpFailed,
    UdpConnectionFailed,
    UnsupportedProtocol,
    SendDataFailed,
    ReadDataFailed,
}

impl MessageKey {
    pub const ALL: [MessageKey; 10] = [
        MessageKey::ParseDataFailed,
        MessageKey::ParseHexFailed,
        MessageKey::InvalidSlashHexFormat,
        MessageKey::InvalidSlashHexLength,
        MessageKey::TcpConnectionFailed,
        MessageKey::ResolveUdpFailed,
        MessageKey::UdpConnectionFailed,
        MessageKey::UnsupportedProtocol,
        MessageKey::SendDataFailed,
        MessageKey::ReadDataFailed,
    ];

    /// Dotted catalog identifier, e.g. `errors.parseHexFailed`.
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKey::ParseDataFailed => "errors.parseDataFailed",
            MessageKey::ParseHexFailed => "errors.parseHexFailed",
            MessageKey::InvalidSlashHexFormat => "errors.invalidSlashHexFormat",
            MessageKey::InvalidSlashHexLength => "errors.invalidSlashHexLength",
            MessageKey::TcpConnectionFailed => "errors.tcpConnectionFailed",
            MessageKey::ResolveUdpFailed => "errors.resolveUdpFailed",
            MessageKey::UdpConnectionFailed => "errors.udpConnectionFailed",
            MessageKey::UnsupportedProtocol => "errors.unsupportedProtocol",
            MessageKey::SendDataFailed => "errors.sendDataFailed",
            MessageKey::ReadDataFailed => "errors.readDataFailed",
        }
    }
}

/// Key to text lookup used when rendering errors.
pub trait Translate {
    fn translate(&self, key: &str) -> String;

    fn message(&self, key: MessageKey) -> String {
        self.translate(key.as_str())
    }
}

/// Active language as exposed to callers.
///
/// # Examples
/// ```
/// use netprobe_core::Catalog;
///
/// let catalog = Catalog::new();
/// let settings = catalog.set_language("en-US");
/// assert_eq!(settings.current_language, "en-US");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSettings {
    pub current_language: String,
}

#[derive(Debug)]
struct CatalogState {
    current: String,
    tables: HashMap<String, HashMap<&'static str, String>>,
}

/// Built-in message catalogs plus the active locale.
#[derive(Debug)]
pub struct Catalog {
    state: RwLock<CatalogState>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Catalog loaded with the built-in tables, active locale [`DEFAULT_LOCALE`].
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert("zh-CN".to_string(), builtin_table(ZH_CN));
        tables.insert("en-US".to_string(), builtin_table(EN_US));
        Self {
            state: RwLock::new(CatalogState {
                current: DEFAULT_LOCALE.to_string(),
                tables,
            }),
        }
    }

    /// Catalog with the given locale already active.
    pub fn with_language(lang: &str) -> Self {
        let catalog = Self::new();
        catalog.set_language(lang);
        catalog
    }

    pub fn language_settings(&self) -> LanguageSettings {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        LanguageSettings {
            current_language: state.current.clone(),
        }
    }

    /// Switch the active locale. Any identifier is accepted; unknown ones
    /// simply resolve through the fallback chain.
    pub fn set_language(&self, lang: &str) -> LanguageSettings {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.current = lang.to_string();
        tracing::debug!(lang, "active locale changed");
        LanguageSettings {
            current_language: lang.to_string(),
        }
    }

    /// Identifiers of every loaded locale, sorted.
    pub fn languages(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut langs: Vec<String> = state.tables.keys().cloned().collect();
        langs.sort();
        langs
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str) -> String {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let lookup = |lang: &str| {
            state
                .tables
                .get(lang)
                .and_then(|table| table.get(key))
                .cloned()
        };
        lookup(&state.current)
            .or_else(|| lookup(DEFAULT_LOCALE))
            .unwrap_or_else(|| key.to_string())
    }
}

fn builtin_table(entries: &[(MessageKey, &str)]) -> HashMap<&'static str, String> {
    entries
        .iter()
        .map(|(key, text)| (key.as_str(), (*text).to_string()))
        .collect()
}

const ZH_CN: &[(MessageKey, &str)] = &[
    (MessageKey::ParseDataFailed, "解析数据失败"),
    (MessageKey::ParseHexFailed, "解析十六进制失败"),
    (
        MessageKey::InvalidSlashHexFormat,
        "无效的\\x格式十六进制字符串，应以\\x开头",
    ),
    (
        MessageKey::InvalidSlashHexLength,
        "无效的\\x格式十六进制字符串，每个字节应有2个十六进制字符",
    ),
    (MessageKey::TcpConnectionFailed, "TCP连接失败"),
    (MessageKey::ResolveUdpFailed, "解析UDP地址失败"),
    (MessageKey::UdpConnectionFailed, "UDP连接失败"),
    (MessageKey::UnsupportedProtocol, "不支持的协议"),
    (MessageKey::SendDataFailed, "发送数据失败"),
    (MessageKey::ReadDataFailed, "读取数据失败"),
];

const EN_US: &[(MessageKey, &str)] = &[
    (MessageKey::ParseDataFailed, "Failed to parse data"),
    (MessageKey::ParseHexFailed, "Failed to parse hex value"),
    (
        MessageKey::InvalidSlashHexFormat,
        "Invalid \\x format hex string, should start with \\x",
    ),
    (
        MessageKey::InvalidSlashHexLength,
        "Invalid \\x format hex string, each byte should have 2 hex characters",
    ),
    (MessageKey::TcpConnectionFailed, "TCP connection failed"),
    (MessageKey::ResolveUdpFailed, "Failed to resolve UDP address"),
    (MessageKey::UdpConnectionFailed, "UDP connection failed"),
    (MessageKey::UnsupportedProtocol, "Unsupported protocol"),
    (MessageKey::SendDataFailed, "Failed to send data"),
    (MessageKey::ReadDataFailed, "Failed to read data"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locale_is_active() {
        let catalog = Catalog::new();
        assert_eq!(catalog.language_settings().current_language, DEFAULT_LOCALE);
        assert_eq!(catalog.message(MessageKey::TcpConnectionFailed), "TCP连接失败");
    }

    #[test]
    fn active_locale_wins() {
        let catalog = Catalog::with_language("en-US");
        assert_eq!(
            catalog.message(MessageKey::ReadDataFailed),
            "Failed to read data"
        );
    }

    #[test]
    fn unknown_locale_falls_back_to_default() {
        let catalog = Catalog::with_language("fr-FR");
        assert_eq!(catalog.message(MessageKey::SendDataFailed), "发送数据失败");
        assert_eq!(catalog.language_settings().current_language, "fr-FR");
    }

    #[test]
    fn unknown_key_returns_raw_key() {
        let catalog = Catalog::with_language("en-US");
        assert_eq!(catalog.translate("errors.nope"), "errors.nope");
    }

    #[test]
    fn every_key_is_translated_in_both_tables() {
        let catalog = Catalog::new();
        for lang in catalog.languages() {
            catalog.set_language(&lang);
            for key in MessageKey::ALL {
                assert_ne!(catalog.message(key), key.as_str(), "{lang} lacks {key:?}");
            }
        }
    }

    #[test]
    fn language_settings_json_shape() {
        let settings = LanguageSettings {
            current_language: "en-US".to_string(),
        };
        let value = serde_json::to_value(&settings).expect("settings json");
        assert_eq!(value["currentLanguage"], "en-US");
    }
}
