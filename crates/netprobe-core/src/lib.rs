//! NetProbe core library: one-shot TCP/UDP connectivity probes.
//!
//! A probe decodes a textual payload into bytes (`payload`), opens a
//! connection to the target, sends the bytes, reads a single reply and
//! renders it (`probe`). Failures are categorized by a localization key and
//! turned into text only at the invocation surface ([`connect_probe`]) via
//! a [`Translate`] implementation such as the built-in [`Catalog`].
//!
//! Invariants:
//! - Every probe owns exactly one connection, released before it returns.
//! - No retries; connect, send and receive are bounded by one timeout.
//! - A silent UDP peer is a success with zero bytes, not an error.
//!
//! # Examples
//! ```no_run
//! use netprobe_core::{Catalog, ProbeRequest, connect_probe};
//!
//! let catalog = Catalog::with_language("en-US");
//! let request = ProbeRequest {
//!     host: "127.0.0.1".to_string(),
//!     port: "7".to_string(),
//!     payload: "0x68,0x69".to_string(),
//!     protocol: "tcp".to_string(),
//!     data_format: "hex_comma".to_string(),
//! };
//! let result = connect_probe(&request, &catalog);
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod locale;
pub mod payload;
pub mod probe;

pub use locale::{Catalog, DEFAULT_LOCALE, LanguageSettings, MessageKey, Translate};
pub use payload::{DataFormat, DecodeError, decode};
pub use probe::{
    MAX_TIMEOUT, ProbeError, ProbePolicy, Protocol, Rendering, Response, probe,
    probe_with_policy,
};

/// A probe request as typed by the user: every field is plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    pub host: String,
    pub port: String,
    /// Payload text, interpreted according to `data_format`.
    #[serde(default)]
    pub payload: String,
    /// `tcp` or `udp` (case-insensitive); empty selects TCP.
    #[serde(default)]
    pub protocol: String,
    /// `hex_comma`, `hex_slash` or `raw_string`; anything else is `hex_comma`.
    #[serde(default)]
    pub data_format: String,
}

impl ProbeRequest {
    /// `host:port`, bracketing bare IPv6 literals.
    pub fn target(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Outcome of one probe, serialized as a flat JSON record.
///
/// # Examples
/// ```
/// use netprobe_core::ProbeResult;
///
/// let result = ProbeResult::failure("TCP connection failed: refused");
/// let value = serde_json::to_value(&result).unwrap();
/// assert_eq!(value["success"], false);
/// assert_eq!(value["length"], 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub success: bool,
    /// Localized, category-prefixed message; empty on success.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Completion time, `YYYY-MM-DD HH:MM:SS`.
    pub time: String,
    /// Bytes received by the single read.
    pub length: usize,
    #[serde(flatten)]
    pub response: Rendering,
}

impl ProbeResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
            ..Self::default()
        }
    }

    pub fn from_response(response: &Response) -> Self {
        Self {
            success: true,
            error: String::new(),
            time: response.time.clone(),
            length: response.bytes.len(),
            response: response.rendering(),
        }
    }
}

/// Any failure a probe request can end in.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Probe(#[from] ProbeError),
}

impl RequestError {
    pub fn key(&self) -> MessageKey {
        match self {
            RequestError::Decode(_) => MessageKey::ParseDataFailed,
            RequestError::Probe(err) => err.key(),
        }
    }

    pub fn localize<T: Translate + ?Sized>(&self, tr: &T) -> String {
        match self {
            RequestError::Decode(err) => {
                format!("{}: {}", tr.message(MessageKey::ParseDataFailed), err.localize(tr))
            }
            RequestError::Probe(err) => err.localize(tr),
        }
    }
}

/// Decode, probe and render a request with the default policy.
///
/// Never fails: every error becomes a `success == false` result whose
/// message is resolved through `tr`.
pub fn connect_probe<T: Translate + ?Sized>(request: &ProbeRequest, tr: &T) -> ProbeResult {
    connect_probe_with_policy(request, tr, &ProbePolicy::default())
}

pub fn connect_probe_with_policy<T: Translate + ?Sized>(
    request: &ProbeRequest,
    tr: &T,
    policy: &ProbePolicy,
) -> ProbeResult {
    match run_request(request, policy) {
        Ok(response) => ProbeResult::from_response(&response),
        Err(err) => {
            tracing::debug!(addr = %request.target(), error = %err, "probe failed");
            ProbeResult::failure(err.localize(tr))
        }
    }
}

fn run_request(request: &ProbeRequest, policy: &ProbePolicy) -> Result<Response, RequestError> {
    let format = DataFormat::from_tag(&request.data_format);
    let payload = decode(&request.payload, format)?;
    let protocol: Protocol = request.protocol.parse()?;
    Ok(probe_with_policy(&request.target(), &payload, protocol, policy)?)
}
