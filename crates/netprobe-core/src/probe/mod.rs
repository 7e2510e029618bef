//! Probe engine: connect, optionally send, read once, release.
//!
//! A probe is a linear sequence with no retries:
//! 1. dial the target (TCP connect with timeout, or UDP resolve + connect)
//! 2. arm an absolute deadline of `now + timeout`
//! 3. send the payload when it is non-empty
//! 4. issue exactly one read into a fixed-size buffer
//! 5. drop the connection
//!
//! For UDP a read that times out means "no reply" and yields a successful,
//! empty response. On TCP a timeout or an orderly close before any byte
//! arrives is a read failure, as is every other read error on both protocols.

pub mod error;
pub mod link;
pub mod render;

use std::fmt;
use std::io;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::ProbeError;
pub use link::{Connection, Link, deadline_after, dial};
pub use render::Rendering;

/// Connect timeout and read/write deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);
/// Upper bound applied to any timeout when computing deadlines.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
/// Size of the single receive buffer.
pub const RECEIVE_BUFFER_SIZE: usize = 4096;

/// Transport used by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub const fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ProbeError;

    /// Case-insensitive `tcp` / `udp`; an empty name selects TCP.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            _ => Err(ProbeError::UnsupportedProtocol(s.to_string())),
        }
    }
}

/// Timeout and buffer policy applied to one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    pub timeout: Duration,
    pub receive_buffer: usize,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            receive_buffer: RECEIVE_BUFFER_SIZE,
        }
    }
}

impl ProbePolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Bytes read from the target plus the time the probe completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub bytes: Vec<u8>,
    pub time: String,
}

impl Response {
    pub fn rendering(&self) -> Rendering {
        Rendering::of(&self.bytes)
    }
}

/// Probe `address` with the default policy.
pub fn probe(address: &str, payload: &[u8], protocol: Protocol) -> Result<Response, ProbeError> {
    probe_with_policy(address, payload, protocol, &ProbePolicy::default())
}

pub fn probe_with_policy(
    address: &str,
    payload: &[u8],
    protocol: Protocol,
    policy: &ProbePolicy,
) -> Result<Response, ProbeError> {
    debug!(address, %protocol, payload_len = payload.len(), "probe start");
    let conn = dial(address, protocol, policy.timeout)?;
    let bytes = exchange(conn, protocol, payload, policy)?;
    debug!(address, %protocol, received = bytes.len(), "probe complete");
    Ok(Response {
        bytes,
        time: render::completion_timestamp(),
    })
}

/// Run the send/receive half of a probe over an already open link.
///
/// The link is consumed and dropped before this returns, whatever the
/// outcome.
pub fn exchange<L: Link>(
    mut link: L,
    protocol: Protocol,
    payload: &[u8],
    policy: &ProbePolicy,
) -> Result<Vec<u8>, ProbeError> {
    link.arm_deadline(deadline_after(policy.timeout));

    if !payload.is_empty() {
        link.send(payload).map_err(ProbeError::SendData)?;
        debug!(sent = payload.len(), "payload sent");
    }

    let mut buf = vec![0u8; policy.receive_buffer];
    let n = match link.recv(&mut buf) {
        Ok(0) if protocol == Protocol::Tcp && !buf.is_empty() => {
            return Err(ProbeError::ReadData(io::Error::from(
                io::ErrorKind::UnexpectedEof,
            )));
        }
        Ok(n) => n,
        Err(err) if protocol == Protocol::Udp && is_no_reply(&err) => {
            debug!(error = %err, "no udp reply before deadline");
            0
        }
        Err(err) => return Err(ProbeError::ReadData(err)),
    };
    buf.truncate(n);
    Ok(buf)
}

/// Read errors that only mean the peer stayed silent.
fn is_no_reply(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::UnexpectedEof
    )
}
