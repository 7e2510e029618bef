//! Connections owned by a single probe.
//!
//! A [`Link`] is acquired by [`dial`] and consumed by the exchange; dropping
//! it closes the socket. Deadlines are absolute: every send or receive uses
//! whatever time is left until the armed instant.

use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use tracing::debug;

use super::error::ProbeError;
use super::{MAX_TIMEOUT, Protocol};

/// One open connection to the probed target.
pub trait Link {
    fn arm_deadline(&mut self, deadline: Instant);
    /// Write the whole payload as one logical send.
    fn send(&mut self, payload: &[u8]) -> io::Result<()>;
    /// Exactly one read; returns the number of bytes placed in `buf`.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

#[derive(Debug)]
pub struct TcpLink {
    stream: TcpStream,
    deadline: Option<Instant>,
}

#[derive(Debug)]
pub struct UdpLink {
    socket: UdpSocket,
    deadline: Option<Instant>,
}

#[derive(Debug)]
pub enum Connection {
    Tcp(TcpLink),
    Udp(UdpLink),
}

/// Open a connection to `address` (`host:port`).
pub fn dial(address: &str, protocol: Protocol, timeout: Duration) -> Result<Connection, ProbeError> {
    match protocol {
        Protocol::Tcp => dial_tcp(address, timeout)
            .map(|stream| {
                Connection::Tcp(TcpLink {
                    stream,
                    deadline: None,
                })
            })
            .map_err(ProbeError::TcpConnect),
        Protocol::Udp => dial_udp(address).map(|socket| {
            Connection::Udp(UdpLink {
                socket,
                deadline: None,
            })
        }),
    }
}

fn dial_tcp(address: &str, timeout: Duration) -> io::Result<TcpStream> {
    let deadline = deadline_after(timeout);
    let mut last_err = None;
    for addr in address.to_socket_addrs()? {
        let budget = remaining(Some(deadline))?.unwrap_or(timeout);
        match TcpStream::connect_timeout(&addr, budget) {
            Ok(stream) => {
                debug!(%addr, "tcp connected");
                return Ok(stream);
            }
            Err(err) => {
                debug!(%addr, error = %err, "tcp connect attempt failed");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(no_endpoint))
}

fn dial_udp(address: &str) -> Result<UdpSocket, ProbeError> {
    let target = address
        .to_socket_addrs()
        .map_err(ProbeError::ResolveUdp)?
        .next()
        .ok_or_else(|| ProbeError::ResolveUdp(no_endpoint()))?;
    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local).map_err(ProbeError::UdpConnect)?;
    socket.connect(target).map_err(ProbeError::UdpConnect)?;
    debug!(peer = %target, "udp socket connected");
    Ok(socket)
}

fn no_endpoint() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "address resolved to no endpoints")
}

/// `now + timeout`, with the timeout capped at [`MAX_TIMEOUT`] so the
/// addition cannot overflow.
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout.min(MAX_TIMEOUT)).unwrap_or(now)
}

/// Time left until `deadline`; an expired deadline is a timeout error.
fn remaining(deadline: Option<Instant>) -> io::Result<Option<Duration>> {
    let Some(deadline) = deadline else {
        return Ok(None);
    };
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded"));
    }
    Ok(Some(left))
}

impl Link for TcpLink {
    fn arm_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.stream.set_write_timeout(remaining(self.deadline)?)?;
        self.stream.write_all(payload)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.set_read_timeout(remaining(self.deadline)?)?;
        self.stream.read(buf)
    }
}

impl Link for UdpLink {
    fn arm_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.socket.set_write_timeout(remaining(self.deadline)?)?;
        let sent = self.socket.send(payload)?;
        if sent != payload.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("datagram truncated: sent {sent} of {} bytes", payload.len()),
            ));
        }
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.set_read_timeout(remaining(self.deadline)?)?;
        self.socket.recv(buf)
    }
}

impl Link for Connection {
    fn arm_deadline(&mut self, deadline: Instant) {
        match self {
            Connection::Tcp(link) => link.arm_deadline(deadline),
            Connection::Udp(link) => link.arm_deadline(deadline),
        }
    }

    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        match self {
            Connection::Tcp(link) => link.send(payload),
            Connection::Udp(link) => link.send(payload),
        }
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Tcp(link) => link.recv(buf),
            Connection::Udp(link) => link.recv(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_without_deadline_is_unbounded() {
        assert_eq!(remaining(None).unwrap(), None);
    }

    #[test]
    fn expired_deadline_times_out() {
        let past = Instant::now() - Duration::from_millis(5);
        let err = remaining(Some(past)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn future_deadline_leaves_budget() {
        let left = remaining(Some(Instant::now() + Duration::from_secs(5)))
            .unwrap()
            .unwrap();
        assert!(left > Duration::from_secs(4));
    }

    #[test]
    fn huge_timeout_deadline_is_capped() {
        let before = Instant::now();
        let deadline = deadline_after(Duration::from_secs_f64(1e19));
        assert!(deadline > before);
        assert!(deadline <= Instant::now() + MAX_TIMEOUT);
    }

    #[test]
    fn unresolvable_udp_target_is_resolve_error() {
        let err = dial("not a target", Protocol::Udp, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProbeError::ResolveUdp(_)));
    }

    #[test]
    fn unresolvable_tcp_target_is_connect_error() {
        let err = dial("not a target", Protocol::Tcp, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProbeError::TcpConnect(_)));
    }
}
