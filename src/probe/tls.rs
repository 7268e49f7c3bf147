//! Host TLS probe.
//!
//! Blocking rustls client over a std `TcpStream`. Only the configured trust
//! anchor is accepted as a root; the system store is never consulted.
//!
//! A probe passes when the handshake completes, the payload is written and at
//! least one response byte arrives before the deadline.

use super::{ConnectivityProbe, ProbeRequest};
use log::{debug, info, warn};
use rustls::client::{ClientConfig, ClientConnection, ServerName};
use rustls::{RootCertStore, Stream};
use rustls_pemfile::certs;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Smallest socket timeout handed to the OS (zero is rejected).
const MIN_SOCKET_TIMEOUT: Duration = Duration::from_millis(1);

/// Read buffer size.
const READ_CHUNK: usize = 1024;

/// TLS connectivity probe for host builds.
#[derive(Debug, Default)]
pub struct TlsProbe;

impl TlsProbe {
    pub fn new() -> Self {
        Self
    }

    fn run(request: &ProbeRequest<'_>) -> Result<usize, ProbeError> {
        let deadline = Instant::now() + request.timeout();

        let roots = load_trust_anchor(request.trust_anchor)?;
        let config = ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(roots)
            .with_no_client_auth();
        let server_name = ServerName::try_from(request.host)
            .map_err(|_| ProbeError::InvalidHost(request.host.to_string()))?;

        let addr = request
            .address()
            .to_socket_addrs()
            .map_err(ProbeError::DnsResolution)?
            .next()
            .ok_or(ProbeError::NoAddresses)?;
        debug!("Resolved {} to {}", request.host, addr);

        let mut stream = TcpStream::connect_timeout(&addr, request.timeout())
            .map_err(ProbeError::Connection)?;
        stream.set_write_timeout(Some(remaining(deadline)))?;

        let mut conn = ClientConnection::new(Arc::new(config), server_name)?;
        let mut tls = Stream::new(&mut conn, &mut stream);

        tls.write_all(request.payload.as_bytes())?;
        tls.flush()?;

        let mut received = 0;
        let mut buf = [0u8; READ_CHUNK];
        while Instant::now() < deadline {
            tls.sock.set_read_timeout(Some(remaining(deadline)))?;
            match tls.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => received += n,
                // Servers often drop the socket without close_notify once done.
                Err(e) if received > 0 && is_end_of_response(&e) => break,
                Err(e) => return Err(ProbeError::Io(e)),
            }
        }

        if received == 0 {
            return Err(ProbeError::EmptyResponse);
        }
        Ok(received)
    }
}

impl ConnectivityProbe for TlsProbe {
    fn probe(&mut self, request: &ProbeRequest<'_>) -> bool {
        info!("Probing {} ({} s timeout)", request.address(), request.timeout_secs);
        match Self::run(request) {
            Ok(received) => {
                info!("Probe passed, {} bytes received", received);
                true
            }
            Err(e) => {
                warn!("Probe failed: {}", e);
                false
            }
        }
    }
}

/// Parse PEM certificates into a root store.
fn load_trust_anchor(pem: &[u8]) -> Result<RootCertStore, ProbeError> {
    let mut reader = pem;
    let raw = certs(&mut reader).map_err(|_| ProbeError::TrustAnchorUnreadable)?;
    if raw.is_empty() {
        return Err(ProbeError::TrustAnchorEmpty);
    }

    let mut store = RootCertStore::empty();
    let (added, skipped) = store.add_parsable_certificates(&raw);
    if added == 0 {
        return Err(ProbeError::TrustAnchorUnparsable);
    }
    if skipped > 0 {
        warn!("Skipped {} unparsable trust anchor certificates", skipped);
    }
    Ok(store)
}

fn remaining(deadline: Instant) -> Duration {
    deadline
        .saturating_duration_since(Instant::now())
        .max(MIN_SOCKET_TIMEOUT)
}

fn is_end_of_response(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Reasons a probe attempt failed. Only logged; the orchestrator sees `false`.
#[derive(Debug)]
enum ProbeError {
    TrustAnchorEmpty,
    TrustAnchorUnreadable,
    TrustAnchorUnparsable,
    InvalidHost(String),
    DnsResolution(io::Error),
    NoAddresses,
    Connection(io::Error),
    Tls(rustls::Error),
    Io(io::Error),
    EmptyResponse,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrustAnchorEmpty => write!(f, "trust anchor contains no certificates"),
            Self::TrustAnchorUnreadable => write!(f, "trust anchor is not valid PEM"),
            Self::TrustAnchorUnparsable => write!(f, "no parsable certificates in trust anchor"),
            Self::InvalidHost(host) => write!(f, "host `{}` is not a valid DNS name", host),
            Self::DnsResolution(e) => write!(f, "DNS resolution failed: {}", e),
            Self::NoAddresses => write!(f, "no addresses found for hostname"),
            Self::Connection(e) => write!(f, "connection failed: {}", e),
            Self::Tls(e) => write!(f, "TLS error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::EmptyResponse => write!(f, "no response before timeout"),
        }
    }
}

impl From<rustls::Error> for ProbeError {
    fn from(e: rustls::Error) -> Self {
        Self::Tls(e)
    }
}

impl From<io::Error> for ProbeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
