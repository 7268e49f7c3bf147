//! End-to-end connectivity probe.
//!
//! The probe is the last gate of bring-up: a secured request to a known host.
//! The orchestrator only sees pass or fail; transport, handshake and timeout
//! handling all live behind [`ConnectivityProbe`].
//!
//! # Platform Support
//!
//! | Platform | Implementation | Notes |
//! |----------|----------------|-------|
//! | Host | [`TlsProbe`] | rustls over std sockets |
//! | ESP32 | `EspTlsProbe` | esp-tls, requires WiFi associated first |

#[cfg(not(target_os = "espidf"))]
mod tls;

#[cfg(feature = "esp32")]
mod esp_tls;

#[cfg(not(target_os = "espidf"))]
pub use tls::TlsProbe;

#[cfg(feature = "esp32")]
pub use esp_tls::EspTlsProbe;

use crate::config::ProbeConfig;
use std::time::Duration;

/// One probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRequest<'a> {
    /// PEM certificates accepted as TLS roots.
    pub trust_anchor: &'a [u8],
    pub host: &'a str,
    pub port: u16,
    /// Raw bytes written after the handshake.
    pub payload: &'a str,
    pub timeout_secs: u32,
}

impl<'a> ProbeRequest<'a> {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_secs))
    }

    /// `host:port` for socket resolution.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl<'a> From<&'a ProbeConfig> for ProbeRequest<'a> {
    fn from(config: &'a ProbeConfig) -> Self {
        Self {
            trust_anchor: config.trust_anchor(),
            host: config.host(),
            port: config.port(),
            payload: config.payload(),
            timeout_secs: config.timeout_secs(),
        }
    }
}

/// Black-box pass/fail connectivity check.
pub trait ConnectivityProbe {
    /// Run one probe. Blocks for at most the request timeout.
    fn probe(&mut self, request: &ProbeRequest<'_>) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_config() {
        let config = ProbeConfig::http_get("example.com", "/ping", b"pem".to_vec())
            .unwrap()
            .with_timeout_secs(7);
        let request = ProbeRequest::from(&config);

        assert_eq!(request.host, "example.com");
        assert_eq!(request.address(), "example.com:443");
        assert_eq!(request.trust_anchor, b"pem");
        assert_eq!(request.timeout(), Duration::from_secs(7));
        assert!(request.payload.starts_with("GET /ping HTTP/1.1\r\n"));
    }
}
