//! Connectivity probe target.

use super::ConfigError;

/// Default probe host.
pub const DEFAULT_PROBE_HOST: &str = "worldtimeapi.org";

/// Default request path on the probe host.
pub const DEFAULT_PROBE_PATH: &str = "/api/ip";

/// HTTPS port.
pub const DEFAULT_PROBE_PORT: u16 = 443;

/// Probe timeout in seconds.
pub const PROBE_TIMEOUT_SECS: u32 = 15;

/// Where and how the end-to-end probe connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    host: String,
    port: u16,
    payload: String,
    timeout_secs: u32,
    trust_anchor: Vec<u8>,
}

impl ProbeConfig {
    /// Probe that sends a plain `GET path` request to `host` over TLS.
    pub fn http_get(
        host: impl Into<String>,
        path: &str,
        trust_anchor: impl Into<Vec<u8>>,
    ) -> Result<Self, ConfigError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ConfigError::ProbeHostEmpty);
        }
        if !path.starts_with('/') || path.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidProbePath(path.to_string()));
        }

        let payload = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, host
        );

        Ok(Self {
            host,
            port: DEFAULT_PROBE_PORT,
            payload,
            timeout_secs: PROBE_TIMEOUT_SECS,
            trust_anchor: trust_anchor.into(),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Raw request written once the TLS session is up.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }

    /// PEM encoded certificates accepted as TLS roots.
    pub fn trust_anchor(&self) -> &[u8] {
        &self.trust_anchor
    }
}
