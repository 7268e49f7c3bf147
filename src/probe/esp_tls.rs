//! ESP32 TLS probe using esp-tls.
//!
//! Requires WiFi to be associated first (caller's responsibility).

use super::{ConnectivityProbe, ProbeRequest};
use esp_idf_svc::tls::{Config, EspTls, X509};
use esp_idf_sys::EspError;
use log::{info, warn};

/// Read buffer size.
const READ_CHUNK: usize = 512;

/// TLS connectivity probe for ESP32.
#[derive(Debug, Default)]
pub struct EspTlsProbe;

impl EspTlsProbe {
    pub fn new() -> Self {
        Self
    }

    fn run(request: &ProbeRequest<'_>) -> Result<usize, EspError> {
        // esp-tls wants the PEM NUL-terminated.
        let mut pem = request.trust_anchor.to_vec();
        pem.push(0);

        let mut config = Config::new();
        config.ca_cert = Some(X509::pem_until_nul(&pem));
        config.common_name = Some(request.host);
        config.timeout_ms = request.timeout_secs.saturating_mul(1000);

        let mut tls = EspTls::new()?;
        tls.connect(request.host, request.port, &config)?;
        tls.write_all(request.payload.as_bytes())?;

        let mut buf = [0u8; READ_CHUNK];
        let mut received = 0;
        loop {
            match tls.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => received += n,
                Err(e) if received > 0 => {
                    warn!("Probe read ended with {:?} after {} bytes", e, received);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(received)
    }
}

impl ConnectivityProbe for EspTlsProbe {
    fn probe(&mut self, request: &ProbeRequest<'_>) -> bool {
        if request.trust_anchor.is_empty() {
            warn!("Probe failed: no trust anchor configured");
            return false;
        }
        info!("Probing {} ({} s timeout)", request.address(), request.timeout_secs);
        match Self::run(request) {
            Ok(0) => {
                warn!("Probe failed: no response before timeout");
                false
            }
            Ok(received) => {
                info!("Probe passed, {} bytes received", received);
                true
            }
            Err(e) => {
                warn!("Probe failed: {:?}", e);
                false
            }
        }
    }
}
