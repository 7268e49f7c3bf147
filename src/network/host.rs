//! Host network stack.
//!
//! On host systems the OS owns WiFi. This stack keeps the same state rules as
//! the device driver (init before station mode, station mode before
//! association) and treats "the host has a default route" as associated.

use super::{AuthMode, NetworkError, NetworkStack};
use crate::config::{CountryCode, WifiCredentials};
use log::{debug, info, warn};
use std::net::IpAddr;
use std::time::Duration;

/// Host network stack.
#[derive(Debug, Default)]
pub struct HostNetworkStack {
    country: Option<CountryCode>,
    station_mode: bool,
    ip_addr: Option<IpAddr>,
}

impl HostNetworkStack {
    /// Create a new host network stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Local address picked during association.
    pub fn ip_addr(&self) -> Option<IpAddr> {
        self.ip_addr
    }

    /// Get the primary local IP address.
    ///
    /// This uses a trick: create a UDP socket and "connect" to a public IP
    /// (doesn't actually send anything), then check which local address was chosen.
    fn detect_local_ip() -> Option<IpAddr> {
        use std::net::UdpSocket;

        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        let local_addr = socket.local_addr().ok()?;
        Some(local_addr.ip())
    }
}

impl NetworkStack for HostNetworkStack {
    fn driver_init(&mut self, country: CountryCode) -> Result<(), NetworkError> {
        info!("Host network driver ready (country {})", country);
        self.country = Some(country);
        Ok(())
    }

    fn enable_station_mode(&mut self) -> Result<(), NetworkError> {
        if self.country.is_none() {
            return Err(NetworkError::NotInitialized);
        }
        self.station_mode = true;
        debug!("Station mode enabled");
        Ok(())
    }

    fn associate(
        &mut self,
        credentials: &WifiCredentials,
        auth: AuthMode,
        timeout: Duration,
    ) -> Result<(), NetworkError> {
        if self.country.is_none() {
            return Err(NetworkError::NotInitialized);
        }
        if !self.station_mode {
            return Err(NetworkError::StationModeDisabled);
        }

        info!(
            "Associating with {} ({:?}, timeout {} ms)",
            credentials.ssid(),
            auth,
            timeout.as_millis()
        );

        // The OS decides which network we are on; only check we have one.
        match Self::detect_local_ip() {
            Some(ip) => {
                info!("Host network up, local IP: {}", ip);
                self.ip_addr = Some(ip);
                Ok(())
            }
            None => {
                warn!("Host has no default route");
                Err(NetworkError::NoRoute)
            }
        }
    }

    fn teardown(&mut self) {
        debug!("Host network stack torn down");
        self.country = None;
        self.station_mode = false;
        self.ip_addr = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> WifiCredentials {
        WifiCredentials::new("TestNetwork", "password123").unwrap()
    }

    #[test]
    fn test_station_mode_requires_driver() {
        let mut stack = HostNetworkStack::new();
        assert!(matches!(
            stack.enable_station_mode(),
            Err(NetworkError::NotInitialized)
        ));
    }

    #[test]
    fn test_associate_requires_station_mode() {
        let mut stack = HostNetworkStack::new();
        stack.driver_init(CountryCode::US).unwrap();

        let result = stack.associate(&creds(), AuthMode::Wpa2Personal, Duration::from_secs(1));
        assert!(matches!(result, Err(NetworkError::StationModeDisabled)));
    }

    #[test]
    fn test_associate_on_host() {
        let mut stack = HostNetworkStack::new();
        stack.driver_init(CountryCode::US).unwrap();
        stack.enable_station_mode().unwrap();

        // Route detection might fail in air-gapped CI, so only check consistency
        match stack.associate(&creds(), AuthMode::Wpa2Personal, Duration::from_secs(1)) {
            Ok(()) => assert!(stack.ip_addr().is_some()),
            Err(e) => {
                assert!(matches!(e, NetworkError::NoRoute));
                assert!(stack.ip_addr().is_none());
            }
        }
    }

    #[test]
    fn test_teardown_resets_state() {
        let mut stack = HostNetworkStack::new();
        stack.driver_init(CountryCode::US).unwrap();
        stack.enable_station_mode().unwrap();
        stack.teardown();

        assert!(matches!(
            stack.enable_station_mode(),
            Err(NetworkError::NotInitialized)
        ));
    }
}
