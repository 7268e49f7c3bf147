//! Network stack abstraction.
//!
//! The orchestrator never talks to a WiFi driver directly. It drives a
//! [`NetworkStack`], so the same bring-up sequence runs on:
//! - **ESP32** (`esp32` feature): ESP-IDF WiFi driver in station mode
//! - **Host**: the OS owns the network, the stack only checks for a route
//! - **Tests**: deterministic fakes
//!
//! # Example
//!
//! ```ignore
//! use status_bringup::network::{AuthMode, NetworkStack};
//!
//! network.driver_init(config.country)?;
//! network.enable_station_mode()?;
//! network.associate(&config.wifi, AuthMode::for_credentials(&config.wifi), config.association_timeout)?;
//! // ...
//! network.teardown();
//! ```

use crate::config::{CountryCode, WifiCredentials};
use std::fmt;
use std::time::Duration;

#[cfg(not(feature = "esp32"))]
mod host;

#[cfg(feature = "esp32")]
mod wifi;

#[cfg(not(feature = "esp32"))]
pub use host::HostNetworkStack;

#[cfg(feature = "esp32")]
pub use wifi::EspNetworkStack;

/// Authentication used when associating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Open network.
    Open,
    /// WPA2 personal (AES PSK).
    Wpa2Personal,
}

impl AuthMode {
    /// Open for empty passwords, WPA2 otherwise.
    pub fn for_credentials(credentials: &WifiCredentials) -> Self {
        if credentials.is_open() {
            Self::Open
        } else {
            Self::Wpa2Personal
        }
    }
}

/// Network bring-up primitives.
///
/// Every call blocks. Timeouts belong to the implementation; callers never
/// retry.
pub trait NetworkStack {
    /// Bring up the network driver for the given regulatory domain.
    fn driver_init(&mut self, country: CountryCode) -> Result<(), NetworkError>;

    /// Switch the driver into station (client) mode.
    fn enable_station_mode(&mut self) -> Result<(), NetworkError>;

    /// Join an access point, giving up after `timeout`.
    fn associate(
        &mut self,
        credentials: &WifiCredentials,
        auth: AuthMode,
        timeout: Duration,
    ) -> Result<(), NetworkError>;

    /// Release everything `driver_init` acquired.
    fn teardown(&mut self);
}

/// Network errors.
#[derive(Debug)]
pub enum NetworkError {
    /// Operation requires an initialized driver.
    NotInitialized,
    /// Association attempted before station mode was enabled.
    StationModeDisabled,
    /// Driver rejected the request.
    Driver(String),
    /// Association did not complete in time.
    Timeout(Duration),
    /// Host has no usable default route.
    NoRoute,
    /// Generic I/O error.
    Io(std::io::Error),
    /// ESP-IDF error.
    #[cfg(feature = "esp32")]
    Esp(esp_idf_sys::EspError),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "network driver not initialized"),
            Self::StationModeDisabled => write!(f, "station mode not enabled"),
            Self::Driver(msg) => write!(f, "driver error: {}", msg),
            Self::Timeout(t) => write!(f, "association timed out after {} ms", t.as_millis()),
            Self::NoRoute => write!(f, "no route to network"),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            #[cfg(feature = "esp32")]
            Self::Esp(e) => write!(f, "ESP error: {:?}", e),
        }
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NetworkError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(feature = "esp32")]
impl From<esp_idf_sys::EspError> for NetworkError {
    fn from(e: esp_idf_sys::EspError) -> Self {
        Self::Esp(e)
    }
}
