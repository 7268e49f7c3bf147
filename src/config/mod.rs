//! Bring-up configuration.
//!
//! Credentials, country code and probe target are compile-time inputs. There
//! is no runtime reconfiguration surface: [`BringupConfig::from_build_env`]
//! reads the values baked in by cargo and validates them once at startup.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `BRINGUP_WIFI_SSID` | Access point name | (required) |
//! | `BRINGUP_WIFI_PASSWORD` | WPA2 passphrase, empty for open | empty |
//! | `BRINGUP_COUNTRY` | Regulatory country code | `US` |
//! | `BRINGUP_PROBE_HOST` | TLS probe host | `worldtimeapi.org` |
//! | `BRINGUP_PROBE_PATH` | TLS probe request path | `/api/ip` |
//! | `BRINGUP_TRUST_ANCHOR` | PEM file embedded by the build script | none |
//!
//! # Components
//!
//! - [`wifi`] - credential validation
//! - [`country`] - country code parsing
//! - [`probe`] - connectivity probe target

mod country;
mod probe;
mod wifi;

pub use country::CountryCode;
pub use probe::{
    ProbeConfig, DEFAULT_PROBE_HOST, DEFAULT_PROBE_PATH, DEFAULT_PROBE_PORT, PROBE_TIMEOUT_SECS,
};
pub use wifi::{WifiCredentials, MAX_PASSWORD_LEN, MAX_SSID_LEN, MIN_PASSWORD_LEN};

use crate::indicator::SelfTest;
use std::fmt;
use std::time::Duration;

/// Association timeout handed to the network stack.
pub const ASSOCIATION_TIMEOUT_MS: u64 = 20_000;

/// PEM trust anchor embedded by `build.rs`; empty when none was configured.
pub const TRUST_ANCHOR_PEM: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/trust_anchor.pem"));

/// Everything the orchestrator needs to bring the device up.
#[derive(Debug, Clone)]
pub struct BringupConfig {
    pub wifi: WifiCredentials,
    pub country: CountryCode,
    pub association_timeout: Duration,
    pub probe: ProbeConfig,
    pub self_test: SelfTest,
}

impl BringupConfig {
    /// Create a configuration with default timeouts and self-test.
    pub fn new(wifi: WifiCredentials, country: CountryCode, probe: ProbeConfig) -> Self {
        Self {
            wifi,
            country,
            association_timeout: Duration::from_millis(ASSOCIATION_TIMEOUT_MS),
            probe,
            self_test: SelfTest::default(),
        }
    }

    /// Build the configuration from values captured at compile time.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure. A missing SSID is reported as
    /// [`ConfigError::SsidEmpty`].
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let ssid = option_env!("BRINGUP_WIFI_SSID").unwrap_or("");
        let password = option_env!("BRINGUP_WIFI_PASSWORD").unwrap_or("");
        let country = option_env!("BRINGUP_COUNTRY").unwrap_or("US");
        let host = option_env!("BRINGUP_PROBE_HOST").unwrap_or(DEFAULT_PROBE_HOST);
        let path = option_env!("BRINGUP_PROBE_PATH").unwrap_or(DEFAULT_PROBE_PATH);

        let wifi = WifiCredentials::new(ssid, password)?;
        let country: CountryCode = country.parse()?;
        let probe = ProbeConfig::http_get(host, path, TRUST_ANCHOR_PEM)?;

        Ok(Self::new(wifi, country, probe))
    }

    pub fn with_association_timeout(mut self, timeout: Duration) -> Self {
        self.association_timeout = timeout;
        self
    }

    pub fn with_self_test(mut self, self_test: SelfTest) -> Self {
        self.self_test = self_test;
        self
    }
}

/// Errors that can occur while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// SSID is empty.
    SsidEmpty,
    /// SSID exceeds maximum length.
    SsidTooLong { len: usize, max: usize },
    /// Password is too short for WPA2.
    PasswordTooShort { len: usize, min: usize },
    /// Password exceeds maximum length.
    PasswordTooLong { len: usize, max: usize },
    /// Country code is not two ASCII letters.
    InvalidCountry(String),
    /// Probe host is empty.
    ProbeHostEmpty,
    /// Probe path is not an absolute request path.
    InvalidProbePath(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len, max } => {
                write!(f, "SSID too long: {} bytes (max {})", len, max)
            }
            Self::PasswordTooShort { len, min } => {
                write!(f, "password too short: {} bytes (min {})", len, min)
            }
            Self::PasswordTooLong { len, max } => {
                write!(f, "password too long: {} bytes (max {})", len, max)
            }
            Self::InvalidCountry(code) => write!(f, "invalid country code: {:?}", code),
            Self::ProbeHostEmpty => write!(f, "probe host cannot be empty"),
            Self::InvalidProbePath(path) => write!(f, "invalid probe path: {:?}", path),
        }
    }
}

impl std::error::Error for ConfigError {}
