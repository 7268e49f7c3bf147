//! Status-indicating bring-up for network-attached boards.
//!
//! Brings a board from power-on to a verified network connection and reports
//! progress and outcome on three indicator LEDs. Everything except the
//! platform glue is hardware independent and tested on the host.

pub mod bringup;
pub mod config;
pub mod indicator;
pub mod network;
pub mod platform;
pub mod probe;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use bringup::{BringupError, BringupPlan, BringupState, Orchestrator, Outcome, Stage};
pub use config::{BringupConfig, ConfigError, CountryCode, ProbeConfig, WifiCredentials};
pub use indicator::{FlashPattern, Indicator, IndicatorError, IndicatorLines, Role, SelfTest};
pub use network::{AuthMode, NetworkError, NetworkStack};
pub use probe::{ConnectivityProbe, ProbeRequest};
