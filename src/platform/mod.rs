//! Platform bring-up primitives.
//!
//! - [`Peripherals`] - the `PeripheralInit` stage action
//! - host: logger sink, logging pins and a sleeping delay
//! - `esp32`: ESP-IDF logger and GPIO indicator lines

use std::fmt;

#[cfg(not(feature = "esp32"))]
mod host;

#[cfg(feature = "esp32")]
mod esp;

#[cfg(not(feature = "esp32"))]
pub use host::{HostPeripherals, LogPin, StdDelay};

#[cfg(feature = "esp32")]
pub use esp::{indicator_lines, EspIndicatorPin, EspPeripherals};

/// Board-level initialization run as the first bring-up stage.
///
/// Attaches the diagnostic text sink. Text output is best effort: a deployed
/// unit may have nothing listening on it.
pub trait Peripherals {
    fn init(&mut self) -> Result<(), PeripheralError>;
}

/// Peripheral initialization errors.
#[derive(Debug)]
pub enum PeripheralError {
    /// Diagnostic output could not be attached.
    TextSink(String),
    /// ESP-IDF error.
    #[cfg(feature = "esp32")]
    Esp(esp_idf_sys::EspError),
}

impl fmt::Display for PeripheralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextSink(msg) => write!(f, "text sink unavailable: {}", msg),
            #[cfg(feature = "esp32")]
            Self::Esp(e) => write!(f, "ESP error: {:?}", e),
        }
    }
}

impl std::error::Error for PeripheralError {}

#[cfg(feature = "esp32")]
impl From<esp_idf_sys::EspError> for PeripheralError {
    fn from(e: esp_idf_sys::EspError) -> Self {
        Self::Esp(e)
    }
}
