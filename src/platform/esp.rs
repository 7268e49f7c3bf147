//! ESP32 board support.
//!
//! Indicator wiring: green, yellow and red LEDs on GPIO 0, 1 and 2.

use super::{PeripheralError, Peripherals};
use crate::indicator::IndicatorLines;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_sys::EspError;

/// A GPIO configured as a push-pull output.
pub type EspIndicatorPin = PinDriver<'static, AnyOutputPin, Output>;

/// Attaches the ESP-IDF logger as the diagnostic sink.
#[derive(Debug, Default)]
pub struct EspPeripherals;

impl EspPeripherals {
    pub fn new() -> Self {
        Self
    }
}

impl Peripherals for EspPeripherals {
    fn init(&mut self) -> Result<(), PeripheralError> {
        esp_idf_svc::log::EspLogger::initialize_default();
        Ok(())
    }
}

/// Configure the three indicator GPIOs as outputs.
pub fn indicator_lines(
    success: AnyOutputPin,
    warning: AnyOutputPin,
    failure: AnyOutputPin,
) -> Result<IndicatorLines<EspIndicatorPin>, EspError> {
    Ok(IndicatorLines::new(
        PinDriver::output(success)?,
        PinDriver::output(warning)?,
        PinDriver::output(failure)?,
    ))
}
