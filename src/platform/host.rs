//! Host stand-ins for the board.
//!
//! LEDs become log lines and delays become real sleeps, so the bring-up
//! sequence can be watched from a terminal with the same timing as on device.

use super::{PeripheralError, Peripherals};
use crate::indicator::{IndicatorLines, Role};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use log::info;
use std::convert::Infallible;
use std::time::Duration;

/// Attaches `env_logger` as the diagnostic sink (`RUST_LOG` honoured).
#[derive(Debug, Default)]
pub struct HostPeripherals;

impl HostPeripherals {
    pub fn new() -> Self {
        Self
    }
}

impl Peripherals for HostPeripherals {
    fn init(&mut self) -> Result<(), PeripheralError> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init()
            .map_err(|e| PeripheralError::TextSink(e.to_string()))
    }
}

/// An output line that reports level changes through the log.
#[derive(Debug)]
pub struct LogPin {
    role: Role,
    high: Option<bool>,
}

impl LogPin {
    pub fn new(role: Role) -> Self {
        Self { role, high: None }
    }

    /// One logging pin per role.
    pub fn lines() -> IndicatorLines<Self> {
        IndicatorLines::new(
            Self::new(Role::Success),
            Self::new(Role::Warning),
            Self::new(Role::Failure),
        )
    }

    fn write(&mut self, high: bool) {
        if self.high != Some(high) {
            info!("[LED {:>7}] {}", self.role, if high { "ON" } else { "off" });
        }
        self.high = Some(high);
    }
}

impl ErrorType for LogPin {
    type Error = Infallible;
}

impl OutputPin for LogPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

/// Blocking delay backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_log_pin_tracks_level() {
        let mut pin = LogPin::new(Role::Warning);
        assert_eq!(pin.high, None);
        pin.set_high().unwrap();
        assert_eq!(pin.high, Some(true));
        pin.set_low().unwrap();
        assert_eq!(pin.high, Some(false));
    }

    #[test]
    fn test_std_delay_blocks() {
        let start = Instant::now();
        StdDelay.delay_ms(5);
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
