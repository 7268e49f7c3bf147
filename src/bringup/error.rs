use crate::network::NetworkError;
use crate::platform::PeripheralError;
use std::fmt;

/// Why a bring-up run failed.
#[derive(Debug)]
pub enum BringupError {
    /// Peripheral or driver initialization failed.
    Init(InitFailure),
    /// Could not join the access point.
    Association(NetworkError),
    /// Connectivity probe did not pass.
    Probe { host: String },
}

/// Which initialization step failed.
#[derive(Debug)]
pub enum InitFailure {
    Peripheral(PeripheralError),
    Driver(NetworkError),
}

impl fmt::Display for BringupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "initialization failed: {}", e),
            Self::Association(e) => write!(f, "association failed: {}", e),
            Self::Probe { host } => write!(f, "connectivity probe to {} failed", host),
        }
    }
}

impl std::error::Error for BringupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Init(InitFailure::Peripheral(e)) => Some(e),
            Self::Init(InitFailure::Driver(e)) | Self::Association(e) => Some(e),
            Self::Probe { .. } => None,
        }
    }
}

impl fmt::Display for InitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peripheral(e) => write!(f, "peripherals: {}", e),
            Self::Driver(e) => write!(f, "network driver: {}", e),
        }
    }
}

impl From<InitFailure> for BringupError {
    fn from(e: InitFailure) -> Self {
        Self::Init(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_names_the_step() {
        let err = BringupError::from(InitFailure::Driver(NetworkError::NotInitialized));
        assert_eq!(
            err.to_string(),
            "initialization failed: network driver: network driver not initialized"
        );

        let err = BringupError::Probe {
            host: "example.com".into(),
        };
        assert_eq!(err.to_string(), "connectivity probe to example.com failed");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_source_chain() {
        let err = BringupError::Association(NetworkError::NoRoute);
        assert_eq!(err.source().unwrap().to_string(), "no route to network");

        let err = BringupError::Init(InitFailure::Peripheral(PeripheralError::TextSink(
            "busy".into(),
        )));
        assert!(err.source().is_some());
    }
}
