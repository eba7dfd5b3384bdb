use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors raised while assembling the core.
#[derive(Error, Debug)]
pub enum Error {
    /// A setting is out of range or unparseable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host did not supply a required bridge.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// A default bridge adapter could not be constructed.
    #[error("Bridge setup failed: {0}")]
    Bridge(#[from] BridgeError),
}

impl Error {
    pub fn capability_missing(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CapabilityMissing {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Name of the missing bridge, if that is what went wrong.
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            Error::CapabilityMissing { capability, .. } => Some(capability),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_missing_names_the_bridge() {
        let err = Error::capability_missing("MediaPlayer", "inject one");
        assert_eq!(err.missing_capability(), Some("MediaPlayer"));
        assert_eq!(err.to_string(), "Capability missing: MediaPlayer - inject one");
    }

    #[test]
    fn bridge_errors_convert() {
        let err: Error = BridgeError::NotAvailable("tls backend".to_string()).into();
        assert!(matches!(err, Error::Bridge(BridgeError::NotAvailable(_))));
        assert_eq!(err.missing_capability(), None);
    }
}
