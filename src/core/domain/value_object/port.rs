use crate::core::domain::error::ConfigurationError;

/// A validated Proxmox API port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiPort(u16);

impl ApiPort {
    /// Validates and wraps a port number.
    pub fn new(port: u16) -> Result<Self, ConfigurationError> {
        if port == 0 {
            return Err(ConfigurationError::Field {
                field: "port".to_string(),
                message: "port must be between 1 and 65535".to_string(),
            });
        }
        Ok(Self(port))
    }

    /// Creates a port without validation.
    pub(crate) fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Returns the port number.
    #[must_use]
    pub fn get(&self) -> u16 {
        self.0
    }
}
