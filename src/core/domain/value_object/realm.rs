use crate::core::domain::error::ConfigurationError;

/// A validated Proxmox authentication realm identifier (e.g. `pam`, `pve`,
/// or a site-specific LDAP/AD realm name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRealm(String);

const MAX_REALM_LENGTH: usize = 32;

impl AuthRealm {
    /// Validates and wraps a realm identifier.
    pub fn new(realm: &str) -> Result<Self, ConfigurationError> {
        if realm.is_empty() {
            return Err(ConfigurationError::Field {
                field: "realm".to_string(),
                message: "realm cannot be blank".to_string(),
            });
        }

        if realm.len() > MAX_REALM_LENGTH {
            return Err(ConfigurationError::Format(format!(
                "realm exceeds maximum of {} characters",
                MAX_REALM_LENGTH
            )));
        }

        if !realm
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(ConfigurationError::Format(
                "realm contains invalid characters".to_string(),
            ));
        }

        Ok(Self(realm.to_string()))
    }

    /// Creates a realm without validation.
    pub(crate) fn new_unchecked(realm: String) -> Self {
        Self(realm)
    }

    /// Returns the realm as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
