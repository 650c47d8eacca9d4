use crate::core::domain::error::ConfigurationError;
use std::net::IpAddr;
use std::time::Duration;

/// A validated Proxmox host address.
///
/// Accepts either an RFC 1035 hostname that resolves through DNS, or a
/// literal IP address (which skips the resolution probe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHost(String);

const MAX_HOSTNAME_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;
const DNS_TIMEOUT: Duration = Duration::from_secs(5);

impl ClusterHost {
    /// Validates hostname syntax and probes DNS resolution.
    ///
    /// The probe is the only side effect of client construction; `port` is
    /// only used to form the lookup target.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for an empty or malformed hostname, or
    /// one that cannot be resolved and is not a literal IP address.
    pub async fn resolve(host: &str, port: u16) -> Result<Self, ConfigurationError> {
        if host.is_empty() {
            return Err(ConfigurationError::Field {
                field: "hostname".to_string(),
                message: "hostname cannot be blank".to_string(),
            });
        }

        if host.parse::<IpAddr>().is_ok() {
            return Ok(Self(host.to_string()));
        }

        if host.len() > MAX_HOSTNAME_LENGTH {
            return Err(ConfigurationError::Format(format!(
                "hostname exceeds maximum of {} characters",
                MAX_HOSTNAME_LENGTH
            )));
        }

        for label in host.split('.') {
            validate_label(label)?;
        }

        match tokio::time::timeout(
            DNS_TIMEOUT,
            tokio::net::lookup_host(format!("{}:{}", host, port)),
        )
        .await
        {
            Ok(Ok(mut addresses)) => {
                if addresses.next().is_none() {
                    return Err(ConfigurationError::ConstraintViolation(format!(
                        "cannot resolve {}: no DNS records found",
                        host
                    )));
                }
            }
            Ok(Err(e)) => {
                return Err(ConfigurationError::ConstraintViolation(format!(
                    "cannot resolve {}: {}",
                    host, e
                )));
            }
            Err(_) => {
                return Err(ConfigurationError::ConstraintViolation(format!(
                    "cannot resolve {}: DNS resolution timed out",
                    host
                )));
            }
        }

        Ok(Self(host.to_string()))
    }

    /// Creates a host without validation.
    pub(crate) fn new_unchecked(host: String) -> Self {
        Self(host)
    }

    /// Returns the host as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_label(label: &str) -> Result<(), ConfigurationError> {
    if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
        return Err(ConfigurationError::Format(format!(
            "hostname label must be between 1 and {} characters",
            MAX_LABEL_LENGTH
        )));
    }

    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ConfigurationError::Format(
            "hostname label can only contain alphanumeric characters and hyphens".to_string(),
        ));
    }

    if label.starts_with('-') || label.ends_with('-') {
        return Err(ConfigurationError::Format(
            "hostname label cannot start or end with a hyphen".to_string(),
        ));
    }

    Ok(())
}
