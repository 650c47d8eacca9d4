use crate::core::domain::error::ConfigurationError;
use std::fmt;

/// The credential material a [`ClusterClient`](crate::ClusterClient) was
/// configured with.
///
/// The mode is decided once, at construction, and is immutable afterwards:
/// a complete token pair selects API-token access; otherwise a complete
/// username/password pair is required for ticket-based access.
#[derive(Clone)]
pub enum Credentials {
    /// Username/password pair exchanged for a time-limited login ticket.
    Password { username: String, password: String },
    /// Long-lived API token; no login exchange, validated by the server on
    /// every call.
    Token { token_id: String, secret: String },
}

impl Credentials {
    /// Selects the credential mode from the two optional pairs.
    ///
    /// # Errors
    ///
    /// Fails when neither pair is fully supplied.
    pub fn resolve(
        username: Option<String>,
        password: Option<String>,
        token_id: Option<String>,
        token_secret: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        if filled(&token_id) && filled(&token_secret) {
            return Ok(Credentials::Token {
                token_id: token_id.unwrap_or_default(),
                secret: token_secret.unwrap_or_default(),
            });
        }

        if filled(&username) && filled(&password) {
            return Ok(Credentials::Password {
                username: username.unwrap_or_default(),
                password: password.unwrap_or_default(),
            });
        }

        Err(ConfigurationError::ConstraintViolation(
            "either username and password or token id and token secret must be provided"
                .to_string(),
        ))
    }

    /// Returns `true` for API-token access.
    #[must_use]
    pub fn is_token(&self) -> bool {
        matches!(self, Credentials::Token { .. })
    }

    /// The `Authorization` header value for token access, `None` for
    /// password access.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            Credentials::Token { token_id, secret } => {
                Some(format!("PVEAPIToken={}={}", token_id, secret))
            }
            Credentials::Password { .. } => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credentials::Token { token_id, .. } => f
                .debug_struct("Token")
                .field("token_id", token_id)
                .field("secret", &"***")
                .finish(),
        }
    }
}
