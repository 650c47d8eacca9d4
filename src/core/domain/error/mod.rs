use thiserror::Error;

/// The main error type for cluster-client operations.
///
/// The variants mirror the failure classes a billing module has to tell
/// apart: bad configuration (fatal, no network activity attempted), a
/// missing or expired session (caller must authenticate again), a remote
/// API rejection, and plain transport trouble.
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// Invalid constructor input. Raised once, at build time.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// No usable session: login ticket missing, expired, or no API token
    /// configured. The request was not sent.
    #[error("no valid connection to Proxmox host: login ticket missing, expired, or no API token set up")]
    NotAuthenticated,

    /// The server answered with a status the client does not absorb.
    ///
    /// `message` carries the server's `errors` member when one was present,
    /// or a verbose request/response dump when debug mode is enabled.
    #[error("API request failed, HTTP response {status}: {message}")]
    RemoteApi { status: u16, message: String },

    /// DNS, TLS or connection-level failure underneath the HTTP exchange.
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: Box<reqwest::Error>,
    },
}

/// Detailed context for constructor-input validation failures.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A single named field failed validation.
    #[error("field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Format/syntax violation.
    #[error("format error: {0}")]
    Format(String),

    /// A domain constraint spanning more than one field.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for results that may fail with a [`ProxmoxError`].
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;

impl ProxmoxError {
    /// The HTTP status carried by a remote API failure, if that is what
    /// this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProxmoxError::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}
