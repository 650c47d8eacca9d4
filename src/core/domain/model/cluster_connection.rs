use crate::core::domain::error::ConfigurationError;
use crate::core::domain::model::credentials::Credentials;
use crate::core::domain::value_object::{ApiPort, AuthRealm, ClusterHost};
use std::net::Ipv6Addr;
use url::Url;

/// Immutable connection parameters for one configured cluster.
///
/// Everything here is fixed at construction; the mutable pieces (session,
/// node cache) live in the executor and registry.
#[derive(Debug, Clone)]
pub struct ClusterConnection {
    host: ClusterHost,
    port: ApiPort,
    realm: AuthRealm,
    credentials: Credentials,
    verify_tls: bool,
    debug: bool,
    api_base: Url,
}

impl ClusterConnection {
    /// Assembles a connection, deriving the `https://{host}:{port}/api2/json`
    /// API base URL.
    pub fn new(
        host: ClusterHost,
        port: ApiPort,
        realm: AuthRealm,
        credentials: Credentials,
        verify_tls: bool,
        debug: bool,
    ) -> Result<Self, ConfigurationError> {
        let authority = if host.as_str().parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", host.as_str())
        } else {
            host.as_str().to_string()
        };
        let api_base = Url::parse(&format!("https://{}:{}/api2/json", authority, port.get()))
            .map_err(|e| ConfigurationError::Format(format!("invalid API base URL: {}", e)))?;

        Ok(Self {
            host,
            port,
            realm,
            credentials,
            verify_tls,
            debug,
            api_base,
        })
    }

    /// Assembles a connection around an explicit API base, bypassing the
    /// scheme/host/port derivation. Test seam.
    pub(crate) fn with_api_base(
        host: ClusterHost,
        port: ApiPort,
        realm: AuthRealm,
        credentials: Credentials,
        verify_tls: bool,
        debug: bool,
        api_base: Url,
    ) -> Self {
        Self {
            host,
            port,
            realm,
            credentials,
            verify_tls,
            debug,
            api_base,
        }
    }

    /// Builds the absolute URL for an already-normalized API path.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.as_str().trim_end_matches('/'), path)
    }

    pub fn host(&self) -> &ClusterHost {
        &self.host
    }

    pub fn port(&self) -> ApiPort {
        self.port
    }

    pub fn realm(&self) -> &AuthRealm {
        &self.realm
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}
