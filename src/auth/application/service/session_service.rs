use crate::{
    auth::application::{
        request::ticket_request::TicketRequest, response::ticket_response::TicketResponse,
    },
    core::domain::{
        error::{ConfigurationError, ProxmoxError, ProxmoxResult},
        model::{
            cluster_connection::ClusterConnection, credentials::Credentials,
            session::TicketSession,
        },
    },
};
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, HeaderMap},
};

/// Performs the password-mode login exchange against `/access/ticket`.
///
/// The exchange itself is unauthenticated; the TLS-verification flag of the
/// connection is honoured. Callers that want the boolean "could not log in"
/// convention absorb the error themselves.
pub struct SessionService {
    default_headers: HeaderMap,
}

impl SessionService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, "application/json".parse().unwrap());

        Self { default_headers }
    }

    /// Exchanges the connection's username/password for a ticket session.
    ///
    /// # Errors
    ///
    /// `Configuration` when the connection uses token credentials,
    /// `Transport` for connection-level failures, `RemoteApi` for any
    /// non-200 answer or an undecodable body.
    pub async fn execute(&self, connection: &ClusterConnection) -> ProxmoxResult<TicketSession> {
        let Credentials::Password { username, password } = connection.credentials() else {
            return Err(ProxmoxError::Configuration(
                ConfigurationError::ConstraintViolation(
                    "ticket login requires username and password credentials".to_string(),
                ),
            ));
        };

        let http_client = Client::builder()
            .danger_accept_invalid_certs(!connection.verify_tls())
            .build()
            .map_err(|e| ProxmoxError::Transport {
                message: format!("failed to build HTTP client: {}", e),
                source: Box::new(e),
            })?;

        let url = connection.api_url("/access/ticket");
        let request = TicketRequest {
            username: username.clone(),
            password: password.clone(),
            realm: connection.realm().as_str().to_string(),
        };

        let response = http_client
            .post(&url)
            .headers(self.default_headers.clone())
            .form(&request)
            .send()
            .await
            .map_err(|e| ProxmoxError::Transport {
                message: format!("transport exception: {}", e),
                source: Box::new(e),
            })?;

        match response.status() {
            StatusCode::OK => {
                let ticket_response =
                    response
                        .json::<TicketResponse>()
                        .await
                        .map_err(|e| ProxmoxError::RemoteApi {
                            status: 200,
                            message: format!("undecodable login response: {}", e),
                        })?;
                Ok(TicketSession::new(
                    ticket_response.data.ticket,
                    ticket_response.data.csrf_token,
                ))
            }
            StatusCode::UNAUTHORIZED => Err(ProxmoxError::RemoteApi {
                status: 401,
                message: "invalid credentials provided".to_string(),
            }),
            status => Err(ProxmoxError::RemoteApi {
                status: status.as_u16(),
                message: format!("unexpected login response status {}", status.as_u16()),
            }),
        }
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}
