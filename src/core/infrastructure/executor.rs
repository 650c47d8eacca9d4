//! Internal HTTP executor that signs and sends Proxmox API requests.

use crate::core::domain::{
    error::{ProxmoxError, ProxmoxResult},
    model::{cluster_connection::ClusterConnection, session::Session},
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::sync::RwLock;

/// Runtime knobs for the executor.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long a login ticket stays usable. Proxmox issues tickets for two
    /// hours; the window is checked lazily before each request.
    pub ticket_lifetime: Duration,
    /// Client-side deadline per request. `None` leaves requests unbounded,
    /// matching the remote-hint-only behaviour of the original module.
    pub request_timeout: Option<Duration>,
    /// Optional client-side request throttling.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ticket_lifetime: Duration::from_secs(7200),
            request_timeout: None,
            rate_limit: None,
        }
    }
}

/// Request-throttling settings.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub requests_per_second: NonZeroU32,
    pub burst_size: NonZeroU32,
}

/// The four verbs the Proxmox API is driven with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Form parameters for a request body.
pub type RequestParams = Vec<(String, String)>;

/// Signs requests with the active session and maps the Proxmox response
/// conventions onto [`ProxmoxResult`].
///
/// In token mode a session exists from construction (the token itself is
/// the proof, re-validated server-side per call); in password mode the
/// session appears after a successful login and is destroyed on expiry.
#[derive(Debug)]
pub struct RequestExecutor {
    http: Client,
    connection: ClusterConnection,
    session: RwLock<Option<Session>>,
    config: ClientConfig,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl RequestExecutor {
    /// Creates an executor for the given connection.
    ///
    /// # Errors
    ///
    /// Returns `ProxmoxError::Transport` if the HTTP client cannot be built.
    pub fn new(connection: ClusterConnection, config: ClientConfig) -> ProxmoxResult<Self> {
        let mut builder =
            Client::builder().danger_accept_invalid_certs(!connection.verify_tls());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ProxmoxError::Transport {
            message: format!("failed to build HTTP client: {}", e),
            source: Box::new(e),
        })?;

        let rate_limiter = config.rate_limit.map(|rl| {
            let quota = Quota::per_second(rl.requests_per_second).allow_burst(rl.burst_size);
            DefaultDirectRateLimiter::direct(quota)
        });

        let session = RwLock::new(connection.credentials().is_token().then_some(Session::Token));

        Ok(Self {
            http,
            connection,
            session,
            config,
            rate_limiter,
        })
    }

    /// Returns the connection parameters.
    pub fn connection(&self) -> &ClusterConnection {
        &self.connection
    }

    /// Returns a snapshot of the current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Installs a session (after a successful login or a restore from
    /// persisted state).
    pub async fn set_session(&self, session: Session) {
        let mut guard = self.session.write().await;
        *guard = Some(session);
    }

    /// Checks whether a request could be signed right now. An aged-out
    /// ticket is destroyed on detection, so both the ticket and its CSRF
    /// token are gone once this returns `false`.
    pub async fn is_session_valid(&self) -> bool {
        {
            let guard = self.session.read().await;
            match guard.as_ref() {
                None => return false,
                Some(Session::Token) => return true,
                Some(Session::Ticket(ticket))
                    if !ticket.is_expired(self.config.ticket_lifetime) =>
                {
                    return true;
                }
                Some(Session::Ticket(_)) => {}
            }
        }

        let mut guard = self.session.write().await;
        match guard.as_ref() {
            Some(Session::Ticket(ticket)) if ticket.is_expired(self.config.ticket_lifetime) => {
                *guard = None;
                false
            }
            Some(session) => session.is_valid(self.config.ticket_lifetime),
            None => false,
        }
    }

    /// Performs a GET request. Proxmox query parameters are not encoded on
    /// the URL; GET endpoints used here take none.
    pub async fn get(&self, path: &str) -> ProxmoxResult<Value> {
        self.execute(Verb::Get, path, &[]).await
    }

    /// Performs a POST request with form-encoded parameters.
    pub async fn post(&self, path: &str, params: &[(String, String)]) -> ProxmoxResult<Value> {
        self.execute(Verb::Post, path, params).await
    }

    /// Performs a PUT request with form-encoded parameters.
    pub async fn put(&self, path: &str, params: &[(String, String)]) -> ProxmoxResult<Value> {
        self.execute(Verb::Put, path, params).await
    }

    /// Performs a DELETE request.
    pub async fn delete(&self, path: &str) -> ProxmoxResult<Value> {
        self.execute(Verb::Delete, path, &[]).await
    }

    /// Core request execution.
    ///
    /// Maps the response onto the Proxmox conventions: 200 yields the `data`
    /// member (or `true` when it is missing or null), 500 yields `Null`
    /// (lifecycle endpoints answer 500 for guests already in the requested
    /// state), anything else is a [`ProxmoxError::RemoteApi`].
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when no valid session exists — the request is not
    /// sent. `Transport` for connection-level failures. No retry is
    /// attempted at this layer.
    pub async fn execute(
        &self,
        verb: Verb,
        path: &str,
        params: &[(String, String)],
    ) -> ProxmoxResult<Value> {
        let path = normalize_path(path);

        if !self.is_session_valid().await {
            return Err(ProxmoxError::NotAuthenticated);
        }

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.api_url(&path);
        let mut request = self
            .http
            .request(verb.method(), &url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        request = self.sign(request).await?;

        // Parameters ride in the body for POST/PUT only; the original wire
        // contract never query-encodes them for GET/DELETE.
        if matches!(verb, Verb::Post | Verb::Put) {
            request = request.form(params);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_error(e, verb, &url, params)),
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Err(self.transport_error(e, verb, &url, params)),
        };

        match status {
            StatusCode::OK => match serde_json::from_str::<Value>(&body) {
                Ok(payload) => Ok(extract_data(payload)),
                Err(e) => Err(ProxmoxError::RemoteApi {
                    status: status.as_u16(),
                    message: self.failure_message(
                        format!("undecodable response body: {}", e),
                        verb,
                        &url,
                        params,
                        Some((&headers, &body)),
                    ),
                }),
            },
            StatusCode::INTERNAL_SERVER_ERROR => Ok(Value::Null),
            status => Err(ProxmoxError::RemoteApi {
                status: status.as_u16(),
                message: self.remote_failure_message(status, verb, &url, params, &headers, &body),
            }),
        }
    }

    async fn sign(&self, request: RequestBuilder) -> ProxmoxResult<RequestBuilder> {
        if let Some(header) = self.connection.credentials().authorization_header() {
            return Ok(request.header(AUTHORIZATION, header));
        }

        let guard = self.session.read().await;
        match guard.as_ref() {
            Some(Session::Ticket(ticket)) => Ok(request
                .header("CSRFPreventionToken", ticket.csrf_token())
                .header(COOKIE, ticket.cookie_header())),
            _ => Err(ProxmoxError::NotAuthenticated),
        }
    }

    fn remote_failure_message(
        &self,
        status: StatusCode,
        verb: Verb,
        url: &str,
        params: &[(String, String)],
        headers: &HeaderMap,
        body: &str,
    ) -> String {
        if self.connection.debug() {
            return self.failure_message(
                format!("API request failed, HTTP response {}", status.as_u16()),
                verb,
                url,
                params,
                Some((headers, body)),
            );
        }

        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|payload| payload.get("errors").cloned())
            .filter(|errors| !errors.is_null())
            .map(|errors| match errors {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .unwrap_or_else(|| format!("API request failed, HTTP response {}", status.as_u16()))
    }

    fn transport_error(
        &self,
        source: reqwest::Error,
        verb: Verb,
        url: &str,
        params: &[(String, String)],
    ) -> ProxmoxError {
        let message = if self.connection.debug() {
            self.failure_message(
                format!("transport exception: {}", source),
                verb,
                url,
                params,
                None,
            )
        } else {
            format!("transport exception: {}", source)
        };
        ProxmoxError::Transport {
            message,
            source: Box::new(source),
        }
    }

    fn failure_message(
        &self,
        summary: String,
        verb: Verb,
        url: &str,
        params: &[(String, String)],
        response: Option<(&HeaderMap, &str)>,
    ) -> String {
        if !self.connection.debug() {
            return summary;
        }

        let mut message = format!(
            "{}\nHTTP method: {}\nURL: {}\nParameters: {:?}",
            summary, verb, url, params
        );
        if let Some((headers, body)) = response {
            message.push_str(&format!(
                "\nResponse headers: {:?}\nResponse: {}",
                headers, body
            ));
        }
        message
    }
}

/// Collapses any number of leading separators down to exactly one.
fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Pulls the success payload out of a decoded response. A missing or null
/// `data` member still signals success, as `true`.
fn extract_data(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Null) | None => Value::Bool(true),
            Some(data) => data,
        },
        _ => Value::Bool(true),
    }
}
