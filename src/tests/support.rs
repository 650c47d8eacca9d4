//! Shared fixtures for the wiremock-backed tests.

use crate::core::domain::model::session::TicketSession;
use crate::{
    ApiPort, AuthRealm, ClientConfig, ClusterClient, ClusterConnection, ClusterHost, Credentials,
};
use std::time::{Duration, SystemTime};
use url::Url;
use wiremock::MockServer;

pub const TEST_TICKET: &str = "PVE:provisioner@pam:4EEC61E2::sig";
pub const TEST_CSRF: &str = "4EEC61E2:csrf";
pub const TEST_TOKEN_ID: &str = "billing@pve!prov";
pub const TEST_TOKEN_SECRET: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";

fn connection(server: &MockServer, credentials: Credentials, debug: bool) -> ClusterConnection {
    let api_base = Url::parse(&format!("{}/api2/json", server.uri())).unwrap();
    ClusterConnection::with_api_base(
        ClusterHost::new_unchecked("pve.example.com".to_string()),
        ApiPort::new_unchecked(8006),
        AuthRealm::new_unchecked("pam".to_string()),
        credentials,
        false,
        debug,
        api_base,
    )
}

fn password_credentials() -> Credentials {
    Credentials::Password {
        username: "provisioner".to_string(),
        password: "secret".to_string(),
    }
}

/// A ticket session issued `age_secs` seconds ago.
pub fn ticket_aged(age_secs: u64) -> TicketSession {
    TicketSession::with_issued_at(
        TEST_TICKET.to_string(),
        TEST_CSRF.to_string(),
        SystemTime::now() - Duration::from_secs(age_secs),
    )
}

/// Password-mode client with no session installed.
pub fn password_client(server: &MockServer) -> ClusterClient {
    let connection = connection(server, password_credentials(), false);
    ClusterClient::new(connection, ClientConfig::default()).unwrap()
}

/// Password-mode client holding a fresh ticket session.
pub async fn authenticated_client(server: &MockServer) -> ClusterClient {
    let client = password_client(server);
    client.restore_session(ticket_aged(0)).await;
    client
}

/// Same as [`authenticated_client`], with a caller-supplied config.
pub async fn authenticated_client_with_config(
    server: &MockServer,
    config: ClientConfig,
) -> ClusterClient {
    let connection = connection(server, password_credentials(), false);
    let client = ClusterClient::new(connection, config).unwrap();
    client.restore_session(ticket_aged(0)).await;
    client
}

/// Password-mode client with debug dumps enabled, holding a fresh ticket.
pub async fn debug_client(server: &MockServer) -> ClusterClient {
    let connection = connection(server, password_credentials(), true);
    let client = ClusterClient::new(connection, ClientConfig::default()).unwrap();
    client.restore_session(ticket_aged(0)).await;
    client
}

/// Token-mode client; usable without any login step.
pub fn token_client(server: &MockServer) -> ClusterClient {
    let credentials = Credentials::Token {
        token_id: TEST_TOKEN_ID.to_string(),
        secret: TEST_TOKEN_SECRET.to_string(),
    };
    let connection = connection(server, credentials, false);
    ClusterClient::new(connection, ClientConfig::default()).unwrap()
}
