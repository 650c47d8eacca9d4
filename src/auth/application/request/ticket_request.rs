use serde::Serialize;

/// Form body for the `/access/ticket` login exchange.
#[derive(Serialize)]
pub struct TicketRequest {
    pub username: String,
    pub password: String,
    pub realm: String,
}
