use crate::core::domain::value_object::serde_helpers;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// The authentication session held by a client. At most one exists per
/// client, and its kind is fixed by the credential mode.
#[derive(Debug, Clone)]
pub enum Session {
    /// API-token access. The token material lives on the connection; the
    /// server re-validates it on every call, so there is no client-tracked
    /// expiry.
    Token,
    /// Ticket obtained through the password login exchange.
    Ticket(TicketSession),
}

impl Session {
    /// Returns `true` while the session may still sign requests.
    #[must_use]
    pub fn is_valid(&self, ticket_lifetime: Duration) -> bool {
        match self {
            Session::Token => true,
            Session::Ticket(ticket) => !ticket.is_expired(ticket_lifetime),
        }
    }
}

/// A time-limited login ticket with its CSRF-prevention token.
///
/// Serializable so the enclosing application can persist it between
/// requests instead of logging in each time; `issued_at` round-trips as
/// UNIX seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSession {
    ticket: String,
    csrf_token: String,
    #[serde(with = "serde_helpers::system_time")]
    issued_at: SystemTime,
}

impl TicketSession {
    /// Wraps a freshly issued ticket, stamped with the current time.
    pub fn new(ticket: String, csrf_token: String) -> Self {
        Self {
            ticket,
            csrf_token,
            issued_at: SystemTime::now(),
        }
    }

    /// Creates a session with an explicit issue time.
    pub(crate) fn with_issued_at(ticket: String, csrf_token: String, issued_at: SystemTime) -> Self {
        Self {
            ticket,
            csrf_token,
            issued_at,
        }
    }

    /// Returns the raw ticket value.
    #[must_use]
    pub fn ticket(&self) -> &str {
        &self.ticket
    }

    /// Returns the CSRF-prevention token value.
    #[must_use]
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// The ticket has aged out once `lifetime` has fully elapsed; the
    /// boundary instant itself counts as expired.
    #[must_use]
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.issued_at
            .elapsed()
            .map(|age| age >= lifetime)
            .unwrap_or(true)
    }

    /// Formats the ticket as the `Cookie` header value.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        format!("PVEAuthCookie={}", self.ticket)
    }
}
