use serde::Deserialize;

#[derive(Deserialize)]
pub struct TicketResponse {
    pub data: TicketResponseData,
}

#[derive(Deserialize)]
pub struct TicketResponseData {
    pub ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    pub csrf_token: String,
}
