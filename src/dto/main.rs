use serde::{Deserialize, Serialize};

use crate::domain::agent::Agent;
use crate::domain::tag::TagUsage;
use crate::dto::client::ClientView;
use crate::pagination::Paginated;

/// Query parameters accepted by the index page service.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Optional search string entered by the user.
    #[serde(rename = "q")]
    pub search: Option<String>,
    pub tag: Option<i32>,
    /// Page number requested by the user interface.
    pub page: Option<usize>,
    #[serde(default)]
    pub show_confidential: bool,
}

/// Meeting row of the dashboard together with the client's display name.
#[derive(Debug, Serialize)]
pub struct UpcomingMeeting {
    pub meeting_id: i32,
    pub client_id: i32,
    pub client_name: String,
    pub scheduled_at: chrono::NaiveDateTime,
    pub location: Option<String>,
    pub purpose: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExpiringPolicy {
    pub policy_id: i32,
    pub client_id: i32,
    pub client_name: String,
    pub insurer: String,
    pub product_name: String,
    pub end_date: chrono::NaiveDate,
}

/// Data required to render the main index template.
#[derive(Debug)]
pub struct IndexPageData {
    /// Paginated list of clients to show in the table.
    pub clients: Paginated<ClientView>,
    /// Search query echoed back to the template when present.
    pub search_query: Option<String>,
    pub tag_id: Option<i32>,
    pub tags: Vec<TagUsage>,
    pub upcoming_meetings: Vec<UpcomingMeeting>,
    pub expiring_policies: Vec<ExpiringPolicy>,
    /// Active agents offered in the add-client form; empty for agents.
    pub agents: Vec<Agent>,
    pub show_confidential: bool,
    pub can_reveal: bool,
    pub is_admin: bool,
}
