//! DTOs exposed by the CRM API endpoints.

use serde::{Deserialize, Serialize};

use crate::dto::client::ClientView;

/// Query parameters accepted by the `/api/v1/clients` service.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    /// Optional free-form search string applied to the client list.
    pub search: Option<String>,
    /// Optional page number for pagination.
    pub page: Option<usize>,
}

/// Result payload returned by [`crate::services::api::list_clients`].
#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    /// Total number of clients matching the filter.
    pub total: usize,
    /// Page of masked clients requested by the caller.
    pub clients: Vec<ClientView>,
}
