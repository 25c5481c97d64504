//! Page data for the backoffice.

use serde::Deserialize;

use crate::domain::agent::{Agent, AgentWithClientCount};
use crate::domain::audit::{AuditAction, AuditEntity, AuditLog};
use crate::domain::setting::Settings;
use crate::domain::tag::TagUsage;
use crate::dto::client::ClientView;
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub actor: Option<String>,
    pub action: Option<String>,
    pub entity: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug)]
pub struct AuditPageData {
    pub logs: Paginated<AuditLog>,
    /// Filters echoed back to the form.
    pub actor: Option<String>,
    pub action: Option<AuditAction>,
    pub entity: Option<AuditEntity>,
    pub retention_days: u32,
}

#[derive(Debug)]
pub struct SettingsPageData {
    pub settings: Settings,
}

#[derive(Debug)]
pub struct AgentsPageData {
    pub agents: Vec<AgentWithClientCount>,
    /// Live clients offered in the transfer form.
    pub clients: Vec<ClientView>,
}

#[derive(Debug)]
pub struct TagsPageData {
    pub tags: Vec<TagUsage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrashQuery {
    pub page: Option<usize>,
}

#[derive(Debug)]
pub struct TrashPageData {
    pub clients: Paginated<ClientView>,
    /// Assigned agents of the listed clients, for display.
    pub agents: Vec<Agent>,
}

