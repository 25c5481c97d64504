//! Audit trail of who viewed or changed what.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{AgentId, AuditLogId};

text_enum!(AuditAction {
    View => "view",
    Create => "create",
    Update => "update",
    Delete => "delete",
    Restore => "restore",
    Purge => "purge",
    Reveal => "reveal",
    Download => "download",
    Import => "import",
    Transfer => "transfer",
});

text_enum!(AuditEntity {
    Client => "client",
    ClientList => "client_list",
    Policy => "policy",
    Meeting => "meeting",
    Document => "document",
    Tag => "tag",
    Agent => "agent",
    Setting => "setting",
    AuditLog => "audit_log",
});

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub actor_email: String,
    pub actor_agent_id: Option<AgentId>,
    pub action: AuditAction,
    pub entity: AuditEntity,
    pub entity_id: Option<i32>,
    pub details: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAuditLog {
    pub actor_email: String,
    pub actor_agent_id: Option<AgentId>,
    pub action: AuditAction,
    pub entity: AuditEntity,
    pub entity_id: Option<i32>,
    pub details: Value,
}

impl NewAuditLog {
    #[must_use]
    pub fn new(
        actor_email: impl Into<String>,
        action: AuditAction,
        entity: AuditEntity,
        entity_id: Option<i32>,
    ) -> Self {
        Self {
            actor_email: actor_email.into(),
            actor_agent_id: None,
            action,
            entity,
            entity_id,
            details: Value::Null,
        }
    }

    #[must_use]
    pub fn agent(mut self, agent_id: AgentId) -> Self {
        self.actor_agent_id = Some(agent_id);
        self
    }

    #[must_use]
    pub fn details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}
