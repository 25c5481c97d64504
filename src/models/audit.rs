//! Diesel models for the audit trail.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::audit::{AuditLog as DomainAuditLog, NewAuditLog as DomainNewAuditLog};
use crate::domain::types::{AgentId, AuditLogId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::audit_logs)]
pub struct AuditLog {
    pub id: i32,
    pub actor_email: String,
    pub actor_agent_id: Option<i32>,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<i32>,
    pub details: String, // JSON text
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::audit_logs)]
pub struct NewAuditLog<'a> {
    pub actor_email: &'a str,
    pub actor_agent_id: Option<i32>,
    pub action: &'a str,
    pub entity: &'a str,
    pub entity_id: Option<i32>,
    pub details: String,
}

impl TryFrom<AuditLog> for DomainAuditLog {
    type Error = TypeConstraintError;

    fn try_from(log: AuditLog) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AuditLogId::new(log.id)?,
            actor_email: log.actor_email,
            actor_agent_id: log.actor_agent_id.map(AgentId::new).transpose()?,
            action: log.action.parse()?,
            entity: log.entity.parse()?,
            entity_id: log.entity_id,
            details: serde_json::from_str(&log.details).unwrap_or_default(),
            created_at: log.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewAuditLog> for NewAuditLog<'a> {
    fn from(log: &'a DomainNewAuditLog) -> Self {
        Self {
            actor_email: log.actor_email.as_str(),
            actor_agent_id: log.actor_agent_id.map(AgentId::get),
            action: log.action.as_str(),
            entity: log.entity.as_str(),
            entity_id: log.entity_id,
            details: log.details.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::domain::audit::{AuditAction, AuditEntity};

    #[test]
    fn new_audit_log_serializes_details() {
        let domain = DomainNewAuditLog::new("a@b.co", AuditAction::Reveal, AuditEntity::Client, Some(4))
            .agent(AgentId::new(2).unwrap())
            .details(json!({"fields": ["phone"]}));
        let insertable: NewAuditLog = (&domain).into();
        assert_eq!(insertable.action, "reveal");
        assert_eq!(insertable.entity, "client");
        assert_eq!(insertable.actor_agent_id, Some(2));
        assert_eq!(insertable.details, r#"{"fields":["phone"]}"#);
    }

    #[test]
    fn malformed_details_degrade_to_null() {
        let row = AuditLog {
            id: 1,
            actor_email: "a@b.co".into(),
            actor_agent_id: None,
            action: "view".into(),
            entity: "client_list".into(),
            entity_id: None,
            details: "{broken".into(),
            created_at: Utc::now().naive_utc(),
        };
        let log = DomainAuditLog::try_from(row).unwrap();
        assert_eq!(log.entity, AuditEntity::ClientList);
        assert!(log.details.is_null());
    }
}
