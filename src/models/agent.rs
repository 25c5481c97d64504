//! Diesel models representing insurance agents.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::agent::{Agent as DomainAgent, NewAgent as DomainNewAgent};
use crate::domain::types::{AgentEmail, AgentId, AgentName, PhoneNumber, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::agents)]
pub struct Agent {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::agents)]
pub struct NewAgent<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
}

impl TryFrom<Agent> for DomainAgent {
    type Error = TypeConstraintError;

    fn try_from(agent: Agent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AgentId::new(agent.id)?,
            name: AgentName::new(agent.name)?,
            email: AgentEmail::new(agent.email)?,
            phone: agent.phone.and_then(|p| PhoneNumber::new(p).ok()),
            is_active: agent.is_active,
            created_at: agent.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewAgent> for NewAgent<'a> {
    fn from(agent: &'a DomainNewAgent) -> Self {
        Self {
            name: agent.name.as_str(),
            email: agent.email.as_str(),
            phone: agent.phone.as_ref().map(PhoneNumber::as_str),
        }
    }
}
