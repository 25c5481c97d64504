use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AgentEmail, AgentId, AgentName, PhoneNumber, TypeConstraintError};

/// Insurance agent owning a book of clients.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub name: AgentName,
    pub email: AgentEmail,
    pub phone: Option<PhoneNumber>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAgent {
    pub name: AgentName,
    pub email: AgentEmail,
    pub phone: Option<PhoneNumber>,
}

impl NewAgent {
    #[must_use]
    pub fn new(name: AgentName, email: AgentEmail, phone: Option<PhoneNumber>) -> Self {
        Self { name, email, phone }
    }

    pub fn try_new(
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            name: AgentName::new(name)?,
            email: AgentEmail::new(email)?,
            phone: phone
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PhoneNumber::new)
                .transpose()?,
        })
    }
}

#[cfg(feature = "server")]
impl TryFrom<&crate::auth::AuthenticatedUser> for NewAgent {
    type Error = TypeConstraintError;

    fn try_from(user: &crate::auth::AuthenticatedUser) -> Result<Self, Self::Error> {
        let name = if user.name.trim().is_empty() {
            user.email.as_str()
        } else {
            user.name.as_str()
        };
        Self::try_new(name, &user.email, None)
    }
}

/// Agent row enriched with the number of live clients assigned to them.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AgentWithClientCount {
    pub agent: Agent,
    pub client_count: i64,
}
