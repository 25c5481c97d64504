//! Client aggregate: the insured person an agent looks after.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::privacy::PrivacyLevel;
use crate::domain::types::{
    AgentId, CleanText, ClientEmail, ClientId, ClientName, PhoneNumber, TypeConstraintError,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub agent_id: AgentId,
    pub referrer_id: Option<ClientId>,
    pub name: ClientName,
    pub phone: Option<PhoneNumber>,
    pub email: Option<ClientEmail>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub notes: Option<String>,
    pub privacy_level: PrivacyLevel,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl Client {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Contact and profile details shared by [`NewClient`] and [`UpdateClient`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClientProfile {
    pub name: ClientName,
    pub phone: Option<PhoneNumber>,
    pub email: Option<ClientEmail>,
    pub address: Option<CleanText>,
    pub birth_date: Option<NaiveDate>,
    pub occupation: Option<CleanText>,
    pub notes: Option<CleanText>,
    pub privacy_level: PrivacyLevel,
}

impl ClientProfile {
    /// Builds a profile from raw strings, dropping empty optionals.
    ///
    /// Phone numbers that cannot be parsed are rejected rather than stored
    /// in an unknown format.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
        birth_date: Option<NaiveDate>,
        occupation: Option<&str>,
        notes: Option<&str>,
        privacy_level: PrivacyLevel,
    ) -> Result<Self, TypeConstraintError> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|v| !v.is_empty())
        }

        Ok(Self {
            name: ClientName::new(name)?,
            phone: present(phone).map(PhoneNumber::new).transpose()?,
            email: present(email).map(ClientEmail::new).transpose()?,
            address: present(address).and_then(CleanText::new),
            birth_date,
            occupation: present(occupation).and_then(CleanText::new),
            notes: present(notes).and_then(CleanText::new),
            privacy_level,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewClient {
    pub agent_id: AgentId,
    pub referrer_id: Option<ClientId>,
    pub profile: ClientProfile,
}

impl NewClient {
    #[must_use]
    pub fn new(agent_id: AgentId, referrer_id: Option<ClientId>, profile: ClientProfile) -> Self {
        Self {
            agent_id,
            referrer_id,
            profile,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateClient {
    pub referrer_id: Option<ClientId>,
    pub profile: ClientProfile,
}

impl UpdateClient {
    #[must_use]
    pub fn new(referrer_id: Option<ClientId>, profile: ClientProfile) -> Self {
        Self {
            referrer_id,
            profile,
        }
    }
}
