use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::client::{Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient};
use crate::domain::types::{
    AgentId, ClientEmail, ClientId, ClientName, PhoneNumber, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub agent_id: i32,
    pub referrer_id: Option<i32>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub notes: Option<String>,
    pub privacy_level: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub agent_id: i32,
    pub referrer_id: Option<i32>,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub birth_date: Option<NaiveDate>,
    pub occupation: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub privacy_level: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub referrer_id: Option<i32>,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub birth_date: Option<NaiveDate>,
    pub occupation: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub privacy_level: &'a str,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClientId::new(client.id)?,
            agent_id: AgentId::new(client.agent_id)?,
            referrer_id: client.referrer_id.map(ClientId::new).transpose()?,
            name: ClientName::new(client.name)?,
            // Stored contacts were validated on the way in; tolerate legacy rows.
            phone: client.phone.and_then(|p| PhoneNumber::new(p).ok()),
            email: client.email.and_then(|e| ClientEmail::new(e).ok()),
            address: client.address,
            birth_date: client.birth_date,
            occupation: client.occupation,
            notes: client.notes,
            privacy_level: client.privacy_level.parse()?,
            created_at: client.created_at,
            updated_at: client.updated_at,
            deleted_at: client.deleted_at,
        })
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        let profile = &client.profile;
        Self {
            agent_id: client.agent_id.get(),
            referrer_id: client.referrer_id.map(ClientId::get),
            name: profile.name.as_str(),
            phone: profile.phone.as_ref().map(PhoneNumber::as_str),
            email: profile.email.as_ref().map(ClientEmail::as_str),
            address: profile.address.as_ref().map(|v| v.as_str()),
            birth_date: profile.birth_date,
            occupation: profile.occupation.as_ref().map(|v| v.as_str()),
            notes: profile.notes.as_ref().map(|v| v.as_str()),
            privacy_level: profile.privacy_level.as_str(),
        }
    }
}

impl<'a> UpdateClient<'a> {
    pub fn from_domain(client: &'a DomainUpdateClient, updated_at: NaiveDateTime) -> Self {
        let profile = &client.profile;
        Self {
            referrer_id: client.referrer_id.map(ClientId::get),
            name: profile.name.as_str(),
            phone: profile.phone.as_ref().map(PhoneNumber::as_str),
            email: profile.email.as_ref().map(ClientEmail::as_str),
            address: profile.address.as_ref().map(|v| v.as_str()),
            birth_date: profile.birth_date,
            occupation: profile.occupation.as_ref().map(|v| v.as_str()),
            notes: profile.notes.as_ref().map(|v| v.as_str()),
            privacy_level: profile.privacy_level.as_str(),
            updated_at,
        }
    }
}
