//! Persistence traits and their Diesel implementation.
//!
//! Services depend on the narrow `*Reader` / `*Writer` traits so they can be
//! exercised against [`mock::MockRepository`] in unit tests, while the web
//! application wires in [`DieselRepository`].

use chrono::{NaiveDate, NaiveDateTime};

use crate::db::{DbConnection, DbPool};
use crate::domain::agent::{Agent, AgentWithClientCount, NewAgent};
use crate::domain::audit::{AuditAction, AuditEntity, AuditLog, NewAuditLog};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::document::{Document, NewDocument};
use crate::domain::meeting::{Meeting, MeetingDetails, NewMeeting};
use crate::domain::policy::{NewPolicy, Policy, PolicyDetails};
use crate::domain::setting::AdminSetting;
use crate::domain::tag::{NewTag, Tag, TagUsage};
use crate::domain::types::{
    AgentEmail, AgentId, ClientId, DocumentId, MeetingId, PolicyId, PublicId, TagId,
};
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryResult;

pub mod agent;
pub mod audit;
pub mod client;
pub mod document;
pub mod errors;
pub mod meeting;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod policy;
pub mod setting;
pub mod tag;

/// Diesel-backed repository shared by all request handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(crate::db::get_connection(&self.pool)?)
    }
}

/// Filters for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientListQuery {
    /// Restrict to the book of a single agent.
    pub agent_id: Option<AgentId>,
    pub search: Option<String>,
    pub tag_id: Option<TagId>,
    /// `false` lists live clients, `true` lists the trash.
    pub deleted: bool,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn tag(mut self, tag_id: TagId) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

/// Filters for the audit log viewer.
#[derive(Debug, Clone, Default)]
pub struct AuditListQuery {
    pub actor_email: Option<String>,
    pub action: Option<AuditAction>,
    pub entity: Option<AuditEntity>,
    pub pagination: Option<Pagination>,
}

impl AuditListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(mut self, email: impl Into<String>) -> Self {
        self.actor_email = Some(email.into());
        self
    }

    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn entity(mut self, entity: AuditEntity) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

pub trait ClientReader {
    /// Returns the client even when it sits in the trash.
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    fn list_referrals(&self, referrer_id: ClientId) -> RepositoryResult<Vec<Client>>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
    fn soft_delete_client(&self, id: ClientId, at: NaiveDateTime) -> RepositoryResult<()>;
    fn restore_client(&self, id: ClientId) -> RepositoryResult<()>;
    /// Removes the client row; dependent rows go with it via foreign keys.
    fn purge_client(&self, id: ClientId) -> RepositoryResult<()>;
    fn transfer_clients(&self, agent_id: AgentId, client_ids: &[ClientId])
    -> RepositoryResult<usize>;
}

pub trait AgentReader {
    fn get_agent_by_id(&self, id: AgentId) -> RepositoryResult<Option<Agent>>;
    fn get_agent_by_email(&self, email: &AgentEmail) -> RepositoryResult<Option<Agent>>;
    fn list_agents_with_client_counts(&self) -> RepositoryResult<Vec<AgentWithClientCount>>;
}

pub trait AgentWriter {
    /// Inserts the agent or refreshes the name of the existing one with the
    /// same email. The active flag of an existing agent is left untouched.
    fn create_or_update_agent(&self, new_agent: &NewAgent) -> RepositoryResult<Agent>;
    fn set_agent_active(&self, id: AgentId, is_active: bool) -> RepositoryResult<Agent>;
}

pub trait PolicyReader {
    fn get_policy(&self, id: PolicyId) -> RepositoryResult<Option<Policy>>;
    fn list_policies(&self, client_id: ClientId) -> RepositoryResult<Vec<Policy>>;
    /// Active policies of live clients ending within `[from, to]`.
    fn list_policies_ending_between(
        &self,
        agent_id: Option<AgentId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<(Policy, Client)>>;
}

pub trait PolicyWriter {
    fn create_policy(&self, new_policy: &NewPolicy) -> RepositoryResult<Policy>;
    fn update_policy(&self, id: PolicyId, details: &PolicyDetails) -> RepositoryResult<Policy>;
    fn delete_policy(&self, id: PolicyId) -> RepositoryResult<()>;
}

pub trait MeetingReader {
    fn get_meeting(&self, id: MeetingId) -> RepositoryResult<Option<Meeting>>;
    fn list_meetings(&self, client_id: ClientId) -> RepositoryResult<Vec<Meeting>>;
    /// Scheduled meetings with live clients within `[from, to]`, soonest first.
    fn list_upcoming_meetings(
        &self,
        agent_id: Option<AgentId>,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<(Meeting, Client)>>;
}

pub trait MeetingWriter {
    fn create_meeting(&self, new_meeting: &NewMeeting) -> RepositoryResult<Meeting>;
    fn update_meeting(&self, id: MeetingId, details: &MeetingDetails)
    -> RepositoryResult<Meeting>;
    fn delete_meeting(&self, id: MeetingId) -> RepositoryResult<()>;
}

pub trait DocumentReader {
    fn get_document(&self, public_id: PublicId) -> RepositoryResult<Option<Document>>;
    fn list_documents(&self, client_id: ClientId) -> RepositoryResult<Vec<Document>>;
}

pub trait DocumentWriter {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
    fn delete_document(&self, id: DocumentId) -> RepositoryResult<()>;
}

pub trait TagReader {
    fn get_tag(&self, id: TagId) -> RepositoryResult<Option<Tag>>;
    fn list_tags(&self) -> RepositoryResult<Vec<TagUsage>>;
    fn list_client_tags(&self, client_id: ClientId) -> RepositoryResult<Vec<Tag>>;
}

pub trait TagWriter {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
    fn update_tag(&self, id: TagId, tag: &NewTag) -> RepositoryResult<Tag>;
    fn delete_tag(&self, id: TagId) -> RepositoryResult<()>;
    /// Replaces the full tag set of a client.
    fn set_client_tags(&self, client_id: ClientId, tag_ids: &[TagId]) -> RepositoryResult<usize>;
}

pub trait SettingReader {
    fn list_settings(&self) -> RepositoryResult<Vec<AdminSetting>>;
}

pub trait SettingWriter {
    fn save_settings(&self, pairs: &[(String, String)]) -> RepositoryResult<()>;
}

pub trait AuditReader {
    fn list_audit_logs(&self, query: AuditListQuery) -> RepositoryResult<(usize, Vec<AuditLog>)>;
}

pub trait AuditWriter {
    fn create_audit_log(&self, entry: &NewAuditLog) -> RepositoryResult<()>;
    /// Deletes entries created strictly before `cutoff`, returning the count.
    fn purge_audit_logs_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<usize>;
}
