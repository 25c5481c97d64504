//! Mock repository implementations for isolating services in tests.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

use crate::domain::agent::{Agent, AgentWithClientCount, NewAgent};
use crate::domain::audit::{AuditLog, NewAuditLog};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::document::{Document, NewDocument};
use crate::domain::meeting::{Meeting, MeetingDetails, NewMeeting};
use crate::domain::policy::{NewPolicy, Policy, PolicyDetails};
use crate::domain::setting::AdminSetting;
use crate::domain::tag::{NewTag, Tag, TagUsage};
use crate::domain::types::{
    AgentEmail, AgentId, ClientId, DocumentId, MeetingId, PolicyId, PublicId, TagId,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    AgentReader, AgentWriter, AuditListQuery, AuditReader, AuditWriter, ClientListQuery,
    ClientReader, ClientWriter, DocumentReader, DocumentWriter, MeetingReader, MeetingWriter,
    PolicyReader, PolicyWriter, SettingReader, SettingWriter, TagReader, TagWriter,
};

mock! {
    pub Repository {}

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
        fn list_referrals(&self, referrer_id: ClientId) -> RepositoryResult<Vec<Client>>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
        fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
        fn soft_delete_client(&self, id: ClientId, at: NaiveDateTime) -> RepositoryResult<()>;
        fn restore_client(&self, id: ClientId) -> RepositoryResult<()>;
        fn purge_client(&self, id: ClientId) -> RepositoryResult<()>;
        fn transfer_clients(
            &self,
            agent_id: AgentId,
            client_ids: &[ClientId],
        ) -> RepositoryResult<usize>;
    }

    impl AgentReader for Repository {
        fn get_agent_by_id(&self, id: AgentId) -> RepositoryResult<Option<Agent>>;
        fn get_agent_by_email(&self, email: &AgentEmail) -> RepositoryResult<Option<Agent>>;
        fn list_agents_with_client_counts(&self) -> RepositoryResult<Vec<AgentWithClientCount>>;
    }

    impl AgentWriter for Repository {
        fn create_or_update_agent(&self, new_agent: &NewAgent) -> RepositoryResult<Agent>;
        fn set_agent_active(&self, id: AgentId, is_active: bool) -> RepositoryResult<Agent>;
    }

    impl PolicyReader for Repository {
        fn get_policy(&self, id: PolicyId) -> RepositoryResult<Option<Policy>>;
        fn list_policies(&self, client_id: ClientId) -> RepositoryResult<Vec<Policy>>;
        fn list_policies_ending_between(
            &self,
            agent_id: Option<AgentId>,
            from: NaiveDate,
            to: NaiveDate,
        ) -> RepositoryResult<Vec<(Policy, Client)>>;
    }

    impl PolicyWriter for Repository {
        fn create_policy(&self, new_policy: &NewPolicy) -> RepositoryResult<Policy>;
        fn update_policy(&self, id: PolicyId, details: &PolicyDetails) -> RepositoryResult<Policy>;
        fn delete_policy(&self, id: PolicyId) -> RepositoryResult<()>;
    }

    impl MeetingReader for Repository {
        fn get_meeting(&self, id: MeetingId) -> RepositoryResult<Option<Meeting>>;
        fn list_meetings(&self, client_id: ClientId) -> RepositoryResult<Vec<Meeting>>;
        fn list_upcoming_meetings(
            &self,
            agent_id: Option<AgentId>,
            from: NaiveDateTime,
            to: NaiveDateTime,
        ) -> RepositoryResult<Vec<(Meeting, Client)>>;
    }

    impl MeetingWriter for Repository {
        fn create_meeting(&self, new_meeting: &NewMeeting) -> RepositoryResult<Meeting>;
        fn update_meeting(
            &self,
            id: MeetingId,
            details: &MeetingDetails,
        ) -> RepositoryResult<Meeting>;
        fn delete_meeting(&self, id: MeetingId) -> RepositoryResult<()>;
    }

    impl DocumentReader for Repository {
        fn get_document(&self, public_id: PublicId) -> RepositoryResult<Option<Document>>;
        fn list_documents(&self, client_id: ClientId) -> RepositoryResult<Vec<Document>>;
    }

    impl DocumentWriter for Repository {
        fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document>;
        fn delete_document(&self, id: DocumentId) -> RepositoryResult<()>;
    }

    impl TagReader for Repository {
        fn get_tag(&self, id: TagId) -> RepositoryResult<Option<Tag>>;
        fn list_tags(&self) -> RepositoryResult<Vec<TagUsage>>;
        fn list_client_tags(&self, client_id: ClientId) -> RepositoryResult<Vec<Tag>>;
    }

    impl TagWriter for Repository {
        fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
        fn update_tag(&self, id: TagId, tag: &NewTag) -> RepositoryResult<Tag>;
        fn delete_tag(&self, id: TagId) -> RepositoryResult<()>;
        fn set_client_tags(
            &self,
            client_id: ClientId,
            tag_ids: &[TagId],
        ) -> RepositoryResult<usize>;
    }

    impl SettingReader for Repository {
        fn list_settings(&self) -> RepositoryResult<Vec<AdminSetting>>;
    }

    impl SettingWriter for Repository {
        fn save_settings(&self, pairs: &[(String, String)]) -> RepositoryResult<()>;
    }

    impl AuditReader for Repository {
        fn list_audit_logs(
            &self,
            query: AuditListQuery,
        ) -> RepositoryResult<(usize, Vec<AuditLog>)>;
    }

    impl AuditWriter for Repository {
        fn create_audit_log(&self, entry: &NewAuditLog) -> RepositoryResult<()>;
        fn purge_audit_logs_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<usize>;
    }
}
