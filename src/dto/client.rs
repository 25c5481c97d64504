//! Masked views of client data handed to templates and the JSON API.
//!
//! Views are the only place where stored values meet a [`MaskPolicy`]; the
//! raw domain structs never reach a template.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::agent::Agent;
use crate::domain::client::Client;
use crate::domain::document::Document;
use crate::domain::meeting::{Meeting, MeetingStatus};
use crate::domain::policy::{PaymentCycle, Policy, PolicyKind, PolicyStatus};
use crate::domain::privacy::{MaskPolicy, PrivacyLevel};
use crate::domain::tag::{Tag, TagUsage};

/// Names stay readable so agents can tell clients apart; only confidential
/// records shorten them.
fn name_level(level: PrivacyLevel) -> PrivacyLevel {
    if level == PrivacyLevel::Confidential {
        PrivacyLevel::Private
    } else {
        PrivacyLevel::Public
    }
}

/// Client name as shown in lists and dashboards.
pub fn display_name(client: &Client, policy: MaskPolicy) -> String {
    policy.value(client.name.as_str(), name_level(client.privacy_level))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientView {
    pub id: i32,
    pub agent_id: i32,
    pub referrer_id: Option<i32>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<String>,
    pub occupation: Option<String>,
    pub notes: Option<String>,
    pub privacy_level: PrivacyLevel,
    /// `true` when at least one field is shown masked; edit forms are only
    /// offered for unmasked views.
    pub masked: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl ClientView {
    pub fn new(client: &Client, policy: MaskPolicy) -> Self {
        let level = client.privacy_level;
        Self {
            id: client.id.get(),
            agent_id: client.agent_id.get(),
            referrer_id: client.referrer_id.map(|id| id.get()),
            name: display_name(client, policy),
            phone: policy.optional(client.phone.as_ref().map(|p| p.as_str()), level),
            email: client
                .email
                .as_ref()
                .map(|email| policy.email(email.as_str(), level)),
            address: policy.optional(client.address.as_deref(), level),
            birth_date: client
                .birth_date
                .map(|date| policy.value(&date.format("%Y-%m-%d").to_string(), level)),
            occupation: policy.optional(client.occupation.as_deref(), level),
            notes: policy.optional(client.notes.as_deref(), level),
            privacy_level: level,
            masked: !policy.show_confidential && level != PrivacyLevel::Public,
            created_at: client.created_at,
            updated_at: client.updated_at,
            deleted_at: client.deleted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PolicyView {
    pub id: i32,
    pub client_id: i32,
    pub insurer: String,
    pub product_name: String,
    pub policy_number: String,
    pub kind: PolicyKind,
    /// Formatted as `1250.50`.
    pub premium: String,
    pub payment_cycle: PaymentCycle,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: PolicyStatus,
    pub masked: bool,
}

impl PolicyView {
    /// The policy number follows the owning client's privacy level.
    pub fn new(policy: &Policy, level: PrivacyLevel, mask: MaskPolicy) -> Self {
        Self {
            id: policy.id.get(),
            client_id: policy.client_id.get(),
            insurer: policy.insurer.as_str().to_string(),
            product_name: policy.product_name.as_str().to_string(),
            policy_number: mask.value(policy.policy_number.as_str(), level),
            kind: policy.kind,
            premium: policy.premium.to_string(),
            payment_cycle: policy.payment_cycle,
            start_date: policy.start_date,
            end_date: policy.end_date,
            status: policy.status,
            masked: !mask.show_confidential && level != PrivacyLevel::Public,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MeetingView {
    pub id: i32,
    pub client_id: i32,
    pub agent_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub location: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub status: MeetingStatus,
}

impl MeetingView {
    /// Meeting notes may hold client details and follow the client's level.
    pub fn new(meeting: &Meeting, level: PrivacyLevel, mask: MaskPolicy) -> Self {
        Self {
            id: meeting.id.get(),
            client_id: meeting.client_id.get(),
            agent_id: meeting.agent_id.get(),
            scheduled_at: meeting.scheduled_at,
            location: meeting.location.clone(),
            purpose: meeting.purpose.clone(),
            notes: mask.optional(meeting.notes.as_deref(), level),
            status: meeting.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentView {
    pub public_id: String,
    pub title: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub privacy_level: PrivacyLevel,
    /// Hidden documents are listed without title and cannot be downloaded.
    pub hidden: bool,
    pub created_at: NaiveDateTime,
}

impl DocumentView {
    pub fn new(document: &Document, mask: MaskPolicy) -> Self {
        let level = document.privacy_level;
        let hidden = mask.hides(level);
        Self {
            public_id: document.public_id.to_string(),
            title: mask.value(document.title.as_str(), level),
            file_name: mask.value(&document.file_name, level),
            content_type: document.content_type.clone(),
            size_bytes: document.size_bytes,
            privacy_level: level,
            hidden,
            created_at: document.created_at,
        }
    }
}

/// Everything shown on the client page.
#[derive(Debug, Serialize)]
pub struct ClientPageData {
    pub client: ClientView,
    pub agent: Option<Agent>,
    pub referrer: Option<ClientView>,
    pub referrals: Vec<ClientView>,
    pub policies: Vec<PolicyView>,
    pub meetings: Vec<MeetingView>,
    pub documents: Vec<DocumentView>,
    pub tags: Vec<Tag>,
    pub available_tags: Vec<TagUsage>,
    /// Whether values are currently revealed.
    pub show_confidential: bool,
    /// Whether the viewer may use the reveal toggle for this client.
    pub can_reveal: bool,
    pub is_admin: bool,
}

/// A stored document ready to be streamed back.
#[derive(Debug)]
pub struct DocumentDownload {
    pub path: std::path::PathBuf,
    pub file_name: String,
    pub content_type: Option<String>,
}

/// Query string of the client page.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ClientPageQuery {
    #[serde(default)]
    pub show_confidential: bool,
}
