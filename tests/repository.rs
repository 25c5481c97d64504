use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;

use agent_crm::domain::agent::NewAgent;
use agent_crm::domain::audit::{AuditAction, AuditEntity, NewAuditLog};
use agent_crm::domain::client::{ClientProfile, NewClient, UpdateClient};
use agent_crm::domain::document::NewDocument;
use agent_crm::domain::meeting::{MeetingDetails, MeetingStatus, NewMeeting};
use agent_crm::domain::policy::{NewPolicy, PaymentCycle, PolicyDetails, PolicyKind, PolicyStatus};
use agent_crm::domain::privacy::PrivacyLevel;
use agent_crm::domain::tag::NewTag;
use agent_crm::domain::types::{
    AgentId, Cents, CleanText, DocumentTitle, InsurerName, PolicyNumber, ProductName, PublicId,
    TagColor, TagName,
};
use agent_crm::repository::{
    AgentReader, AgentWriter, AuditListQuery, AuditReader, AuditWriter, ClientListQuery,
    ClientReader, ClientWriter, DocumentReader, DocumentWriter, MeetingReader, MeetingWriter,
    PolicyReader, PolicyWriter, SettingReader, SettingWriter, TagReader, TagWriter,
};

mod common;

fn profile(name: &str, phone: &str) -> ClientProfile {
    ClientProfile::try_new(
        name,
        Some(phone),
        None,
        Some("12 Harbour Rd"),
        None,
        None,
        None,
        PrivacyLevel::Restricted,
    )
    .unwrap()
}

fn agent(repo: &impl AgentWriter, name: &str, email: &str) -> AgentId {
    repo.create_or_update_agent(&NewAgent::try_new(name, email, None).unwrap())
        .unwrap()
        .id
}

fn policy_details(end: Option<NaiveDate>) -> PolicyDetails {
    PolicyDetails {
        insurer: InsurerName::new("Acme Life").unwrap(),
        product_name: ProductName::new("Term 20").unwrap(),
        policy_number: PolicyNumber::new("AL-001").unwrap(),
        kind: PolicyKind::Life,
        premium: Cents::new(12_000).unwrap(),
        payment_cycle: PaymentCycle::Monthly,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: end,
        status: PolicyStatus::Active,
    }
}

#[test]
fn test_client_repository_crud() {
    let test_db = common::TestDb::new("test_client_repository_crud.db");
    let repo = test_db.repo();
    let agent_id = agent(&repo, "Jane Agent", "jane@example.com");

    let alice = NewClient::new(agent_id, None, profile("Alice", "+14155550100"));
    let bob = NewClient::new(agent_id, None, profile("Bob", "+14155550101"));
    assert_eq!(repo.create_clients(&[alice, bob]).unwrap(), 2);

    let (total, items) = repo.list_clients(ClientListQuery::new()).unwrap();
    assert_eq!(total, 2);
    assert_eq!(items[0].name.as_str(), "Alice");
    let alice = items[0].clone();
    let bob = items[1].clone();

    let (found, matches) = repo
        .list_clients(ClientListQuery::new().search("Bob"))
        .unwrap();
    assert_eq!(found, 1);
    assert_eq!(matches[0].id, bob.id);

    let updated = repo
        .update_client(
            bob.id,
            &UpdateClient::new(Some(alice.id), profile("Bobby", "+14155550101")),
        )
        .unwrap();
    assert_eq!(updated.name.as_str(), "Bobby");
    assert_eq!(updated.referrer_id, Some(alice.id));

    let referrals = repo.list_referrals(alice.id).unwrap();
    assert_eq!(referrals.len(), 1);
    assert_eq!(referrals[0].id, bob.id);
}

#[test]
fn test_soft_delete_restore_and_purge() {
    let test_db = common::TestDb::new("test_soft_delete.db");
    let repo = test_db.repo();
    let agent_id = agent(&repo, "Jane Agent", "jane@example.com");

    let client = repo
        .create_client(&NewClient::new(agent_id, None, profile("Carol", "+14155550102")))
        .unwrap();
    repo.create_policy(&NewPolicy::new(client.id, policy_details(None)))
        .unwrap();

    repo.soft_delete_client(client.id, Utc::now().naive_utc())
        .unwrap();
    assert!(repo.soft_delete_client(client.id, Utc::now().naive_utc()).is_err());

    let (live, _) = repo.list_clients(ClientListQuery::new()).unwrap();
    assert_eq!(live, 0);
    let (trashed, items) = repo.list_clients(ClientListQuery::new().deleted()).unwrap();
    assert_eq!(trashed, 1);
    assert!(items[0].is_deleted());

    repo.restore_client(client.id).unwrap();
    assert!(!repo.get_client_by_id(client.id).unwrap().unwrap().is_deleted());

    repo.purge_client(client.id).unwrap();
    assert!(repo.get_client_by_id(client.id).unwrap().is_none());
    assert!(repo.list_policies(client.id).unwrap().is_empty());
}

#[test]
fn test_agents_scope_and_transfer() {
    let test_db = common::TestDb::new("test_agents.db");
    let repo = test_db.repo();
    let jane = agent(&repo, "Jane Agent", "jane@example.com");
    let omar = agent(&repo, "Omar Agent", "omar@example.com");

    // Upsert by email keeps the id.
    assert_eq!(agent(&repo, "Jane A.", "JANE@example.com"), jane);

    let client = repo
        .create_client(&NewClient::new(jane, None, profile("Dana", "+14155550103")))
        .unwrap();

    let (own, _) = repo.list_clients(ClientListQuery::new().agent(omar)).unwrap();
    assert_eq!(own, 0);

    assert_eq!(repo.transfer_clients(omar, &[client.id]).unwrap(), 1);
    let (own, _) = repo.list_clients(ClientListQuery::new().agent(omar)).unwrap();
    assert_eq!(own, 1);

    let counts = repo.list_agents_with_client_counts().unwrap();
    let omar_row = counts.iter().find(|row| row.agent.id == omar).unwrap();
    assert_eq!(omar_row.client_count, 1);

    let inactive = repo.set_agent_active(omar, false).unwrap();
    assert!(!inactive.is_active);
    assert_eq!(
        repo.get_agent_by_id(omar).unwrap().unwrap().email.as_str(),
        "omar@example.com"
    );
}

#[test]
fn test_policies_and_meetings_dashboard_queries() {
    let test_db = common::TestDb::new("test_dashboard.db");
    let repo = test_db.repo();
    let agent_id = agent(&repo, "Jane Agent", "jane@example.com");
    let client = repo
        .create_client(&NewClient::new(agent_id, None, profile("Evan", "+14155550104")))
        .unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let soon = today + Duration::days(10);
    let later = today + Duration::days(90);
    repo.create_policy(&NewPolicy::new(client.id, policy_details(Some(soon))))
        .unwrap();
    repo.create_policy(&NewPolicy::new(client.id, policy_details(Some(later))))
        .unwrap();

    let ending = repo
        .list_policies_ending_between(Some(agent_id), today, today + Duration::days(30))
        .unwrap();
    assert_eq!(ending.len(), 1);
    assert_eq!(ending[0].0.end_date, Some(soon));

    let now = today.and_hms_opt(9, 0, 0).unwrap();
    let details = MeetingDetails {
        scheduled_at: now + Duration::days(2),
        location: CleanText::new("Cafe"),
        purpose: CleanText::new("Annual review"),
        notes: None,
        status: MeetingStatus::Scheduled,
    };
    let meeting = repo
        .create_meeting(&NewMeeting::new(client.id, agent_id, details.clone()))
        .unwrap();

    let upcoming = repo
        .list_upcoming_meetings(Some(agent_id), now, now + Duration::days(7))
        .unwrap();
    assert_eq!(upcoming.len(), 1);

    let done = MeetingDetails {
        status: MeetingStatus::Completed,
        ..details
    };
    repo.update_meeting(meeting.id, &done).unwrap();
    let upcoming = repo
        .list_upcoming_meetings(Some(agent_id), now, now + Duration::days(7))
        .unwrap();
    assert!(upcoming.is_empty());

    repo.delete_meeting(meeting.id).unwrap();
    assert!(repo.get_meeting(meeting.id).unwrap().is_none());
}

#[test]
fn test_transfer_moves_upcoming_meetings() {
    let test_db = common::TestDb::new("test_transfer_meetings.db");
    let repo = test_db.repo();
    let jane = agent(&repo, "Jane Agent", "jane@example.com");
    let omar = agent(&repo, "Omar Agent", "omar@example.com");
    let client = repo
        .create_client(&NewClient::new(jane, None, profile("Farah", "+14155550105")))
        .unwrap();

    let now = Utc::now().naive_utc();
    let details = MeetingDetails {
        scheduled_at: now + Duration::days(2),
        location: CleanText::new("Office"),
        purpose: CleanText::new("Policy review"),
        notes: None,
        status: MeetingStatus::Scheduled,
    };
    let meeting = repo
        .create_meeting(&NewMeeting::new(client.id, jane, details))
        .unwrap();

    repo.transfer_clients(omar, &[client.id]).unwrap();

    let week = now + Duration::days(7);
    assert!(
        repo.list_upcoming_meetings(Some(jane), now, week)
            .unwrap()
            .is_empty()
    );
    let upcoming = repo.list_upcoming_meetings(Some(omar), now, week).unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].1.id, client.id);
    assert_eq!(repo.get_meeting(meeting.id).unwrap().unwrap().agent_id, omar);
}

#[test]
fn test_documents_and_tags() {
    let test_db = common::TestDb::new("test_documents_tags.db");
    let repo = test_db.repo();
    let agent_id = agent(&repo, "Jane Agent", "jane@example.com");
    let client = repo
        .create_client(&NewClient::new(agent_id, None, profile("Fay", "+14155550105")))
        .unwrap();

    let public_id = PublicId::new();
    let document = repo
        .create_document(&NewDocument {
            public_id,
            client_id: client.id,
            title: DocumentTitle::new("Passport").unwrap(),
            file_name: "passport.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            size_bytes: 2048,
            privacy_level: PrivacyLevel::Confidential,
            uploaded_by: agent_id,
        })
        .unwrap();
    assert_eq!(repo.get_document(public_id).unwrap().unwrap().id, document.id);
    assert_eq!(repo.list_documents(client.id).unwrap().len(), 1);

    let vip = repo
        .create_tag(&NewTag::new(
            TagName::new("VIP").unwrap(),
            TagColor::new("#FF0000").unwrap(),
        ))
        .unwrap();
    assert_eq!(vip.color.as_str(), "#ff0000");
    assert!(
        repo.create_tag(&NewTag::new(
            TagName::new("VIP").unwrap(),
            TagColor::new("#00ff00").unwrap(),
        ))
        .is_err()
    );

    assert_eq!(repo.set_client_tags(client.id, &[vip.id, vip.id]).unwrap(), 1);
    assert_eq!(repo.list_client_tags(client.id).unwrap().len(), 1);
    let (tagged, _) = repo
        .list_clients(ClientListQuery::new().tag(vip.id))
        .unwrap();
    assert_eq!(tagged, 1);
    assert_eq!(repo.list_tags().unwrap()[0].client_count, 1);

    repo.delete_tag(vip.id).unwrap();
    assert!(repo.list_client_tags(client.id).unwrap().is_empty());

    repo.delete_document(document.id).unwrap();
    assert!(repo.get_document(public_id).unwrap().is_none());
}

#[test]
fn test_settings_and_audit_log() {
    let test_db = common::TestDb::new("test_settings_audit.db");
    let repo = test_db.repo();

    repo.save_settings(&[("audit_retention_days".to_string(), "30".to_string())])
        .unwrap();
    repo.save_settings(&[("audit_retention_days".to_string(), "60".to_string())])
        .unwrap();
    let settings = repo.list_settings().unwrap();
    assert_eq!(settings.len(), 1);
    assert_eq!(settings[0].value, "60");

    repo.create_audit_log(
        &NewAuditLog::new("admin@example.com", AuditAction::View, AuditEntity::Client, Some(1))
            .details(json!({ "revealed": false })),
    )
    .unwrap();
    repo.create_audit_log(&NewAuditLog::new(
        "agent@example.com",
        AuditAction::Update,
        AuditEntity::Policy,
        Some(4),
    ))
    .unwrap();

    let (total, logs) = repo
        .list_audit_logs(AuditListQuery::new().actor("Admin@Example.com"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(logs[0].details, json!({ "revealed": false }));

    let (updates, _) = repo
        .list_audit_logs(AuditListQuery::new().action(AuditAction::Update))
        .unwrap();
    assert_eq!(updates, 1);

    let tomorrow = Utc::now().naive_utc() + Duration::days(1);
    assert_eq!(repo.purge_audit_logs_before(tomorrow).unwrap(), 2);
    let (left, _) = repo.list_audit_logs(AuditListQuery::new()).unwrap();
    assert_eq!(left, 0);
}
