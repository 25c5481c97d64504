//! Fixtures shared by the service unit tests.

use chrono::{NaiveDate, Utc};

use crate::auth::AuthenticatedUser;
use crate::domain::agent::Agent;
use crate::domain::client::Client;
use crate::domain::privacy::PrivacyLevel;
use crate::domain::types::{
    AgentEmail, AgentId, AgentName, ClientEmail, ClientId, ClientName, PhoneNumber,
};
use crate::repository::mock::MockRepository;
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

fn user(sub: &str, email: &str, roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: sub.to_string(),
        email: email.to_string(),
        name: "Test User".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: 0,
    }
}

pub fn admin_user() -> AuthenticatedUser {
    user(
        "1",
        "admin@example.com",
        &[SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE],
    )
}

pub fn agent_user() -> AuthenticatedUser {
    user("2", "agent@example.com", &[SERVICE_ACCESS_ROLE])
}

/// Signed in, but without access to the CRM.
pub fn viewer_user() -> AuthenticatedUser {
    user("3", "viewer@example.com", &[])
}

pub fn agent() -> Agent {
    Agent {
        id: AgentId::new(1).expect("valid agent id"),
        name: AgentName::new("Agent").expect("valid name"),
        email: AgentEmail::new("agent@example.com").expect("valid email"),
        phone: None,
        is_active: true,
        created_at: Utc::now().naive_utc(),
    }
}

pub fn other_agent_id() -> AgentId {
    AgentId::new(2).expect("valid agent id")
}

pub fn client_of(agent_id: AgentId) -> Client {
    let now = Utc::now().naive_utc();
    Client {
        id: ClientId::new(10).expect("valid client id"),
        agent_id,
        referrer_id: None,
        name: ClientName::new("Kim Minsu").expect("valid name"),
        phone: Some(PhoneNumber::new("+821012345678").expect("valid phone")),
        email: Some(ClientEmail::new("minsu@example.com").expect("valid email")),
        address: Some("12 Sejong-daero, Seoul".to_string()),
        birth_date: NaiveDate::from_ymd_opt(1985, 2, 3),
        occupation: Some("Engineer".to_string()),
        notes: None,
        privacy_level: PrivacyLevel::Restricted,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// Mock that resolves any user to [`agent`], accepts audit writes and
/// returns default settings.
pub fn repo_with_agent() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.expect_create_or_update_agent()
        .returning(|_| Ok(agent()));
    repo.expect_list_settings().returning(|| Ok(Vec::new()));
    repo.expect_create_audit_log().returning(|_| Ok(()));
    repo
}
