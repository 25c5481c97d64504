//! Insurance policies held by a client.

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::client::Client;
use crate::domain::policy::{NewPolicy, Policy, PolicyDetails};
use crate::domain::types::PolicyId;
use crate::forms::policies::PolicyForm;
use crate::repository::{AgentWriter, AuditWriter, ClientReader, PolicyReader, PolicyWriter};
use crate::services::access::{Actor, load_live_client, resolve_actor};
use crate::services::audit::record;
use crate::services::{ServiceError, ServiceResult};

fn parse_details(form: PolicyForm) -> ServiceResult<PolicyDetails> {
    PolicyDetails::try_from(form).map_err(|err| {
        log::warn!("Invalid policy form: {err}");
        ServiceError::from(err)
    })
}

/// Loads a policy that belongs to `client`.
fn load_policy<R>(repo: &R, client: &Client, policy_id: i32) -> ServiceResult<Policy>
where
    R: PolicyReader + ?Sized,
{
    let policy_id = PolicyId::new(policy_id)?;
    match repo.get_policy(policy_id)? {
        Some(policy) if policy.client_id == client.id => Ok(policy),
        _ => Err(ServiceError::NotFound),
    }
}

fn audit<R>(repo: &R, actor: &Actor, action: AuditAction, policy: &Policy)
where
    R: AuditWriter + ?Sized,
{
    record(
        repo,
        actor,
        action,
        AuditEntity::Policy,
        Some(policy.id.get()),
        json!({ "client_id": policy.client_id.get(), "status": policy.status }),
    );
}

pub fn add_policy<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: PolicyForm,
) -> ServiceResult<Policy>
where
    R: AgentWriter + AuditWriter + ClientReader + PolicyWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;
    let details = parse_details(form)?;

    let policy = repo
        .create_policy(&NewPolicy::new(client.id, details))
        .map_err(|err| {
            log::error!("Failed to add policy: {err}");
            err
        })?;

    audit(repo, &actor, AuditAction::Create, &policy);
    Ok(policy)
}

pub fn update_policy<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    policy_id: i32,
    form: PolicyForm,
) -> ServiceResult<Policy>
where
    R: AgentWriter + AuditWriter + ClientReader + PolicyReader + PolicyWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;
    let existing = load_policy(repo, &client, policy_id)?;
    let details = parse_details(form)?;

    let policy = repo.update_policy(existing.id, &details).map_err(|err| {
        log::error!("Failed to update policy: {err}");
        err
    })?;

    audit(repo, &actor, AuditAction::Update, &policy);
    Ok(policy)
}

pub fn delete_policy<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    policy_id: i32,
) -> ServiceResult<()>
where
    R: AgentWriter + AuditWriter + ClientReader + PolicyReader + PolicyWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;
    let policy = load_policy(repo, &client, policy_id)?;

    repo.delete_policy(policy.id).map_err(|err| {
        log::error!("Failed to delete policy: {err}");
        err
    })?;

    audit(repo, &actor, AuditAction::Delete, &policy);
    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::domain::policy::{PaymentCycle, PolicyKind, PolicyStatus};
    use crate::domain::types::{Cents, ClientId, InsurerName, PolicyNumber, ProductName};
    use crate::services::test_support::{agent, agent_user, client_of, other_agent_id, repo_with_agent};

    fn form() -> PolicyForm {
        PolicyForm {
            insurer: "Acme Life".to_string(),
            product_name: "Term 20".to_string(),
            policy_number: "AL-001".to_string(),
            kind: "life".to_string(),
            premium: "120.00".to_string(),
            payment_cycle: "monthly".to_string(),
            start_date: "2024-05-01".to_string(),
            end_date: "2044-05-01".to_string(),
            status: String::new(),
        }
    }

    fn policy(client_id: ClientId) -> Policy {
        let now = Utc::now().naive_utc();
        Policy {
            id: PolicyId::new(7).unwrap(),
            client_id,
            insurer: InsurerName::new("Acme Life").unwrap(),
            product_name: ProductName::new("Term 20").unwrap(),
            policy_number: PolicyNumber::new("AL-001").unwrap(),
            kind: PolicyKind::Life,
            premium: Cents::new(12_000).unwrap(),
            payment_cycle: PaymentCycle::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            end_date: None,
            status: PolicyStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn policy_is_added_to_visible_client() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_create_policy()
            .withf(|new_policy| {
                new_policy.client_id.get() == 10
                    && new_policy.details.premium.get() == 12_000
                    && new_policy.details.status == PolicyStatus::Active
            })
            .times(1)
            .returning(|new_policy| Ok(policy(new_policy.client_id)));

        add_policy(&repo, &agent_user(), 10, form()).unwrap();
    }

    #[test]
    fn foreign_client_policies_are_hidden() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(other_agent_id()))));
        repo.expect_create_policy().times(0);

        assert!(matches!(
            add_policy(&repo, &agent_user(), 10, form()),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn policy_of_another_client_cannot_be_changed() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_get_policy()
            .returning(|_| Ok(Some(policy(ClientId::new(99).unwrap()))));
        repo.expect_delete_policy().times(0);

        assert!(matches!(
            delete_policy(&repo, &agent_user(), 10, 7),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn invalid_period_is_a_form_error() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_get_policy()
            .returning(|_| Ok(Some(policy(ClientId::new(10).unwrap()))));
        repo.expect_update_policy().times(0);

        let mut bad = form();
        bad.end_date = "2020-01-01".to_string();

        assert!(matches!(
            update_policy(&repo, &agent_user(), 10, 7, bad),
            Err(ServiceError::Form(_))
        ));
    }
}
