//! Backoffice agent management and client transfers.

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::agent::{Agent, NewAgent};
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::privacy::MaskPolicy;
use crate::domain::types::AgentId;
use crate::dto::admin::AgentsPageData;
use crate::dto::client::ClientView;
use crate::forms::agents::{AddAgentForm, TransferClientsForm, TransferClientsPayload};
use crate::repository::{
    AgentReader, AgentWriter, AuditWriter, ClientListQuery, ClientReader, ClientWriter,
};
use crate::services::access::resolve_admin;
use crate::services::audit::record;
use crate::services::{ServiceError, ServiceResult};

/// Lists agents with their client counts, plus the live clients offered in
/// the transfer form.
pub fn load_agents_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<AgentsPageData>
where
    R: AgentReader + AgentWriter + ClientReader + ?Sized,
{
    resolve_admin(repo, user)?;

    let agents = repo.list_agents_with_client_counts().map_err(|err| {
        log::error!("Failed to list agents: {err}");
        err
    })?;
    let (_total, clients) = repo.list_clients(ClientListQuery::new())?;

    Ok(AgentsPageData {
        agents,
        clients: clients
            .iter()
            .map(|client| ClientView::new(client, MaskPolicy::MASKED))
            .collect(),
    })
}

/// Pre-registers an agent. An existing agent with the same email keeps its
/// record and gets the new name.
pub fn add_agent<R>(repo: &R, user: &AuthenticatedUser, form: AddAgentForm) -> ServiceResult<Agent>
where
    R: AgentWriter + AuditWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;

    let new_agent = NewAgent::try_from(form).map_err(|err| {
        log::warn!("Invalid agent form: {err}");
        ServiceError::from(err)
    })?;

    let agent = repo.create_or_update_agent(&new_agent).map_err(|err| {
        log::error!("Failed to add agent: {err}");
        err
    })?;

    record(
        repo,
        &actor,
        AuditAction::Create,
        AuditEntity::Agent,
        Some(agent.id.get()),
        json!({ "email": agent.email }),
    );

    Ok(agent)
}

/// Flips the active flag. Admins cannot lock themselves out.
pub fn toggle_agent<R>(repo: &R, user: &AuthenticatedUser, agent_id: i32) -> ServiceResult<Agent>
where
    R: AgentReader + AgentWriter + AuditWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;
    let agent_id = AgentId::new(agent_id)?;

    if agent_id == actor.agent.id {
        return Err(ServiceError::Form(
            "You cannot deactivate yourself".to_string(),
        ));
    }

    let agent = repo
        .get_agent_by_id(agent_id)?
        .ok_or(ServiceError::NotFound)?;

    let updated = repo
        .set_agent_active(agent.id, !agent.is_active)
        .map_err(|err| {
            log::error!("Failed to toggle agent: {err}");
            err
        })?;

    record(
        repo,
        &actor,
        AuditAction::Update,
        AuditEntity::Agent,
        Some(updated.id.get()),
        json!({ "is_active": updated.is_active }),
    );

    Ok(updated)
}

/// Reassigns the selected clients to an active agent. Returns the number
/// of moved clients.
pub fn transfer_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: TransferClientsForm,
) -> ServiceResult<usize>
where
    R: AgentReader + AgentWriter + AuditWriter + ClientReader + ClientWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;
    let payload = TransferClientsPayload::try_from(form)?;

    match repo.get_agent_by_id(payload.agent_id)? {
        Some(agent) if agent.is_active => {}
        Some(_) => {
            return Err(ServiceError::Form(
                "Clients cannot be moved to an inactive agent".to_string(),
            ));
        }
        None => return Err(ServiceError::NotFound),
    }

    for client_id in &payload.client_ids {
        match repo.get_client_by_id(*client_id)? {
            Some(client) if !client.is_deleted() => {}
            _ => return Err(ServiceError::Form(format!("Client {client_id} not found"))),
        }
    }

    let moved = repo
        .transfer_clients(payload.agent_id, &payload.client_ids)
        .map_err(|err| {
            log::error!("Failed to transfer clients: {err}");
            err
        })?;

    record(
        repo,
        &actor,
        AuditAction::Transfer,
        AuditEntity::Agent,
        Some(payload.agent_id.get()),
        json!({
            "clients": payload.client_ids.iter().map(|id| id.get()).collect::<Vec<_>>(),
        }),
    );

    Ok(moved)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::services::test_support::{
        admin_user, agent, agent_user, client_of, other_agent_id, repo_with_agent,
    };

    fn other_agent(is_active: bool) -> Agent {
        let mut other = agent();
        other.id = other_agent_id();
        other.is_active = is_active;
        other
    }

    #[test]
    fn agents_page_is_admin_only() {
        let mut repo = repo_with_agent();
        repo.expect_list_agents_with_client_counts().times(0);
        assert!(matches!(
            load_agents_page(&repo, &agent_user()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn admin_cannot_deactivate_themselves() {
        let mut repo = repo_with_agent();
        repo.expect_set_agent_active().times(0);
        assert!(matches!(
            toggle_agent(&repo, &admin_user(), agent().id.get()),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn toggle_flips_active_flag() {
        let mut repo = repo_with_agent();
        repo.expect_get_agent_by_id()
            .returning(|_| Ok(Some(other_agent(true))));
        repo.expect_set_agent_active()
            .withf(|id, active| *id == other_agent_id() && !*active)
            .times(1)
            .returning(|_, _| Ok(other_agent(false)));

        let updated = toggle_agent(&repo, &admin_user(), other_agent_id().get()).unwrap();
        assert!(!updated.is_active);
    }

    #[test]
    fn transfer_requires_active_target() {
        let mut repo = repo_with_agent();
        repo.expect_get_agent_by_id()
            .returning(|_| Ok(Some(other_agent(false))));
        repo.expect_transfer_clients().times(0);

        let form = TransferClientsForm {
            agent_id: other_agent_id().get(),
            client_id: vec![10],
        };
        assert!(matches!(
            transfer_clients(&repo, &admin_user(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn transfer_moves_selected_clients() {
        let mut repo = repo_with_agent();
        repo.expect_get_agent_by_id()
            .returning(|_| Ok(Some(other_agent(true))));
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_transfer_clients()
            .withf(|agent_id, ids| *agent_id == other_agent_id() && ids.len() == 1)
            .times(1)
            .returning(|_, ids| Ok(ids.len()));

        let form = TransferClientsForm {
            agent_id: other_agent_id().get(),
            client_id: vec![10, 10],
        };
        assert_eq!(transfer_clients(&repo, &admin_user(), form).unwrap(), 1);
    }
}
