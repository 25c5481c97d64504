//! Who is acting, and what they may see.

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::agent::{Agent, NewAgent};
use crate::domain::client::Client;
use crate::domain::privacy::MaskPolicy;
use crate::domain::setting::Settings;
use crate::domain::types::{AgentId, ClientId};
use crate::repository::{AgentWriter, ClientReader};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

/// The signed-in user together with their agent record.
#[derive(Debug, Clone)]
pub struct Actor {
    pub email: String,
    pub agent: Agent,
    pub is_admin: bool,
}

/// Checks the access role and upserts the agent record for the user.
///
/// Agents deactivated in the backoffice are refused even with a valid token.
pub fn resolve_actor<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Actor>
where
    R: AgentWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let new_agent = NewAgent::try_from(user)?;
    let agent = repo.create_or_update_agent(&new_agent).map_err(|err| {
        log::error!("Failed to update agent: {err}");
        err
    })?;

    if !agent.is_active {
        log::warn!("Inactive agent {} tried to sign in", agent.email);
        return Err(ServiceError::Unauthorized);
    }

    Ok(Actor {
        email: agent.email.as_str().to_string(),
        is_admin: user.is_admin(),
        agent,
    })
}

/// Like [`resolve_actor`] but also requires the admin role.
pub fn resolve_admin<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Actor>
where
    R: AgentWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;
    resolve_actor(repo, user)
}

impl Actor {
    /// Agent filter for list queries; admins see every book.
    pub fn scope(&self) -> Option<AgentId> {
        (!self.is_admin).then_some(self.agent.id)
    }

    pub fn can_see(&self, client: &Client) -> bool {
        self.is_admin || client.agent_id == self.agent.id
    }

    /// Whether the "show confidential" toggle may be honoured for `client`.
    /// `None` stands for a list limited to the actor's own clients.
    pub fn can_reveal(&self, client: Option<&Client>, settings: &Settings) -> bool {
        self.is_admin
            || (settings.allow_agent_reveal
                && client.is_none_or(|c| c.agent_id == self.agent.id))
    }

    /// Turns the requested toggle into the policy actually applied; a
    /// request the actor may not make is ignored.
    pub fn mask_policy(
        &self,
        client: Option<&Client>,
        requested: bool,
        settings: &Settings,
    ) -> MaskPolicy {
        MaskPolicy::new(requested && self.can_reveal(client, settings))
    }
}

/// Loads a client the actor may view. Clients of other agents are reported
/// as missing; soft-deleted clients are visible to admins only.
pub fn load_visible_client<R>(repo: &R, actor: &Actor, client_id: i32) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    let client_id = ClientId::new(client_id)?;
    let client = repo
        .get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound)?;

    if !actor.can_see(&client) || (client.is_deleted() && !actor.is_admin) {
        return Err(ServiceError::NotFound);
    }

    Ok(client)
}

/// Loads a visible client that is not in the trash, for changes.
pub fn load_live_client<R>(repo: &R, actor: &Actor, client_id: i32) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    let client = load_visible_client(repo, actor, client_id)?;
    if client.is_deleted() {
        return Err(ServiceError::NotFound);
    }
    Ok(client)
}
