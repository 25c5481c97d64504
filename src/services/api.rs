use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::privacy::MaskPolicy;
use crate::dto::api::{ClientsQuery, ClientsResponse};
use crate::dto::client::ClientView;
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{AgentWriter, AuditWriter, ClientListQuery, ClientReader};
use crate::services::ServiceResult;
use crate::services::access::resolve_actor;
use crate::services::audit::record;

/// Returns the filtered list of clients visible to the authenticated user.
///
/// Values are always masked; the API has no reveal toggle.
pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ClientsQuery,
) -> ServiceResult<ClientsResponse>
where
    R: AgentWriter + AuditWriter + ClientReader + ?Sized,
{
    let actor = resolve_actor(repo, user)?;

    let page = params.page.unwrap_or(1).max(1);
    let mut query = ClientListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(agent_id) = actor.scope() {
        query = query.agent(agent_id);
    }

    let search = params
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(term) = &search {
        query = query.search(term.clone());
    }

    let (total, clients) = repo.list_clients(query).map_err(|err| {
        log::error!("Failed to list clients: {err}");
        err
    })?;

    record(
        repo,
        &actor,
        AuditAction::View,
        AuditEntity::ClientList,
        None,
        json!({ "api": true, "page": page, "search": search.is_some() }),
    );

    Ok(ClientsResponse {
        total,
        clients: clients
            .iter()
            .map(|client| ClientView::new(client, MaskPolicy::MASKED))
            .collect(),
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use crate::services::test_support::{
        admin_user, agent, agent_user, client_of, repo_with_agent, viewer_user,
    };

    #[test]
    fn api_requires_access_role() {
        let repo = repo_with_agent();
        let result = list_clients(&repo, &viewer_user(), ClientsQuery::default());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn agents_get_their_own_masked_clients() {
        let mut repo = repo_with_agent();
        repo.expect_list_clients()
            .withf(|query| {
                query.agent_id == Some(agent().id) && query.search.as_deref() == Some("kim")
            })
            .returning(|_| Ok((1, vec![client_of(agent().id)])));

        let params = ClientsQuery {
            search: Some(" kim ".to_string()),
            page: None,
        };
        let response = list_clients(&repo, &agent_user(), params).unwrap();

        assert_eq!(response.total, 1);
        assert_eq!(response.clients[0].phone.as_deref(), Some("+8*********78"));
    }

    #[test]
    fn admins_query_every_book() {
        let mut repo = repo_with_agent();
        repo.expect_list_clients()
            .withf(|query| query.agent_id.is_none())
            .returning(|_| Ok((0, Vec::new())));

        let response = list_clients(&repo, &admin_user(), ClientsQuery::default()).unwrap();
        assert!(response.clients.is_empty());
    }
}
