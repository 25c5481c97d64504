use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::client::{Client, NewClient};
use crate::domain::types::{AgentId, TagId};
use crate::dto::client::{ClientView, display_name};
use crate::dto::main::{ExpiringPolicy, IndexPageData, UpcomingMeeting};
pub use crate::dto::main::IndexQuery;
use crate::forms::client::{ClientForm, ClientPayload};
use crate::forms::main::{ImportedClient, UploadClientsForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AgentReader, AgentWriter, AuditWriter, ClientListQuery, ClientReader, ClientWriter,
    MeetingReader, PolicyReader, SettingReader, TagReader,
};
use crate::services::access::{Actor, load_live_client, resolve_actor, resolve_admin};
use crate::services::audit::record;
use crate::services::settings::load_settings;
use crate::services::{ServiceError, ServiceResult};

/// Dashboard window for meetings.
pub const UPCOMING_MEETING_DAYS: i64 = 7;
/// Dashboard window for policies running out.
pub const EXPIRING_POLICY_DAYS: i64 = 30;

/// Loads the clients list and dashboard for the main index page.
pub fn load_index_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: IndexQuery,
    now: NaiveDateTime,
) -> ServiceResult<IndexPageData>
where
    R: AgentReader
        + AgentWriter
        + AuditWriter
        + ClientReader
        + MeetingReader
        + PolicyReader
        + SettingReader
        + TagReader
        + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let settings = load_settings(repo)?;
    let mask = actor.mask_policy(None, query.show_confidential, &settings);

    let page = query.page.unwrap_or(1).max(1);
    let mut list_query = ClientListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(agent_id) = actor.scope() {
        list_query = list_query.agent(agent_id);
    }

    let search_query = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }

    let tag_id = query.tag.map(TagId::new).transpose()?;
    if let Some(tag_id) = tag_id {
        list_query = list_query.tag(tag_id);
    }

    let (total, clients) = repo.list_clients(list_query).map_err(|err| {
        log::error!("Failed to list clients: {err}");
        err
    })?;
    let clients = Paginated::new(clients, page, total, DEFAULT_ITEMS_PER_PAGE)
        .map(|client| ClientView::new(&client, mask));

    let upcoming_meetings = repo
        .list_upcoming_meetings(
            actor.scope(),
            now,
            now + Duration::days(UPCOMING_MEETING_DAYS),
        )?
        .into_iter()
        .map(|(meeting, client)| UpcomingMeeting {
            meeting_id: meeting.id.get(),
            client_id: client.id.get(),
            client_name: display_name(&client, mask),
            scheduled_at: meeting.scheduled_at,
            location: meeting.location,
            purpose: meeting.purpose,
        })
        .collect();

    let today = now.date();
    let expiring_policies = repo
        .list_policies_ending_between(
            actor.scope(),
            today,
            today + Duration::days(EXPIRING_POLICY_DAYS),
        )?
        .into_iter()
        .filter_map(|(policy, client)| {
            Some(ExpiringPolicy {
                policy_id: policy.id.get(),
                client_id: client.id.get(),
                client_name: display_name(&client, mask),
                insurer: policy.insurer.into_inner(),
                product_name: policy.product_name.into_inner(),
                end_date: policy.end_date?,
            })
        })
        .collect();

    let agents = if actor.is_admin {
        repo.list_agents_with_client_counts()?
            .into_iter()
            .map(|row| row.agent)
            .filter(|agent| agent.is_active)
            .collect()
    } else {
        Vec::new()
    };

    let tags = repo.list_tags()?;

    record(
        repo,
        &actor,
        AuditAction::View,
        AuditEntity::ClientList,
        None,
        json!({
            "page": page,
            "search": search_query.is_some(),
            "tag": tag_id.map(TagId::get),
        }),
    );
    if mask.show_confidential {
        record(
            repo,
            &actor,
            AuditAction::Reveal,
            AuditEntity::ClientList,
            None,
            json!({ "page": page }),
        );
    }

    Ok(IndexPageData {
        clients,
        search_query,
        tag_id: tag_id.map(TagId::get),
        tags,
        upcoming_meetings,
        expiring_policies,
        agents,
        show_confidential: mask.show_confidential,
        can_reveal: actor.can_reveal(None, &settings),
        is_admin: actor.is_admin,
    })
}

/// Picks the agent a new client is assigned to. Only admins may choose.
fn assigned_agent<R>(repo: &R, actor: &Actor, requested: Option<AgentId>) -> ServiceResult<AgentId>
where
    R: AgentReader + ?Sized,
{
    match requested {
        Some(agent_id) if actor.is_admin && agent_id != actor.agent.id => {
            match repo.get_agent_by_id(agent_id)? {
                Some(agent) if agent.is_active => Ok(agent.id),
                _ => Err(ServiceError::Form("Agent not found or inactive".to_string())),
            }
        }
        _ => Ok(actor.agent.id),
    }
}

/// Validates the add-client form and persists a new client record.
pub fn add_client<R>(repo: &R, user: &AuthenticatedUser, form: ClientForm) -> ServiceResult<Client>
where
    R: AgentReader + AgentWriter + AuditWriter + ClientReader + ClientWriter + SettingReader + ?Sized,
{
    let actor = resolve_actor(repo, user)?;

    let payload = ClientPayload::try_from(form).map_err(|err| {
        log::warn!("Invalid client form: {err}");
        ServiceError::from(err)
    })?;
    let settings = load_settings(repo)?;
    let payload = payload.with_default_level(settings.default_privacy_level);

    if let Some(referrer_id) = payload.referrer_id {
        load_live_client(repo, &actor, referrer_id.get()).map_err(|err| match err {
            ServiceError::NotFound => ServiceError::Form("Referrer not found".to_string()),
            other => other,
        })?;
    }

    let agent_id = assigned_agent(repo, &actor, payload.agent_id)?;
    let new_client = NewClient::new(agent_id, payload.referrer_id, payload.profile);

    let client = repo.create_client(&new_client).map_err(|err| {
        log::error!("Failed to add a client: {err}");
        err
    })?;

    record(
        repo,
        &actor,
        AuditAction::Create,
        AuditEntity::Client,
        Some(client.id.get()),
        json!({ "agent_id": agent_id.get() }),
    );

    Ok(client)
}

/// Parses the uploaded CSV file and creates client records in bulk.
pub fn upload_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &UploadClientsForm,
) -> ServiceResult<usize>
where
    R: AgentReader + AgentWriter + AuditWriter + ClientWriter + SettingReader + ?Sized,
{
    let actor = resolve_admin(repo, user)?;

    let imported = form.parse().map_err(|err| {
        log::warn!("Failed to parse clients: {err}");
        ServiceError::Form(format!("Failed to parse the CSV file: {err}"))
    })?;

    import_clients(repo, &actor, imported)
}

/// Assigns parsed rows to agents and stores them in one batch.
///
/// Rows naming an unknown or inactive agent are assigned to the importing
/// admin.
pub fn import_clients<R>(
    repo: &R,
    actor: &Actor,
    imported: Vec<ImportedClient>,
) -> ServiceResult<usize>
where
    R: AgentReader + AuditWriter + ClientWriter + SettingReader + ?Sized,
{
    let settings = load_settings(repo)?;
    let mut agents: HashMap<String, AgentId> = HashMap::new();
    let mut new_clients = Vec::with_capacity(imported.len());

    for row in imported {
        let row = row.with_default_level(settings.default_privacy_level);
        let agent_id = match &row.agent_email {
            None => actor.agent.id,
            Some(email) => match agents.get(email.as_str()) {
                Some(agent_id) => *agent_id,
                None => {
                    let agent_id = match repo.get_agent_by_email(email)? {
                        Some(agent) if agent.is_active => agent.id,
                        _ => {
                            log::warn!("Unknown agent {email} in import, using importer");
                            actor.agent.id
                        }
                    };
                    agents.insert(email.as_str().to_string(), agent_id);
                    agent_id
                }
            },
        };
        new_clients.push(NewClient::new(agent_id, None, row.profile));
    }

    let created = repo.create_clients(&new_clients).map_err(|err| {
        log::error!("Failed to add clients: {err}");
        err
    })?;

    record(
        repo,
        actor,
        AuditAction::Import,
        AuditEntity::ClientList,
        None,
        json!({ "count": created }),
    );

    Ok(created)
}
