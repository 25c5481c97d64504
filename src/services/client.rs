//! Client page and client lifecycle: edit, trash, restore, purge, tags.

use std::path::Path;

use chrono::Utc;
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::client::{Client, UpdateClient};
use crate::domain::privacy::{MaskPolicy, PrivacyLevel};
use crate::dto::admin::{TrashPageData, TrashQuery};
use crate::dto::client::{ClientPageData, ClientView, DocumentView, MeetingView, PolicyView};
use crate::forms::client::{ClientForm, ClientPayload, ClientTagsForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AgentReader, AgentWriter, AuditWriter, ClientListQuery, ClientReader, ClientWriter,
    DocumentReader, MeetingReader, PolicyReader, SettingReader, TagReader, TagWriter,
};
use crate::services::access::{
    Actor, load_live_client, load_visible_client, resolve_actor, resolve_admin,
};
use crate::services::audit::record;
use crate::services::documents::remove_stored_file;
use crate::services::settings::load_settings;
use crate::services::{ServiceError, ServiceResult};

/// Loads everything shown on the client page.
///
/// The reveal toggle is honoured only when the actor may use it for this
/// client; a refused toggle renders the page masked without an error.
pub fn load_client_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    show_confidential: bool,
) -> ServiceResult<ClientPageData>
where
    R: AgentReader
        + AgentWriter
        + AuditWriter
        + ClientReader
        + DocumentReader
        + MeetingReader
        + PolicyReader
        + SettingReader
        + TagReader
        + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_visible_client(repo, &actor, client_id)?;
    let settings = load_settings(repo)?;

    let can_reveal = actor.can_reveal(Some(&client), &settings);
    let mask = MaskPolicy::new(show_confidential && can_reveal);
    let level = client.privacy_level;

    let agent = repo.get_agent_by_id(client.agent_id)?;

    let referrer = match client.referrer_id {
        Some(referrer_id) => repo
            .get_client_by_id(referrer_id)?
            .filter(|referrer| actor.can_see(referrer) && !referrer.is_deleted())
            .map(|referrer| {
                let policy = actor.mask_policy(Some(&referrer), show_confidential, &settings);
                ClientView::new(&referrer, policy)
            }),
        None => None,
    };

    let referrals = repo
        .list_referrals(client.id)?
        .into_iter()
        .filter(|referral| actor.can_see(referral))
        .map(|referral| {
            let policy = actor.mask_policy(Some(&referral), show_confidential, &settings);
            ClientView::new(&referral, policy)
        })
        .collect();

    let policies = repo
        .list_policies(client.id)?
        .iter()
        .map(|policy| PolicyView::new(policy, level, mask))
        .collect();
    let meetings = repo
        .list_meetings(client.id)?
        .iter()
        .map(|meeting| MeetingView::new(meeting, level, mask))
        .collect();
    let documents = repo
        .list_documents(client.id)?
        .iter()
        .map(|document| DocumentView::new(document, mask))
        .collect();

    let tags = repo.list_client_tags(client.id)?;
    let available_tags = repo.list_tags()?;

    record(
        repo,
        &actor,
        AuditAction::View,
        AuditEntity::Client,
        Some(client.id.get()),
        json!({ "privacy_level": level }),
    );
    if mask.show_confidential && level != PrivacyLevel::Public {
        record(
            repo,
            &actor,
            AuditAction::Reveal,
            AuditEntity::Client,
            Some(client.id.get()),
            json!({ "privacy_level": level }),
        );
    }

    Ok(ClientPageData {
        client: ClientView::new(&client, mask),
        agent,
        referrer,
        referrals,
        policies,
        meetings,
        documents,
        tags,
        available_tags,
        show_confidential: mask.show_confidential,
        can_reveal,
        is_admin: actor.is_admin,
    })
}

/// Validates the edit form and stores the changes.
///
/// A blank privacy level keeps the client's current level. The assigned
/// agent is changed through transfers only.
pub fn update_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: AgentWriter + AuditWriter + ClientReader + ClientWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;

    let payload = ClientPayload::try_from(form)
        .map_err(|err| {
            log::warn!("Invalid client form: {err}");
            ServiceError::from(err)
        })?
        .with_default_level(client.privacy_level);

    if let Some(referrer_id) = payload.referrer_id {
        if referrer_id == client.id {
            return Err(ServiceError::Form(
                "A client cannot refer themselves".to_string(),
            ));
        }
        load_live_client(repo, &actor, referrer_id.get()).map_err(|err| match err {
            ServiceError::NotFound => ServiceError::Form("Referrer not found".to_string()),
            other => other,
        })?;
    }

    let updates = UpdateClient::new(payload.referrer_id, payload.profile);
    let updated = repo.update_client(client.id, &updates).map_err(|err| {
        log::error!("Failed to update client: {err}");
        err
    })?;

    record(
        repo,
        &actor,
        AuditAction::Update,
        AuditEntity::Client,
        Some(client.id.get()),
        json!({ "privacy_level": updated.privacy_level }),
    );

    Ok(updated)
}

/// Moves the client to the trash.
pub fn delete_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<()>
where
    R: AgentWriter + AuditWriter + ClientReader + ClientWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;

    repo.soft_delete_client(client.id, Utc::now().naive_utc())
        .map_err(|err| {
            log::error!("Failed to delete client: {err}");
            err
        })?;

    record(
        repo,
        &actor,
        AuditAction::Delete,
        AuditEntity::Client,
        Some(client.id.get()),
        serde_json::Value::Null,
    );

    Ok(())
}

/// Loads a trashed client for the admin-only trash actions.
fn load_trashed_client<R>(
    repo: &R,
    actor: &Actor,
    client_id: i32,
) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    let client = load_visible_client(repo, actor, client_id)?;
    if !client.is_deleted() {
        return Err(ServiceError::Form(
            "The client is not in the trash".to_string(),
        ));
    }
    Ok(client)
}

pub fn restore_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<()>
where
    R: AgentWriter + AuditWriter + ClientReader + ClientWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;
    let client = load_trashed_client(repo, &actor, client_id)?;

    repo.restore_client(client.id).map_err(|err| {
        log::error!("Failed to restore client: {err}");
        err
    })?;

    record(
        repo,
        &actor,
        AuditAction::Restore,
        AuditEntity::Client,
        Some(client.id.get()),
        serde_json::Value::Null,
    );

    Ok(())
}

/// Deletes a trashed client for good together with its stored documents.
/// Policies, meetings, documents and tag links go with the row; referrals
/// lose their referrer.
pub fn purge_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    upload_dir: &Path,
) -> ServiceResult<()>
where
    R: AgentWriter + AuditWriter + ClientReader + ClientWriter + DocumentReader + ?Sized,
{
    let actor = resolve_admin(repo, user)?;
    let client = load_trashed_client(repo, &actor, client_id)?;

    let documents = repo.list_documents(client.id)?;

    repo.purge_client(client.id).map_err(|err| {
        log::error!("Failed to purge client: {err}");
        err
    })?;

    for document in &documents {
        remove_stored_file(upload_dir, document.public_id);
    }

    record(
        repo,
        &actor,
        AuditAction::Purge,
        AuditEntity::Client,
        Some(client.id.get()),
        json!({ "documents": documents.len() }),
    );

    Ok(())
}

/// Replaces the tag set of a client.
pub fn set_client_tags<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: ClientTagsForm,
) -> ServiceResult<usize>
where
    R: AgentWriter + AuditWriter + ClientReader + TagReader + TagWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;

    let tag_ids = form.tag_ids()?;
    for tag_id in &tag_ids {
        if repo.get_tag(*tag_id)?.is_none() {
            return Err(ServiceError::Form(format!("Unknown tag {tag_id}")));
        }
    }

    let linked = repo.set_client_tags(client.id, &tag_ids).map_err(|err| {
        log::error!("Failed to set client tags: {err}");
        err
    })?;

    record(
        repo,
        &actor,
        AuditAction::Update,
        AuditEntity::Client,
        Some(client.id.get()),
        json!({ "tags": tag_ids.iter().map(|id| id.get()).collect::<Vec<_>>() }),
    );

    Ok(linked)
}

/// Admin trash view. Values stay masked here; restoring brings the full
/// client page back.
pub fn list_deleted_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: TrashQuery,
) -> ServiceResult<TrashPageData>
where
    R: AgentReader + AgentWriter + AuditWriter + ClientReader + ?Sized,
{
    let actor = resolve_admin(repo, user)?;

    let page = query.page.unwrap_or(1).max(1);
    let (total, clients) = repo
        .list_clients(
            ClientListQuery::new()
                .deleted()
                .paginate(page, DEFAULT_ITEMS_PER_PAGE),
        )
        .map_err(|err| {
            log::error!("Failed to list deleted clients: {err}");
            err
        })?;

    let agents = repo
        .list_agents_with_client_counts()?
        .into_iter()
        .map(|row| row.agent)
        .collect();

    record(
        repo,
        &actor,
        AuditAction::View,
        AuditEntity::ClientList,
        None,
        json!({ "trash": true, "page": page }),
    );

    Ok(TrashPageData {
        clients: Paginated::new(clients, page, total, DEFAULT_ITEMS_PER_PAGE)
            .map(|client| ClientView::new(&client, MaskPolicy::MASKED)),
        agents,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::audit::NewAuditLog;
    use crate::domain::document::Document;
    use crate::domain::types::{ClientId, DocumentId, DocumentTitle, PublicId};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        admin_user, agent, agent_user, client_of, other_agent_id, repo_with_agent,
    };

    fn page_repo(repo: &mut MockRepository) {
        repo.expect_get_agent_by_id().returning(|_| Ok(Some(agent())));
        repo.expect_list_referrals().returning(|_| Ok(Vec::new()));
        repo.expect_list_policies().returning(|_| Ok(Vec::new()));
        repo.expect_list_meetings().returning(|_| Ok(Vec::new()));
        repo.expect_list_documents().returning(|_| Ok(Vec::new()));
        repo.expect_list_client_tags().returning(|_| Ok(Vec::new()));
        repo.expect_list_tags().returning(|| Ok(Vec::new()));
    }

    fn trashed_client() -> Client {
        let mut client = client_of(agent().id);
        client.deleted_at = Some(Utc::now().naive_utc());
        client
    }

    #[test]
    fn client_page_masks_by_default() {
        let mut repo = repo_with_agent();
        page_repo(&mut repo);
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));

        let data = load_client_page(&repo, &agent_user(), 10, false).unwrap();

        assert_eq!(data.client.email.as_deref(), Some("mi*su@example.com"));
        assert!(data.can_reveal);
        assert!(!data.show_confidential);
    }

    #[test]
    fn honoured_reveal_is_audited() {
        let mut repo = MockRepository::new();
        repo.expect_create_or_update_agent()
            .returning(|_| Ok(agent()));
        repo.expect_list_settings().returning(|| Ok(Vec::new()));
        page_repo(&mut repo);
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_create_audit_log()
            .withf(|entry: &NewAuditLog| entry.action == AuditAction::View)
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_create_audit_log()
            .withf(|entry: &NewAuditLog| {
                entry.action == AuditAction::Reveal && entry.entity_id == Some(10)
            })
            .times(1)
            .returning(|_| Ok(()));

        let data = load_client_page(&repo, &agent_user(), 10, true).unwrap();

        assert!(data.show_confidential);
        assert_eq!(data.client.email.as_deref(), Some("minsu@example.com"));
    }

    #[test]
    fn foreign_client_page_is_not_found() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(other_agent_id()))));
        repo.expect_list_policies().times(0);

        let result = load_client_page(&repo, &agent_user(), 10, false);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn update_keeps_level_when_blank() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_update_client()
            .withf(|id, updates| {
                *id == ClientId::new(10).unwrap()
                    && updates.profile.privacy_level == PrivacyLevel::Restricted
                    && updates.profile.name.as_str() == "Kim Min-su"
            })
            .times(1)
            .returning(|_, _| Ok(client_of(agent().id)));

        let form = ClientForm {
            name: "Kim Min-su".to_string(),
            ..Default::default()
        };
        update_client(&repo, &agent_user(), 10, form).unwrap();
    }

    #[test]
    fn client_cannot_refer_itself() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_update_client().times(0);

        let form = ClientForm {
            name: "Kim".to_string(),
            referrer_id: "10".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            update_client(&repo, &agent_user(), 10, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn agents_cannot_touch_trashed_clients() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(trashed_client())));
        repo.expect_soft_delete_client().times(0);

        assert!(matches!(
            delete_client(&repo, &agent_user(), 10),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn delete_is_soft_and_audited() {
        let mut repo = MockRepository::new();
        repo.expect_create_or_update_agent()
            .returning(|_| Ok(agent()));
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_soft_delete_client()
            .times(1)
            .returning(|_, _| Ok(()));
        repo.expect_create_audit_log()
            .withf(|entry: &NewAuditLog| {
                entry.action == AuditAction::Delete && entry.entity == AuditEntity::Client
            })
            .times(1)
            .returning(|_| Ok(()));

        delete_client(&repo, &agent_user(), 10).unwrap();
    }

    #[test]
    fn restore_requires_admin_and_trashed_client() {
        let mut repo = repo_with_agent();
        repo.expect_restore_client().times(0);
        assert!(matches!(
            restore_client(&repo, &agent_user(), 10),
            Err(ServiceError::Unauthorized)
        ));

        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_restore_client().times(0);
        assert!(matches!(
            restore_client(&repo, &admin_user(), 10),
            Err(ServiceError::Form(_))
        ));

        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(trashed_client())));
        repo.expect_restore_client().times(1).returning(|_| Ok(()));
        restore_client(&repo, &admin_user(), 10).unwrap();
    }

    #[test]
    fn purge_removes_stored_documents() {
        let dir = tempfile::tempdir().unwrap();
        let public_id = PublicId::new();
        let stored = dir.path().join(public_id.to_string());
        std::fs::write(&stored, b"scan").unwrap();

        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(trashed_client())));
        repo.expect_list_documents().returning(move |client_id| {
            Ok(vec![Document {
                id: DocumentId::new(1).unwrap(),
                public_id,
                client_id,
                title: DocumentTitle::new("Scan").unwrap(),
                file_name: "scan.pdf".to_string(),
                content_type: None,
                size_bytes: 4,
                privacy_level: PrivacyLevel::Private,
                uploaded_by: agent().id,
                created_at: Utc::now().naive_utc(),
            }])
        });
        repo.expect_purge_client().times(1).returning(|_| Ok(()));

        purge_client(&repo, &admin_user(), 10, dir.path()).unwrap();

        assert!(!stored.exists());
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let mut repo = repo_with_agent();
        repo.expect_get_client_by_id()
            .returning(|_| Ok(Some(client_of(agent().id))));
        repo.expect_get_tag().returning(|_| Ok(None));
        repo.expect_set_client_tags().times(0);

        let form = ClientTagsForm { tag_id: vec![3] };
        assert!(matches!(
            set_client_tags(&repo, &agent_user(), 10, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn trash_lists_deleted_clients_masked() {
        let mut repo = repo_with_agent();
        repo.expect_list_clients()
            .withf(|query| query.deleted && query.agent_id.is_none())
            .returning(|_| Ok((1, vec![trashed_client()])));
        repo.expect_list_agents_with_client_counts()
            .returning(|| Ok(Vec::new()));

        let data = list_deleted_clients(&repo, &admin_user(), TrashQuery::default()).unwrap();

        assert_eq!(data.clients.total, 1);
        assert!(data.clients.items[0].masked);
    }
}
