//! Audit trail writes and the backoffice audit viewer.

use chrono::{Duration, NaiveDateTime};
use serde_json::Value;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity, NewAuditLog};
use crate::dto::admin::{AuditPageData, AuditQuery};
use crate::pagination::Paginated;
use crate::repository::{AgentWriter, AuditListQuery, AuditReader, AuditWriter, SettingReader};
use crate::services::access::{Actor, resolve_admin};
use crate::services::settings::load_settings;
use crate::services::{ServiceError, ServiceResult};

pub const AUDIT_ITEMS_PER_PAGE: usize = 50;

/// Writes one audit entry. A failed write is logged and swallowed so the
/// user's request still completes.
pub fn record<R>(
    repo: &R,
    actor: &Actor,
    action: AuditAction,
    entity: AuditEntity,
    entity_id: Option<i32>,
    details: Value,
) where
    R: AuditWriter + ?Sized,
{
    let entry = NewAuditLog::new(actor.email.as_str(), action, entity, entity_id)
        .agent(actor.agent.id)
        .details(details);

    if let Err(err) = repo.create_audit_log(&entry) {
        log::error!(
            "Failed to write audit log ({} {} {:?}): {err}",
            action,
            entity,
            entity_id
        );
    }
}

/// Loads one page of the audit log, newest first.
pub fn load_audit_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: AuditQuery,
) -> ServiceResult<AuditPageData>
where
    R: AgentWriter + AuditReader + AuditWriter + SettingReader + ?Sized,
{
    let actor = resolve_admin(repo, user)?;

    let page = query.page.unwrap_or(1).max(1);
    let mut list_query = AuditListQuery::new().paginate(page, AUDIT_ITEMS_PER_PAGE);

    let actor_filter = query
        .actor
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    if let Some(email) = &actor_filter {
        list_query = list_query.actor(email.clone());
    }

    let action = query
        .action
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<AuditAction>)
        .transpose()
        .map_err(|_| ServiceError::Form("Unknown audit action".to_string()))?;
    if let Some(action) = action {
        list_query = list_query.action(action);
    }

    let entity = query
        .entity
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<AuditEntity>)
        .transpose()
        .map_err(|_| ServiceError::Form("Unknown audit entity".to_string()))?;
    if let Some(entity) = entity {
        list_query = list_query.entity(entity);
    }

    let (total, logs) = repo.list_audit_logs(list_query).map_err(|err| {
        log::error!("Failed to list audit logs: {err}");
        err
    })?;

    let settings = load_settings(repo)?;

    record(
        repo,
        &actor,
        AuditAction::View,
        AuditEntity::AuditLog,
        None,
        serde_json::json!({ "page": page }),
    );

    Ok(AuditPageData {
        logs: Paginated::new(logs, page, total, AUDIT_ITEMS_PER_PAGE),
        actor: actor_filter,
        action,
        entity,
        retention_days: settings.audit_retention_days,
    })
}

/// Deletes entries older than the configured retention. Returns the number
/// of removed entries; a retention of zero keeps everything.
pub fn purge_expired<R>(repo: &R, now: NaiveDateTime) -> ServiceResult<usize>
where
    R: SettingReader + AuditWriter + ?Sized,
{
    let settings = load_settings(repo)?;
    if settings.audit_retention_days == 0 {
        return Ok(0);
    }

    // Stored rows bypass form validation; a cutoff before the calendar
    // starts leaves nothing to purge.
    let Some(cutoff) =
        now.checked_sub_signed(Duration::days(i64::from(settings.audit_retention_days)))
    else {
        log::warn!(
            "Audit retention of {} days is out of range, nothing purged",
            settings.audit_retention_days
        );
        return Ok(0);
    };
    let purged = repo.purge_audit_logs_before(cutoff)?;
    log::info!("Purged {purged} audit entries older than {cutoff}");
    Ok(purged)
}

/// Backoffice trigger for [`purge_expired`].
pub fn purge_audit_log<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
) -> ServiceResult<usize>
where
    R: AgentWriter + SettingReader + AuditWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;
    let purged = purge_expired(repo, now)?;

    record(
        repo,
        &actor,
        AuditAction::Purge,
        AuditEntity::AuditLog,
        None,
        serde_json::json!({ "purged": purged }),
    );

    Ok(purged)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::setting::{AUDIT_RETENTION_DAYS, AdminSetting};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::access::resolve_actor;
    use crate::services::test_support::{admin_user, agent, agent_user, repo_with_agent};

    fn retention(days: &str) -> Vec<AdminSetting> {
        vec![AdminSetting {
            key: AUDIT_RETENTION_DAYS.to_string(),
            value: days.to_string(),
            updated_at: Utc::now().naive_utc(),
        }]
    }

    #[test]
    fn failed_audit_write_is_swallowed() {
        let mut repo = MockRepository::new();
        repo.expect_create_or_update_agent()
            .returning(|_| Ok(agent()));
        repo.expect_create_audit_log()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError("locked".into())));
        let actor = resolve_actor(&repo, &agent_user()).unwrap();

        record(
            &repo,
            &actor,
            AuditAction::View,
            AuditEntity::Client,
            Some(3),
            Value::Null,
        );
    }

    #[test]
    fn record_carries_actor_and_details() {
        let mut repo = MockRepository::new();
        repo.expect_create_or_update_agent()
            .returning(|_| Ok(agent()));
        repo.expect_create_audit_log()
            .withf(|entry| {
                entry.actor_email == "agent@example.com"
                    && entry.actor_agent_id == Some(agent().id)
                    && entry.action == AuditAction::Reveal
                    && entry.entity_id == Some(3)
                    && entry.details["fields"] == "all"
            })
            .times(1)
            .returning(|_| Ok(()));
        let actor = resolve_actor(&repo, &agent_user()).unwrap();

        record(
            &repo,
            &actor,
            AuditAction::Reveal,
            AuditEntity::Client,
            Some(3),
            serde_json::json!({ "fields": "all" }),
        );
    }

    #[test]
    fn audit_page_is_admin_only() {
        let mut repo = repo_with_agent();
        repo.expect_list_audit_logs().times(0);

        let result = load_audit_page(&repo, &agent_user(), AuditQuery::default());

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn audit_page_applies_filters() {
        let mut repo = repo_with_agent();
        repo.expect_list_audit_logs()
            .withf(|query| {
                query.actor_email.as_deref() == Some("agent@example.com")
                    && query.action == Some(AuditAction::Delete)
                    && query.entity.is_none()
                    && query.pagination.map(|p| p.per_page) == Some(AUDIT_ITEMS_PER_PAGE)
            })
            .times(1)
            .returning(|_| Ok((0, Vec::new())));

        let query = AuditQuery {
            actor: Some(" Agent@Example.com ".into()),
            action: Some("delete".into()),
            entity: Some(String::new()),
            page: None,
        };
        let data = load_audit_page(&repo, &admin_user(), query).unwrap();

        assert_eq!(data.logs.total, 0);
        assert_eq!(data.retention_days, 365);
    }

    #[test]
    fn unknown_filter_is_a_form_error() {
        let repo = repo_with_agent();
        let query = AuditQuery {
            action: Some("explode".into()),
            ..Default::default()
        };
        assert!(matches!(
            load_audit_page(&repo, &admin_user(), query),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn purge_uses_retention_cutoff() {
        let now = Utc::now().naive_utc();
        let mut repo = MockRepository::new();
        repo.expect_list_settings()
            .returning(|| Ok(retention("30")));
        repo.expect_purge_audit_logs_before()
            .withf(move |cutoff| *cutoff == now - Duration::days(30))
            .times(1)
            .returning(|_| Ok(4));

        assert_eq!(purge_expired(&repo, now).unwrap(), 4);
    }

    #[test]
    fn zero_retention_keeps_everything() {
        let mut repo = MockRepository::new();
        repo.expect_list_settings().returning(|| Ok(retention("0")));
        repo.expect_purge_audit_logs_before().times(0);

        assert_eq!(purge_expired(&repo, Utc::now().naive_utc()).unwrap(), 0);
    }

    #[test]
    fn retention_beyond_calendar_purges_nothing() {
        let mut repo = MockRepository::new();
        repo.expect_list_settings()
            .returning(|| Ok(retention("4000000000")));
        repo.expect_purge_audit_logs_before().times(0);

        assert_eq!(purge_expired(&repo, Utc::now().naive_utc()).unwrap(), 0);
    }
}
