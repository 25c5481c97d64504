//! Backoffice tag management.

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::tag::{NewTag, Tag};
use crate::domain::types::TagId;
use crate::dto::admin::TagsPageData;
use crate::forms::tags::TagForm;
use crate::repository::{AgentWriter, AuditWriter, TagReader, TagWriter};
use crate::services::access::resolve_admin;
use crate::services::audit::record;
use crate::services::{ServiceError, ServiceResult};

fn parse_tag(form: TagForm) -> ServiceResult<NewTag> {
    NewTag::try_from(form).map_err(|err| {
        log::warn!("Invalid tag form: {err}");
        ServiceError::from(err)
    })
}

/// Tag names are unique; a clash is reported on the form.
fn duplicate_name(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Conflict(_) => ServiceError::Form("A tag with this name exists".to_string()),
        other => other,
    }
}

pub fn load_tags_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<TagsPageData>
where
    R: AgentWriter + TagReader + ?Sized,
{
    resolve_admin(repo, user)?;

    let tags = repo.list_tags().map_err(|err| {
        log::error!("Failed to list tags: {err}");
        err
    })?;

    Ok(TagsPageData { tags })
}

pub fn add_tag<R>(repo: &R, user: &AuthenticatedUser, form: TagForm) -> ServiceResult<Tag>
where
    R: AgentWriter + AuditWriter + TagWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;
    let new_tag = parse_tag(form)?;

    let tag = repo
        .create_tag(&new_tag)
        .map_err(ServiceError::from)
        .map_err(duplicate_name)?;

    record(
        repo,
        &actor,
        AuditAction::Create,
        AuditEntity::Tag,
        Some(tag.id.get()),
        json!({ "name": tag.name, "color": tag.color }),
    );

    Ok(tag)
}

/// Renames or recolors a tag.
pub fn update_tag<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tag_id: i32,
    form: TagForm,
) -> ServiceResult<Tag>
where
    R: AgentWriter + AuditWriter + TagWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;
    let tag_id = TagId::new(tag_id)?;
    let changes = parse_tag(form)?;

    let tag = repo
        .update_tag(tag_id, &changes)
        .map_err(ServiceError::from)
        .map_err(duplicate_name)?;

    record(
        repo,
        &actor,
        AuditAction::Update,
        AuditEntity::Tag,
        Some(tag.id.get()),
        json!({ "name": tag.name, "color": tag.color }),
    );

    Ok(tag)
}

/// Deletes a tag; its client links go with it.
pub fn delete_tag<R>(repo: &R, user: &AuthenticatedUser, tag_id: i32) -> ServiceResult<()>
where
    R: AgentWriter + AuditWriter + TagWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;
    let tag_id = TagId::new(tag_id)?;

    repo.delete_tag(tag_id).map_err(|err| {
        log::error!("Failed to delete tag: {err}");
        err
    })?;

    record(
        repo,
        &actor,
        AuditAction::Delete,
        AuditEntity::Tag,
        Some(tag_id.get()),
        serde_json::Value::Null,
    );

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{TagColor, TagName};
    use crate::repository::errors::RepositoryError;
    use crate::services::test_support::{admin_user, agent_user, repo_with_agent};

    fn tag() -> Tag {
        Tag {
            id: TagId::new(4).unwrap(),
            name: TagName::new("VIP").unwrap(),
            color: TagColor::new("#ff0000").unwrap(),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn agents_cannot_manage_tags() {
        let mut repo = repo_with_agent();
        repo.expect_create_tag().times(0);

        let form = TagForm {
            name: "VIP".to_string(),
            color: String::new(),
        };
        assert!(matches!(
            add_tag(&repo, &agent_user(), form),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn admin_adds_tag() {
        let mut repo = repo_with_agent();
        repo.expect_create_tag()
            .withf(|new_tag| new_tag.name.as_str() == "VIP")
            .times(1)
            .returning(|_| Ok(tag()));

        let form = TagForm {
            name: " VIP ".to_string(),
            color: "#FF0000".to_string(),
        };
        assert_eq!(add_tag(&repo, &admin_user(), form).unwrap().id.get(), 4);
    }

    #[test]
    fn duplicate_names_become_form_errors() {
        let mut repo = repo_with_agent();
        repo.expect_update_tag().returning(|_, _| {
            Err(RepositoryError::ConstraintViolation("unique".to_string()))
        });

        let form = TagForm {
            name: "VIP".to_string(),
            color: String::new(),
        };
        assert!(matches!(
            update_tag(&repo, &admin_user(), 4, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn deleting_missing_tag_is_not_found() {
        let mut repo = repo_with_agent();
        repo.expect_delete_tag()
            .returning(|_| Err(RepositoryError::NotFound));

        assert!(matches!(
            delete_tag(&repo, &admin_user(), 4),
            Err(ServiceError::NotFound)
        ));
    }
}
