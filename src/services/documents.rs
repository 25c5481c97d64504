//! Client documents kept on disk under `upload_dir/<public_id>`.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::client::Client;
use crate::domain::document::{Document, NewDocument};
use crate::domain::types::{ClientId, PublicId};
use crate::dto::client::DocumentDownload;
use crate::forms::documents::{DocumentUpload, UploadDocumentForm};
use crate::repository::{
    AgentWriter, AuditWriter, ClientReader, DocumentReader, DocumentWriter, SettingReader,
};
use crate::services::access::{Actor, load_live_client, load_visible_client, resolve_actor};
use crate::services::audit::record;
use crate::services::settings::load_settings;
use crate::services::{ServiceError, ServiceResult};

pub fn stored_path(upload_dir: &Path, public_id: PublicId) -> PathBuf {
    upload_dir.join(public_id.to_string())
}

/// Removes a stored file; failures are logged only.
pub fn remove_stored_file(upload_dir: &Path, public_id: PublicId) {
    let path = stored_path(upload_dir, public_id);
    match std::fs::remove_file(&path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Stored document {} was already gone", path.display());
        }
        Err(err) => log::error!("Failed to remove document {}: {err}", path.display()),
    }
}

/// Stores an uploaded document for a client.
pub fn upload_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: &UploadDocumentForm,
    upload_dir: &Path,
) -> ServiceResult<Document>
where
    R: AgentWriter + AuditWriter + ClientReader + DocumentWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;

    let upload = DocumentUpload::try_from(form).map_err(|err| {
        log::warn!("Rejected document upload: {err}");
        ServiceError::from(err)
    })?;

    store_document(repo, &actor, &client, upload, form.file.file.path(), upload_dir)
}

/// Copies `source` into the upload directory and records the document.
/// The copy is removed again when the database insert fails.
pub(crate) fn store_document<R>(
    repo: &R,
    actor: &Actor,
    client: &Client,
    upload: DocumentUpload,
    source: &Path,
    upload_dir: &Path,
) -> ServiceResult<Document>
where
    R: AuditWriter + DocumentWriter + ?Sized,
{
    let public_id = PublicId::new();
    let target = stored_path(upload_dir, public_id);

    std::fs::create_dir_all(upload_dir)
        .and_then(|()| std::fs::copy(source, &target))
        .map_err(|err| {
            log::error!("Failed to store document {}: {err}", target.display());
            ServiceError::Internal("Failed to store the document".to_string())
        })?;

    let new_document = NewDocument {
        public_id,
        client_id: client.id,
        title: upload.title,
        file_name: upload.file_name,
        content_type: upload.content_type,
        size_bytes: upload.size_bytes,
        privacy_level: upload.privacy_level.unwrap_or(client.privacy_level),
        uploaded_by: actor.agent.id,
    };

    let document = match repo.create_document(&new_document) {
        Ok(document) => document,
        Err(err) => {
            log::error!("Failed to save document: {err}");
            remove_stored_file(upload_dir, public_id);
            return Err(err.into());
        }
    };

    record(
        repo,
        actor,
        AuditAction::Create,
        AuditEntity::Document,
        Some(document.id.get()),
        json!({
            "client_id": client.id.get(),
            "size_bytes": document.size_bytes,
            "privacy_level": document.privacy_level,
        }),
    );

    Ok(document)
}

fn load_document<R>(repo: &R, public_id: &str) -> ServiceResult<Document>
where
    R: DocumentReader + ?Sized,
{
    let public_id: PublicId = public_id.parse().map_err(|_| ServiceError::NotFound)?;
    repo.get_document(public_id)?.ok_or(ServiceError::NotFound)
}

/// Resolves a document the actor may download.
///
/// Private and confidential documents need the same permission as the
/// reveal toggle of their client.
pub fn prepare_download<R>(
    repo: &R,
    user: &AuthenticatedUser,
    public_id: &str,
    upload_dir: &Path,
) -> ServiceResult<DocumentDownload>
where
    R: AgentWriter + AuditWriter + ClientReader + DocumentReader + SettingReader + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let document = load_document(repo, public_id)?;
    let client = load_visible_client(repo, &actor, document.client_id.get())?;
    let settings = load_settings(repo)?;

    if document.privacy_level.requires_reveal() && !actor.can_reveal(Some(&client), &settings) {
        log::warn!(
            "{} may not download document {}",
            actor.email,
            document.public_id
        );
        return Err(ServiceError::Form(
            "This document is confidential".to_string(),
        ));
    }

    record(
        repo,
        &actor,
        AuditAction::Download,
        AuditEntity::Document,
        Some(document.id.get()),
        json!({ "client_id": client.id.get() }),
    );

    Ok(DocumentDownload {
        path: stored_path(upload_dir, document.public_id),
        file_name: document.file_name,
        content_type: document.content_type,
    })
}

/// Deletes the row and the stored file. Returns the owning client so the
/// caller can redirect back to it.
pub fn delete_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    public_id: &str,
    upload_dir: &Path,
) -> ServiceResult<ClientId>
where
    R: AgentWriter + AuditWriter + ClientReader + DocumentReader + DocumentWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let document = load_document(repo, public_id)?;
    let client = load_live_client(repo, &actor, document.client_id.get())?;

    repo.delete_document(document.id).map_err(|err| {
        log::error!("Failed to delete document: {err}");
        err
    })?;
    remove_stored_file(upload_dir, document.public_id);

    record(
        repo,
        &actor,
        AuditAction::Delete,
        AuditEntity::Document,
        Some(document.id.get()),
        json!({ "client_id": client.id.get() }),
    );

    Ok(client.id)
}
