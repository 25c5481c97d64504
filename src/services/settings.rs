//! Backoffice settings.

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::setting::Settings;
use crate::dto::admin::SettingsPageData;
use crate::forms::settings::SettingsForm;
use crate::repository::{AgentWriter, AuditWriter, SettingReader, SettingWriter};
use crate::services::ServiceResult;
use crate::services::access::resolve_admin;
use crate::services::audit::record;

/// Reads the stored settings, falling back to defaults for missing keys.
pub fn load_settings<R>(repo: &R) -> ServiceResult<Settings>
where
    R: SettingReader + ?Sized,
{
    let rows = repo.list_settings().map_err(|err| {
        log::error!("Failed to load settings: {err}");
        err
    })?;
    Ok(Settings::from_rows(&rows))
}

pub fn load_settings_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SettingsPageData>
where
    R: AgentWriter + SettingReader + ?Sized,
{
    resolve_admin(repo, user)?;

    Ok(SettingsPageData {
        settings: load_settings(repo)?,
    })
}

/// Validates and stores the settings form.
pub fn save_settings<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SettingsForm,
) -> ServiceResult<Settings>
where
    R: AgentWriter + SettingWriter + AuditWriter + ?Sized,
{
    let actor = resolve_admin(repo, user)?;

    let settings = Settings::try_from(form)?;
    let pairs: Vec<(String, String)> = settings
        .to_pairs()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    repo.save_settings(&pairs).map_err(|err| {
        log::error!("Failed to save settings: {err}");
        err
    })?;

    record(
        repo,
        &actor,
        AuditAction::Update,
        AuditEntity::Setting,
        None,
        json!(settings),
    );

    Ok(settings)
}
