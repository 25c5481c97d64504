//! Meetings between an agent and a client.
//!
//! A meeting always belongs to the client's assigned agent, whoever
//! scheduled it.

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::audit::{AuditAction, AuditEntity};
use crate::domain::client::Client;
use crate::domain::meeting::{Meeting, MeetingDetails, MeetingStatus, NewMeeting};
use crate::domain::types::{CleanText, MeetingId};
use crate::forms::meetings::{MeetingForm, MeetingStatusForm};
use crate::repository::{AgentWriter, AuditWriter, ClientReader, MeetingReader, MeetingWriter};
use crate::services::access::{Actor, load_live_client, resolve_actor};
use crate::services::audit::record;
use crate::services::{ServiceError, ServiceResult};

fn load_meeting<R>(repo: &R, client: &Client, meeting_id: i32) -> ServiceResult<Meeting>
where
    R: MeetingReader + ?Sized,
{
    let meeting_id = MeetingId::new(meeting_id)?;
    match repo.get_meeting(meeting_id)? {
        Some(meeting) if meeting.client_id == client.id => Ok(meeting),
        _ => Err(ServiceError::NotFound),
    }
}

fn audit<R>(repo: &R, actor: &Actor, action: AuditAction, meeting: &Meeting)
where
    R: AuditWriter + ?Sized,
{
    record(
        repo,
        actor,
        action,
        AuditEntity::Meeting,
        Some(meeting.id.get()),
        json!({ "client_id": meeting.client_id.get(), "status": meeting.status }),
    );
}

fn parse_details(form: MeetingForm) -> ServiceResult<MeetingDetails> {
    MeetingDetails::try_from(form).map_err(|err| {
        log::warn!("Invalid meeting form: {err}");
        ServiceError::from(err)
    })
}

pub fn add_meeting<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: MeetingForm,
) -> ServiceResult<Meeting>
where
    R: AgentWriter + AuditWriter + ClientReader + MeetingWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;
    let details = parse_details(form)?;

    let meeting = repo
        .create_meeting(&NewMeeting::new(client.id, client.agent_id, details))
        .map_err(|err| {
            log::error!("Failed to schedule meeting: {err}");
            err
        })?;

    audit(repo, &actor, AuditAction::Create, &meeting);
    Ok(meeting)
}

pub fn update_meeting<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    meeting_id: i32,
    form: MeetingForm,
) -> ServiceResult<Meeting>
where
    R: AgentWriter + AuditWriter + ClientReader + MeetingReader + MeetingWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;
    let existing = load_meeting(repo, &client, meeting_id)?;
    let details = parse_details(form)?;

    let meeting = repo.update_meeting(existing.id, &details).map_err(|err| {
        log::error!("Failed to update meeting: {err}");
        err
    })?;

    audit(repo, &actor, AuditAction::Update, &meeting);
    Ok(meeting)
}

/// Changes only the status, keeping every other field.
pub fn set_meeting_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    meeting_id: i32,
    form: MeetingStatusForm,
) -> ServiceResult<Meeting>
where
    R: AgentWriter + AuditWriter + ClientReader + MeetingReader + MeetingWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;
    let existing = load_meeting(repo, &client, meeting_id)?;
    let status = MeetingStatus::try_from(form)?;

    let details = MeetingDetails {
        scheduled_at: existing.scheduled_at,
        location: existing.location.as_deref().and_then(CleanText::new),
        purpose: existing.purpose.as_deref().and_then(CleanText::new),
        notes: existing.notes.as_deref().and_then(CleanText::new),
        status,
    };

    let meeting = repo.update_meeting(existing.id, &details).map_err(|err| {
        log::error!("Failed to update meeting status: {err}");
        err
    })?;

    audit(repo, &actor, AuditAction::Update, &meeting);
    Ok(meeting)
}

pub fn delete_meeting<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    meeting_id: i32,
) -> ServiceResult<()>
where
    R: AgentWriter + AuditWriter + ClientReader + MeetingReader + MeetingWriter + ?Sized,
{
    let actor = resolve_actor(repo, user)?;
    let client = load_live_client(repo, &actor, client_id)?;
    let meeting = load_meeting(repo, &client, meeting_id)?;

    repo.delete_meeting(meeting.id).map_err(|err| {
        log::error!("Failed to delete meeting: {err}");
        err
    })?;

    audit(repo, &actor, AuditAction::Delete, &meeting);
    Ok(())
}
