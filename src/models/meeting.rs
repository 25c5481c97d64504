use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::meeting::{Meeting as DomainMeeting, MeetingDetails, NewMeeting as DomainNewMeeting};
use crate::domain::types::{AgentId, ClientId, MeetingId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::meetings)]
pub struct Meeting {
    pub id: i32,
    pub client_id: i32,
    pub agent_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub location: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::meetings)]
pub struct NewMeeting<'a> {
    pub client_id: i32,
    pub agent_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub location: Option<&'a str>,
    pub purpose: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub status: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::meetings)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateMeeting<'a> {
    pub scheduled_at: NaiveDateTime,
    pub location: Option<&'a str>,
    pub purpose: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub status: &'a str,
}

impl TryFrom<Meeting> for DomainMeeting {
    type Error = TypeConstraintError;

    fn try_from(meeting: Meeting) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MeetingId::new(meeting.id)?,
            client_id: ClientId::new(meeting.client_id)?,
            agent_id: AgentId::new(meeting.agent_id)?,
            scheduled_at: meeting.scheduled_at,
            location: meeting.location,
            purpose: meeting.purpose,
            notes: meeting.notes,
            status: meeting.status.parse()?,
            created_at: meeting.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewMeeting> for NewMeeting<'a> {
    fn from(meeting: &'a DomainNewMeeting) -> Self {
        let update = UpdateMeeting::from(&meeting.details);
        Self {
            client_id: meeting.client_id.get(),
            agent_id: meeting.agent_id.get(),
            scheduled_at: update.scheduled_at,
            location: update.location,
            purpose: update.purpose,
            notes: update.notes,
            status: update.status,
        }
    }
}

impl<'a> From<&'a MeetingDetails> for UpdateMeeting<'a> {
    fn from(details: &'a MeetingDetails) -> Self {
        Self {
            scheduled_at: details.scheduled_at,
            location: details.location.as_ref().map(|v| v.as_str()),
            purpose: details.purpose.as_ref().map(|v| v.as_str()),
            notes: details.notes.as_ref().map(|v| v.as_str()),
            status: details.status.as_str(),
        }
    }
}
