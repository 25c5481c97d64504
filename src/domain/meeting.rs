//! Meetings scheduled between an agent and a client.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{AgentId, CleanText, ClientId, MeetingId};

text_enum!(MeetingStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Meeting {
    pub id: MeetingId,
    pub client_id: ClientId,
    pub agent_id: AgentId,
    pub scheduled_at: NaiveDateTime,
    pub location: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub status: MeetingStatus,
    pub created_at: NaiveDateTime,
}

impl Meeting {
    /// Scheduled meetings whose start lies within `window` after `now`.
    pub fn is_upcoming(&self, now: NaiveDateTime, window: Duration) -> bool {
        self.status == MeetingStatus::Scheduled
            && self.scheduled_at >= now
            && self.scheduled_at <= now + window
    }
}

/// Mutable meeting fields shared by create and update.
#[derive(Clone, Debug, PartialEq)]
pub struct MeetingDetails {
    pub scheduled_at: NaiveDateTime,
    pub location: Option<CleanText>,
    pub purpose: Option<CleanText>,
    pub notes: Option<CleanText>,
    pub status: MeetingStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewMeeting {
    pub client_id: ClientId,
    pub agent_id: AgentId,
    pub details: MeetingDetails,
}

impl NewMeeting {
    #[must_use]
    pub fn new(client_id: ClientId, agent_id: AgentId, details: MeetingDetails) -> Self {
        Self {
            client_id,
            agent_id,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn meeting_at(at: NaiveDateTime, status: MeetingStatus) -> Meeting {
        Meeting {
            id: MeetingId::new(1).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            agent_id: AgentId::new(1).unwrap(),
            scheduled_at: at,
            location: None,
            purpose: None,
            notes: None,
            status,
            created_at: at,
        }
    }

    #[test]
    fn upcoming_requires_scheduled_status_inside_window() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let week = Duration::days(7);

        assert!(meeting_at(now + Duration::days(2), MeetingStatus::Scheduled).is_upcoming(now, week));
        assert!(!meeting_at(now + Duration::days(8), MeetingStatus::Scheduled).is_upcoming(now, week));
        assert!(!meeting_at(now - Duration::hours(1), MeetingStatus::Scheduled).is_upcoming(now, week));
        assert!(!meeting_at(now + Duration::days(1), MeetingStatus::Cancelled).is_upcoming(now, week));
    }
}
