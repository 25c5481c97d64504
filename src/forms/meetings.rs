use serde::Deserialize;
use validator::Validate;

use crate::domain::meeting::{MeetingDetails, MeetingStatus};
use crate::domain::types::CleanText;
use crate::forms::{FormError, parse_datetime};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct MeetingForm {
    /// `<input type="datetime-local">` value.
    pub scheduled_at: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub location: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub purpose: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub notes: String,
    #[serde(default)]
    pub status: String,
}

impl TryFrom<MeetingForm> for MeetingDetails {
    type Error = FormError;

    fn try_from(form: MeetingForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let status = match form.status.trim() {
            "" => MeetingStatus::Scheduled,
            other => other.parse::<MeetingStatus>()?,
        };

        Ok(MeetingDetails {
            scheduled_at: parse_datetime(&form.scheduled_at)?,
            location: CleanText::new(&form.location),
            purpose: CleanText::new(&form.purpose),
            notes: CleanText::new(&form.notes),
            status,
        })
    }
}

/// Quick status change from the meetings table.
#[derive(Debug, Default, Deserialize)]
pub struct MeetingStatusForm {
    pub status: String,
}

impl TryFrom<MeetingStatusForm> for MeetingStatus {
    type Error = FormError;

    fn try_from(form: MeetingStatusForm) -> Result<Self, Self::Error> {
        Ok(form.status.trim().parse::<MeetingStatus>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_meetings_default_to_scheduled() {
        let form = MeetingForm {
            scheduled_at: "2025-06-01T14:00".into(),
            location: "  Cafe  ".into(),
            ..Default::default()
        };
        let details = MeetingDetails::try_from(form).unwrap();
        assert_eq!(details.status, MeetingStatus::Scheduled);
        assert_eq!(details.location.unwrap().as_str(), "Cafe");
        assert_eq!(details.purpose, None);
    }

    #[test]
    fn status_and_time_are_validated() {
        let form = MeetingForm {
            scheduled_at: "2025-06-01T14:00".into(),
            status: "postponed".into(),
            ..Default::default()
        };
        assert!(MeetingDetails::try_from(form).is_err());

        let form = MeetingForm {
            scheduled_at: "soon".into(),
            ..Default::default()
        };
        assert!(matches!(
            MeetingDetails::try_from(form),
            Err(FormError::InvalidDate)
        ));
    }

    #[test]
    fn status_form_accepts_known_statuses() {
        let form = MeetingStatusForm {
            status: " completed ".into(),
        };
        assert_eq!(MeetingStatus::try_from(form).unwrap(), MeetingStatus::Completed);
        assert!(MeetingStatus::try_from(MeetingStatusForm::default()).is_err());
    }
}
