use serde::Deserialize;
use validator::Validate;

use crate::domain::client::ClientProfile;
use crate::domain::privacy::PrivacyLevel;
use crate::domain::types::{AgentId, ClientId, TagId};
use crate::forms::{FormError, parse_date, parse_optional_id, parse_privacy_level};

#[derive(Debug, Default, Deserialize, Validate)]
/// Client details posted by the add and edit forms.
pub struct ClientForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 254))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: String,
    /// `YYYY-MM-DD` or blank.
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub occupation: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub notes: String,
    /// Blank keeps the configured default level.
    #[serde(default)]
    pub privacy_level: String,
    #[serde(default)]
    pub referrer_id: String,
    /// Only honoured for administrators.
    #[serde(default)]
    pub agent_id: String,
}

/// Validated client details.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientPayload {
    pub profile: ClientProfile,
    /// Whether the form chose a level explicitly.
    pub level_given: bool,
    pub referrer_id: Option<ClientId>,
    pub agent_id: Option<AgentId>,
}

impl ClientPayload {
    /// Applies `level` unless the form picked one itself.
    pub fn with_default_level(mut self, level: PrivacyLevel) -> Self {
        if !self.level_given {
            self.profile.privacy_level = level;
        }
        self
    }
}

impl TryFrom<ClientForm> for ClientPayload {
    type Error = FormError;

    fn try_from(form: ClientForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let birth_date = parse_date(&form.birth_date)?;
        let level = parse_privacy_level(&form.privacy_level)?;
        let referrer_id = parse_optional_id(&form.referrer_id)?
            .map(ClientId::new)
            .transpose()?;
        let agent_id = parse_optional_id(&form.agent_id)?
            .map(AgentId::new)
            .transpose()?;

        let profile = ClientProfile::try_new(
            &form.name,
            Some(&form.phone),
            Some(&form.email),
            Some(&form.address),
            birth_date,
            Some(&form.occupation),
            Some(&form.notes),
            level.unwrap_or_default(),
        )?;

        Ok(Self {
            profile,
            level_given: level.is_some(),
            referrer_id,
            agent_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
/// Checkbox list posted from the client tags form; parsed with
/// `serde_html_form` because the key repeats.
pub struct ClientTagsForm {
    #[serde(default)]
    pub tag_id: Vec<i32>,
}

impl ClientTagsForm {
    pub fn tag_ids(&self) -> Result<Vec<TagId>, FormError> {
        let mut ids = self
            .tag_id
            .iter()
            .map(|id| TagId::new(*id).map_err(FormError::from))
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_by_key(|id| id.get());
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ClientForm {
        ClientForm {
            name: " Kim Minsu ".into(),
            phone: "+82 10-1234-5678".into(),
            email: "KIM@Example.com".into(),
            birth_date: "1985-02-03".into(),
            notes: "<b>VIP</b> client".into(),
            ..Default::default()
        }
    }

    #[test]
    fn form_builds_normalized_profile() {
        let payload = ClientPayload::try_from(form()).unwrap();
        let profile = &payload.profile;
        assert_eq!(profile.name.as_str(), "Kim Minsu");
        assert_eq!(profile.phone.as_ref().unwrap().as_str(), "+821012345678");
        assert_eq!(profile.email.as_ref().unwrap().as_str(), "kim@example.com");
        assert_eq!(profile.address, None);
        assert!(!payload.level_given);
        assert_eq!(payload.referrer_id, None);
    }

    #[test]
    fn default_level_applies_only_when_not_chosen() {
        let payload = ClientPayload::try_from(form())
            .unwrap()
            .with_default_level(PrivacyLevel::Confidential);
        assert_eq!(payload.profile.privacy_level, PrivacyLevel::Confidential);

        let mut chosen = form();
        chosen.privacy_level = "public".into();
        let payload = ClientPayload::try_from(chosen)
            .unwrap()
            .with_default_level(PrivacyLevel::Confidential);
        assert_eq!(payload.profile.privacy_level, PrivacyLevel::Public);
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let mut empty_name = form();
        empty_name.name = String::new();
        assert!(matches!(
            ClientPayload::try_from(empty_name),
            Err(FormError::Validation(_))
        ));

        let mut bad_email = form();
        bad_email.email = "not-an-email".into();
        assert!(matches!(
            ClientPayload::try_from(bad_email),
            Err(FormError::InvalidEmail)
        ));

        let mut bad_referrer = form();
        bad_referrer.referrer_id = "0".into();
        assert!(matches!(
            ClientPayload::try_from(bad_referrer),
            Err(FormError::InvalidId)
        ));
    }

    #[test]
    fn tag_ids_are_deduplicated() {
        let form: ClientTagsForm = serde_html_form::from_str("tag_id=3&tag_id=1&tag_id=3").unwrap();
        let ids: Vec<i32> = form.tag_ids().unwrap().into_iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
