use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::setting::{
    ALLOW_AGENT_REVEAL, AUDIT_RETENTION_DAYS, DEFAULT_PRIVACY_LEVEL, Settings,
};
use crate::forms::FormError;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    pub default_privacy_level: String,
    /// Checkbox: absent when unchecked.
    pub allow_agent_reveal: Option<String>,
    pub audit_retention_days: String,
}

impl TryFrom<SettingsForm> for Settings {
    type Error = FormError;

    fn try_from(form: SettingsForm) -> Result<Self, Self::Error> {
        let mut values = HashMap::new();
        values.insert(DEFAULT_PRIVACY_LEVEL.to_string(), form.default_privacy_level);
        values.insert(AUDIT_RETENTION_DAYS.to_string(), form.audit_retention_days);
        if let Some(flag) = form.allow_agent_reveal {
            values.insert(ALLOW_AGENT_REVEAL.to_string(), flag);
        }
        Ok(Settings::try_from_map(&values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::privacy::PrivacyLevel;

    #[test]
    fn unchecked_reveal_box_disables_reveal() {
        let settings = Settings::try_from(SettingsForm {
            default_privacy_level: "private".into(),
            allow_agent_reveal: None,
            audit_retention_days: "30".into(),
        })
        .unwrap();
        assert_eq!(settings.default_privacy_level, PrivacyLevel::Private);
        assert!(!settings.allow_agent_reveal);
        assert_eq!(settings.audit_retention_days, 30);
    }

    #[test]
    fn checked_box_and_bad_number() {
        let ok = Settings::try_from(SettingsForm {
            default_privacy_level: "public".into(),
            allow_agent_reveal: Some("on".into()),
            audit_retention_days: "0".into(),
        })
        .unwrap();
        assert!(ok.allow_agent_reveal);

        let bad = Settings::try_from(SettingsForm {
            default_privacy_level: "public".into(),
            allow_agent_reveal: None,
            audit_retention_days: "forever".into(),
        });
        assert!(bad.is_err());
    }
}
