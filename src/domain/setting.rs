//! Admin-tunable settings stored as key/value rows.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::privacy::PrivacyLevel;
use crate::domain::types::TypeConstraintError;

pub const DEFAULT_PRIVACY_LEVEL: &str = "default_privacy_level";
pub const ALLOW_AGENT_REVEAL: &str = "allow_agent_reveal";
pub const AUDIT_RETENTION_DAYS: &str = "audit_retention_days";

/// Longest audit retention an admin may configure, in days.
pub const MAX_AUDIT_RETENTION_DAYS: u32 = 36_500;

/// Raw setting row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminSetting {
    pub key: String,
    pub value: String,
    pub updated_at: NaiveDateTime,
}

/// Typed view over the known settings with their defaults.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub default_privacy_level: PrivacyLevel,
    pub allow_agent_reveal: bool,
    /// Zero keeps audit entries forever.
    pub audit_retention_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_privacy_level: PrivacyLevel::Restricted,
            allow_agent_reveal: true,
            audit_retention_days: 365,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl Settings {
    /// Builds settings from stored rows. Unknown keys and unparsable values
    /// are skipped so a bad row never locks the admin out of the page.
    pub fn from_rows(rows: &[AdminSetting]) -> Self {
        let mut settings = Self::default();
        for row in rows {
            match row.key.as_str() {
                DEFAULT_PRIVACY_LEVEL => match row.value.parse() {
                    Ok(level) => settings.default_privacy_level = level,
                    Err(err) => log::warn!("Ignoring setting {}: {err}", row.key),
                },
                ALLOW_AGENT_REVEAL => match parse_bool(&row.value) {
                    Some(flag) => settings.allow_agent_reveal = flag,
                    None => log::warn!("Ignoring setting {}: not a boolean", row.key),
                },
                AUDIT_RETENTION_DAYS => match row.value.trim().parse() {
                    Ok(days) => settings.audit_retention_days = days,
                    Err(err) => log::warn!("Ignoring setting {}: {err}", row.key),
                },
                _ => {}
            }
        }
        settings
    }

    /// Key/value pairs to persist.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                DEFAULT_PRIVACY_LEVEL,
                self.default_privacy_level.as_str().to_string(),
            ),
            (ALLOW_AGENT_REVEAL, self.allow_agent_reveal.to_string()),
            (AUDIT_RETENTION_DAYS, self.audit_retention_days.to_string()),
        ]
    }

    /// Parses submitted values, rejecting anything malformed.
    pub fn try_from_map(values: &HashMap<String, String>) -> Result<Self, TypeConstraintError> {
        let defaults = Self::default();
        let default_privacy_level = match values.get(DEFAULT_PRIVACY_LEVEL) {
            Some(value) => value.parse()?,
            None => defaults.default_privacy_level,
        };
        let allow_agent_reveal = match values.get(ALLOW_AGENT_REVEAL) {
            Some(value) => parse_bool(value).ok_or_else(|| {
                TypeConstraintError::InvalidValue(format!("{ALLOW_AGENT_REVEAL} must be a boolean"))
            })?,
            // Unchecked checkboxes are not submitted at all.
            None => false,
        };
        let audit_retention_days = match values.get(AUDIT_RETENTION_DAYS) {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| *days <= MAX_AUDIT_RETENTION_DAYS)
                .ok_or_else(|| {
                    TypeConstraintError::InvalidValue(format!(
                        "{AUDIT_RETENTION_DAYS} must be between 0 and {MAX_AUDIT_RETENTION_DAYS}"
                    ))
                })?,
            None => defaults.audit_retention_days,
        };
        Ok(Self {
            default_privacy_level,
            allow_agent_reveal,
            audit_retention_days,
        })
    }
}
