//! Form definitions backing the CRM routes.
//!
//! Each form is the raw shape posted by the browser. Conversion into a
//! `*Payload` validates it and builds the domain values the services work on.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::privacy::PrivacyLevel;
use crate::domain::types::TypeConstraintError;

pub mod agents;
pub mod client;
pub mod documents;
pub mod main;
pub mod meetings;
pub mod policies;
pub mod settings;
pub mod tags;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid date")]
    InvalidDate,

    #[error("invalid identifier")]
    InvalidId,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("invalid color")]
    InvalidColor,

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid csv: {0}")]
    Csv(String),

    #[error("invalid upload: {0}")]
    Upload(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::InvalidPhone => FormError::InvalidPhoneNumber,
            TypeConstraintError::EmptyString => FormError::InvalidName,
            TypeConstraintError::NonPositiveId | TypeConstraintError::InvalidUuid => {
                FormError::InvalidId
            }
            TypeConstraintError::NegativeAmount => FormError::InvalidAmount,
            TypeConstraintError::InvalidColor => FormError::InvalidColor,
            TypeConstraintError::InvalidValue(message) => FormError::InvalidValue(message),
        }
    }
}

impl From<csv::Error> for FormError {
    fn from(err: csv::Error) -> Self {
        FormError::Csv(err.to_string())
    }
}

/// Trims the value and maps blank input to `None`.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Parses an `<input type="date">` value; blank means no date.
pub(crate) fn parse_date(value: &str) -> Result<Option<NaiveDate>, FormError> {
    non_blank(value)
        .map(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| FormError::InvalidDate))
        .transpose()
}

/// Parses an `<input type="datetime-local">` value, with or without seconds.
pub(crate) fn parse_datetime(value: &str) -> Result<NaiveDateTime, FormError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .map_err(|_| FormError::InvalidDate)
}

/// Parses an optional numeric id posted from a `<select>`; blank means none.
pub(crate) fn parse_optional_id(value: &str) -> Result<Option<i32>, FormError> {
    non_blank(value)
        .map(|v| v.parse::<i32>().map_err(|_| FormError::InvalidId))
        .transpose()
}

/// Parses an optional privacy level; blank leaves the choice to the caller.
pub(crate) fn parse_privacy_level(value: &str) -> Result<Option<PrivacyLevel>, FormError> {
    non_blank(value)
        .map(|v| v.parse::<PrivacyLevel>().map_err(FormError::from))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_dates_are_absent() {
        assert_eq!(parse_date("  ").unwrap(), None);
        assert_eq!(
            parse_date("1990-05-17").unwrap(),
            NaiveDate::from_ymd_opt(1990, 5, 17)
        );
        assert!(matches!(parse_date("17.05.1990"), Err(FormError::InvalidDate)));
    }

    #[test]
    fn datetime_local_values_parse() {
        let parsed = parse_datetime("2025-03-01T09:30").unwrap();
        assert_eq!(parsed.to_string(), "2025-03-01 09:30:00");
        assert!(parse_datetime("2025-03-01T09:30:15").is_ok());
        assert!(parse_datetime("tomorrow").is_err());
    }

    #[test]
    fn optional_ids_and_levels() {
        assert_eq!(parse_optional_id("").unwrap(), None);
        assert_eq!(parse_optional_id("12").unwrap(), Some(12));
        assert!(parse_optional_id("x").is_err());
        assert_eq!(parse_privacy_level("").unwrap(), None);
        assert_eq!(
            parse_privacy_level("Private").unwrap(),
            Some(PrivacyLevel::Private)
        );
        assert!(parse_privacy_level("secret").is_err());
    }
}
