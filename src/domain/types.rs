//! Strongly-typed value objects used by domain entities.
//!
//! Each wrapper enforces its invariant at construction time (positive ids,
//! normalized emails, E.164 phones, trimmed non-empty labels) so the rest of
//! the crate can treat a constructed value as trusted.

use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidateEmail;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    #[error("id must be greater than zero")]
    NonPositiveId,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("value cannot be empty")]
    EmptyString,
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("invalid color, expected #rrggbb")]
    InvalidColor,
    #[error("amount cannot be negative")]
    NegativeAmount,
    #[error("invalid uuid value")]
    InvalidUuid,
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(AgentId, "Unique identifier for an insurance agent.");
id_newtype!(ClientId, "Unique identifier for a client.");
id_newtype!(PolicyId, "Unique identifier for an insurance policy.");
id_newtype!(MeetingId, "Unique identifier for a meeting.");
id_newtype!(DocumentId, "Unique identifier for a stored document.");
id_newtype!(TagId, "Unique identifier for a tag.");
id_newtype!(AuditLogId, "Unique identifier for an audit log entry.");

/// Trims the input and rejects empty strings.
fn non_empty(value: String) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Lower-cases, trims and validates an email string.
fn normalize_email(value: String) -> Result<String, TypeConstraintError> {
    let normalized = value.trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Normalizes a phone number string to E.164 format.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed = parse(None, trimmed).map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

fn normalize_phone(value: String) -> Result<String, TypeConstraintError> {
    normalize_phone_to_e164(&value)
}

/// Accepts `#rrggbb` hex colors, lower-casing the digits.
fn normalize_color(value: String) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim().to_lowercase();
    let digits = trimmed
        .strip_prefix('#')
        .ok_or(TypeConstraintError::InvalidColor)?;
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(trimmed)
    } else {
        Err(TypeConstraintError::InvalidColor)
    }
}

/// Generates a string wrapper whose constructor runs `$check` on the input.
macro_rules! string_newtype {
    ($name:ident, $check:path, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                $check(value.into()).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

string_newtype!(AgentEmail, normalize_email, "Lower-cased and validated agent email.");
string_newtype!(ClientEmail, normalize_email, "Lower-cased and validated client email.");
string_newtype!(PhoneNumber, normalize_phone, "Phone number normalized to E.164.");
string_newtype!(AgentName, non_empty, "Agent display name.");
string_newtype!(ClientName, non_empty, "Client full name.");
string_newtype!(TagName, non_empty, "Tag label.");
string_newtype!(TagColor, normalize_color, "Tag color in `#rrggbb` form.");
string_newtype!(InsurerName, non_empty, "Name of the insurance company.");
string_newtype!(ProductName, non_empty, "Insurance product name.");
string_newtype!(PolicyNumber, non_empty, "Policy number issued by the insurer.");
string_newtype!(DocumentTitle, non_empty, "Human readable document title.");

/// Sanitized free text (notes, purposes). Markup is stripped with `ammonia`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CleanText(String);

impl CleanText {
    /// Sanitizes and trims; returns `None` when nothing remains.
    pub fn new<S: AsRef<str>>(value: S) -> Option<Self> {
        let sanitized = ammonia::clean(value.as_ref());
        let trimmed = sanitized.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for CleanText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monetary amount in minor units (cents), never negative.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cents(i64);

impl Cents {
    pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
        if value < 0 {
            Err(TypeConstraintError::NegativeAmount)
        } else {
            Ok(Self(value))
        }
    }

    /// Parses a decimal amount such as `1200`, `1200.5` or `1,200.50`.
    pub fn parse_decimal(value: &str) -> Result<Self, TypeConstraintError> {
        let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.starts_with('-') {
            return Err(TypeConstraintError::NegativeAmount);
        }
        let invalid = || TypeConstraintError::InvalidValue(value.to_string());
        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty() || fraction.len() > 2 {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(invalid)
            .and_then(Self::new)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Public identifier used in URLs so internal ids are not exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(Uuid);

impl PublicId {
    /// Generate a new random public ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for PublicId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PublicId {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TypeConstraintError::InvalidUuid)
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}
