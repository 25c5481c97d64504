//! Privacy levels and the masking rules applied when client data is displayed.
//!
//! Masking is pure: the same value, level and toggle always produce the same
//! output. Whether a viewer may set `show_confidential` is decided by the
//! service layer before these functions are called.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

/// Placeholder rendered for confidential values so their length is not leaked.
pub const CONFIDENTIAL_PLACEHOLDER: &str = "********";

const MASK_CHAR: char = '*';

/// How sensitive a record is, from least to most.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Public,
    #[default]
    Restricted,
    Private,
    Confidential,
}

impl PrivacyLevel {
    pub const ALL: [PrivacyLevel; 4] = [
        PrivacyLevel::Public,
        PrivacyLevel::Restricted,
        PrivacyLevel::Private,
        PrivacyLevel::Confidential,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrivacyLevel::Public => "public",
            PrivacyLevel::Restricted => "restricted",
            PrivacyLevel::Private => "private",
            PrivacyLevel::Confidential => "confidential",
        }
    }

    /// Whether content at this level is hidden entirely until revealed.
    pub fn requires_reveal(self) -> bool {
        matches!(self, PrivacyLevel::Private | PrivacyLevel::Confidential)
    }
}

impl Display for PrivacyLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyLevel {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(PrivacyLevel::Public),
            "restricted" => Ok(PrivacyLevel::Restricted),
            "private" => Ok(PrivacyLevel::Private),
            "confidential" => Ok(PrivacyLevel::Confidential),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown privacy level `{other}`"
            ))),
        }
    }
}

impl TryFrom<&str> for PrivacyLevel {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn mask_after_first(value: &str) -> String {
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i == 0 { c } else { MASK_CHAR })
        .collect()
}

fn mask_keeping(value: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= head + tail {
        return std::iter::repeat_n(MASK_CHAR, len).collect();
    }
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < head || i >= len - tail { *c } else { MASK_CHAR })
        .collect()
}

/// Masks a display value according to `level` unless `show_confidential` is set.
pub fn mask_value(value: &str, level: PrivacyLevel, show_confidential: bool) -> String {
    if show_confidential || value.is_empty() {
        return value.to_string();
    }
    match level {
        PrivacyLevel::Public => value.to_string(),
        PrivacyLevel::Restricted => mask_keeping(value, 2, 2),
        PrivacyLevel::Private => mask_after_first(value),
        PrivacyLevel::Confidential => CONFIDENTIAL_PLACEHOLDER.to_string(),
    }
}

pub fn mask_optional(
    value: Option<&str>,
    level: PrivacyLevel,
    show_confidential: bool,
) -> Option<String> {
    value.map(|v| mask_value(v, level, show_confidential))
}

/// Like [`mask_value`] but keeps the domain of an email readable below
/// [`PrivacyLevel::Confidential`].
pub fn mask_email(value: &str, level: PrivacyLevel, show_confidential: bool) -> String {
    if show_confidential || level == PrivacyLevel::Confidential {
        return mask_value(value, level, show_confidential);
    }
    match value.rsplit_once('@') {
        Some((local, domain)) => {
            format!("{}@{domain}", mask_value(local, level, show_confidential))
        }
        None => mask_value(value, level, show_confidential),
    }
}

/// The "show confidential" toggle after the service layer decided whether
/// the viewer may use it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaskPolicy {
    pub show_confidential: bool,
}

impl MaskPolicy {
    pub const MASKED: MaskPolicy = MaskPolicy {
        show_confidential: false,
    };

    pub fn new(show_confidential: bool) -> Self {
        Self { show_confidential }
    }

    pub fn value(&self, value: &str, level: PrivacyLevel) -> String {
        mask_value(value, level, self.show_confidential)
    }

    pub fn optional(&self, value: Option<&str>, level: PrivacyLevel) -> Option<String> {
        mask_optional(value, level, self.show_confidential)
    }

    pub fn email(&self, value: &str, level: PrivacyLevel) -> String {
        mask_email(value, level, self.show_confidential)
    }

    /// Whether content at `level` stays hidden under this policy.
    pub fn hides(&self, level: PrivacyLevel) -> bool {
        !self.show_confidential && level.requires_reveal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_values_are_never_masked() {
        assert_eq!(mask_value("010-1234-5678", PrivacyLevel::Public, false), "010-1234-5678");
    }

    #[test]
    fn toggle_reveals_every_level() {
        for level in PrivacyLevel::ALL {
            assert_eq!(mask_value("secret", level, true), "secret");
        }
    }

    #[test]
    fn restricted_keeps_edges() {
        assert_eq!(mask_value("01012345678", PrivacyLevel::Restricted, false), "01*******78");
        assert_eq!(mask_value("abcd", PrivacyLevel::Restricted, false), "****");
        assert_eq!(mask_value("abcde", PrivacyLevel::Restricted, false), "ab*de");
    }

    #[test]
    fn private_keeps_first_character() {
        assert_eq!(mask_value("Seoul", PrivacyLevel::Private, false), "S****");
        assert_eq!(mask_value("K", PrivacyLevel::Private, false), "K");
        assert_eq!(mask_value("Li", PrivacyLevel::Private, false), "L*");
    }

    #[test]
    fn confidential_hides_length() {
        assert_eq!(mask_value("x", PrivacyLevel::Confidential, false), CONFIDENTIAL_PLACEHOLDER);
        assert_eq!(
            mask_value("a much longer value", PrivacyLevel::Confidential, false),
            CONFIDENTIAL_PLACEHOLDER
        );
    }

    #[test]
    fn masking_respects_multibyte_characters() {
        assert_eq!(mask_value("김민수님", PrivacyLevel::Private, false), "김***");
        assert_eq!(mask_value("서울특별시청", PrivacyLevel::Restricted, false), "서울**시청");
    }

    #[test]
    fn empty_values_stay_empty() {
        assert_eq!(mask_value("", PrivacyLevel::Confidential, false), "");
        assert_eq!(mask_optional(None, PrivacyLevel::Private, false), None);
    }

    #[test]
    fn email_domain_survives_partial_masking() {
        assert_eq!(
            mask_email("jonathan@example.com", PrivacyLevel::Restricted, false),
            "jo****an@example.com"
        );
        assert_eq!(
            mask_email("jonathan@example.com", PrivacyLevel::Private, false),
            "j*******@example.com"
        );
        assert_eq!(
            mask_email("jonathan@example.com", PrivacyLevel::Confidential, false),
            CONFIDENTIAL_PLACEHOLDER
        );
    }

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!("Confidential".parse::<PrivacyLevel>(), Ok(PrivacyLevel::Confidential));
        assert!("secret".parse::<PrivacyLevel>().is_err());
        assert!(PrivacyLevel::Private > PrivacyLevel::Restricted);
        assert!(PrivacyLevel::Confidential.requires_reveal());
        assert!(!PrivacyLevel::Restricted.requires_reveal());
    }
}
