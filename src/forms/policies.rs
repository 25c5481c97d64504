use serde::Deserialize;
use validator::Validate;

use crate::domain::policy::{PaymentCycle, PolicyDetails, PolicyKind, PolicyStatus};
use crate::domain::types::{Cents, InsurerName, PolicyNumber, ProductName};
use crate::forms::{FormError, parse_date};

#[derive(Debug, Default, Deserialize, Validate)]
/// Insurance policy fields posted from the client page.
pub struct PolicyForm {
    #[validate(length(min = 1, max = 200))]
    pub insurer: String,
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[validate(length(min = 1, max = 100))]
    pub policy_number: String,
    pub kind: String,
    /// Decimal amount such as `125000` or `1,250.50`.
    pub premium: String,
    pub payment_cycle: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub status: String,
}

impl TryFrom<PolicyForm> for PolicyDetails {
    type Error = FormError;

    fn try_from(form: PolicyForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let start_date = parse_date(&form.start_date)?.ok_or(FormError::InvalidDate)?;
        let status = match form.status.trim() {
            "" => PolicyStatus::Active,
            other => other.parse::<PolicyStatus>()?,
        };

        let details = PolicyDetails {
            insurer: InsurerName::new(form.insurer)?,
            product_name: ProductName::new(form.product_name)?,
            policy_number: PolicyNumber::new(form.policy_number)?,
            kind: form.kind.trim().parse::<PolicyKind>()?,
            premium: Cents::parse_decimal(&form.premium).map_err(|_| FormError::InvalidAmount)?,
            payment_cycle: form.payment_cycle.trim().parse::<PaymentCycle>()?,
            start_date,
            end_date: parse_date(&form.end_date)?,
            status,
        };

        Ok(details.validate_period()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PolicyForm {
        PolicyForm {
            insurer: "Acme Life".into(),
            product_name: "Term 20".into(),
            policy_number: "AL-2024-0001".into(),
            kind: "life".into(),
            premium: "1,250.50".into(),
            payment_cycle: "monthly".into(),
            start_date: "2024-01-01".into(),
            end_date: "2044-01-01".into(),
            status: String::new(),
        }
    }

    #[test]
    fn valid_form_builds_details() {
        let details = PolicyDetails::try_from(form()).unwrap();
        assert_eq!(details.premium.get(), 125050);
        assert_eq!(details.kind, PolicyKind::Life);
        assert_eq!(details.status, PolicyStatus::Active);
        assert!(details.end_date.is_some());
    }

    #[test]
    fn rejects_bad_input() {
        let mut reversed = form();
        reversed.end_date = "2023-01-01".into();
        assert!(matches!(
            PolicyDetails::try_from(reversed),
            Err(FormError::InvalidValue(_))
        ));

        let mut negative = form();
        negative.premium = "-5".into();
        assert!(matches!(
            PolicyDetails::try_from(negative),
            Err(FormError::InvalidAmount)
        ));

        let mut unknown_kind = form();
        unknown_kind.kind = "pet".into();
        assert!(PolicyDetails::try_from(unknown_kind).is_err());

        let mut missing_start = form();
        missing_start.start_date = String::new();
        assert!(matches!(
            PolicyDetails::try_from(missing_start),
            Err(FormError::InvalidDate)
        ));
    }
}
