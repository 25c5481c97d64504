use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::policy::{NewPolicy as DomainNewPolicy, Policy as DomainPolicy, PolicyDetails};
use crate::domain::types::{
    Cents, ClientId, InsurerName, PolicyId, PolicyNumber, ProductName, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::policies)]
pub struct Policy {
    pub id: i32,
    pub client_id: i32,
    pub insurer: String,
    pub product_name: String,
    pub policy_number: String,
    pub kind: String,
    pub premium_cents: i64,
    pub payment_cycle: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::policies)]
pub struct NewPolicy<'a> {
    pub client_id: i32,
    pub insurer: &'a str,
    pub product_name: &'a str,
    pub policy_number: &'a str,
    pub kind: &'a str,
    pub premium_cents: i64,
    pub payment_cycle: &'a str,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::policies)]
#[diesel(treat_none_as_null = true)]
pub struct UpdatePolicy<'a> {
    pub insurer: &'a str,
    pub product_name: &'a str,
    pub policy_number: &'a str,
    pub kind: &'a str,
    pub premium_cents: i64,
    pub payment_cycle: &'a str,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: &'a str,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Policy> for DomainPolicy {
    type Error = TypeConstraintError;

    fn try_from(policy: Policy) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PolicyId::new(policy.id)?,
            client_id: ClientId::new(policy.client_id)?,
            insurer: InsurerName::new(policy.insurer)?,
            product_name: ProductName::new(policy.product_name)?,
            policy_number: PolicyNumber::new(policy.policy_number)?,
            kind: policy.kind.parse()?,
            premium: Cents::new(policy.premium_cents)?,
            payment_cycle: policy.payment_cycle.parse()?,
            start_date: policy.start_date,
            end_date: policy.end_date,
            status: policy.status.parse()?,
            created_at: policy.created_at,
            updated_at: policy.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewPolicy> for NewPolicy<'a> {
    fn from(policy: &'a DomainNewPolicy) -> Self {
        let details = &policy.details;
        Self {
            client_id: policy.client_id.get(),
            insurer: details.insurer.as_str(),
            product_name: details.product_name.as_str(),
            policy_number: details.policy_number.as_str(),
            kind: details.kind.as_str(),
            premium_cents: details.premium.get(),
            payment_cycle: details.payment_cycle.as_str(),
            start_date: details.start_date,
            end_date: details.end_date,
            status: details.status.as_str(),
        }
    }
}

impl<'a> UpdatePolicy<'a> {
    pub fn from_domain(details: &'a PolicyDetails, updated_at: NaiveDateTime) -> Self {
        Self {
            insurer: details.insurer.as_str(),
            product_name: details.product_name.as_str(),
            policy_number: details.policy_number.as_str(),
            kind: details.kind.as_str(),
            premium_cents: details.premium.get(),
            payment_cycle: details.payment_cycle.as_str(),
            start_date: details.start_date,
            end_date: details.end_date,
            status: details.status.as_str(),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::policy::{PaymentCycle, PolicyKind, PolicyStatus};

    #[test]
    fn policy_into_domain() {
        let now = Utc::now().naive_utc();
        let db = Policy {
            id: 5,
            client_id: 2,
            insurer: "Acme".into(),
            product_name: "Car Plus".into(),
            policy_number: "CP-77".into(),
            kind: "auto".into(),
            premium_cents: 45_000,
            payment_cycle: "yearly".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            status: "active".into(),
            created_at: now,
            updated_at: now,
        };
        let policy = DomainPolicy::try_from(db).unwrap();
        assert_eq!(policy.kind, PolicyKind::Auto);
        assert_eq!(policy.payment_cycle, PaymentCycle::Yearly);
        assert_eq!(policy.status, PolicyStatus::Active);
        assert_eq!(policy.premium.get(), 45_000);
    }

    #[test]
    fn corrupt_enum_text_fails_conversion() {
        let now = Utc::now().naive_utc();
        let db = Policy {
            id: 5,
            client_id: 2,
            insurer: "Acme".into(),
            product_name: "Car Plus".into(),
            policy_number: "CP-77".into(),
            kind: "spaceship".into(),
            premium_cents: 1,
            payment_cycle: "yearly".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            status: "active".into(),
            created_at: now,
            updated_at: now,
        };
        assert!(DomainPolicy::try_from(db).is_err());
    }
}
