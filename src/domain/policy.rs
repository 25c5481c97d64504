//! Insurance policies held by clients.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Cents, ClientId, InsurerName, PolicyId, PolicyNumber, ProductName, TypeConstraintError,
};

text_enum!(PolicyKind {
    Life => "life",
    Health => "health",
    Auto => "auto",
    Property => "property",
    Travel => "travel",
    Other => "other",
});

text_enum!(PaymentCycle {
    Monthly => "monthly",
    Quarterly => "quarterly",
    Yearly => "yearly",
    Single => "single",
});

text_enum!(PolicyStatus {
    Active => "active",
    Lapsed => "lapsed",
    Cancelled => "cancelled",
    Matured => "matured",
});

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    pub id: PolicyId,
    pub client_id: ClientId,
    pub insurer: InsurerName,
    pub product_name: ProductName,
    pub policy_number: PolicyNumber,
    pub kind: PolicyKind,
    pub premium: Cents,
    pub payment_cycle: PaymentCycle,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: PolicyStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Policy fields supplied on create and update.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyDetails {
    pub insurer: InsurerName,
    pub product_name: ProductName,
    pub policy_number: PolicyNumber,
    pub kind: PolicyKind,
    pub premium: Cents,
    pub payment_cycle: PaymentCycle,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: PolicyStatus,
}

impl PolicyDetails {
    /// Rejects coverage periods that end before they start.
    pub fn validate_period(self) -> Result<Self, TypeConstraintError> {
        match self.end_date {
            Some(end) if end < self.start_date => Err(TypeConstraintError::InvalidValue(
                "end date precedes start date".to_string(),
            )),
            _ => Ok(self),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewPolicy {
    pub client_id: ClientId,
    pub details: PolicyDetails,
}

impl NewPolicy {
    #[must_use]
    pub fn new(client_id: ClientId, details: PolicyDetails) -> Self {
        Self { client_id, details }
    }
}
