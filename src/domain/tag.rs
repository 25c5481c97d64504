use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{TagColor, TagId, TagName};

/// Label that can be attached to any number of clients.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: TagId,
    pub name: TagName,
    pub color: TagColor,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewTag {
    pub name: TagName,
    pub color: TagColor,
}

impl NewTag {
    #[must_use]
    pub fn new(name: TagName, color: TagColor) -> Self {
        Self { name, color }
    }
}

/// Tag together with the number of clients it is attached to.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TagUsage {
    pub tag: Tag,
    pub client_count: i64,
}
