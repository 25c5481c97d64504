use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::setting::AdminSetting as DomainAdminSetting;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::admin_settings)]
pub struct AdminSetting {
    pub key: String,
    pub value: String,
    pub updated_at: NaiveDateTime,
}

impl From<AdminSetting> for DomainAdminSetting {
    fn from(row: AdminSetting) -> Self {
        Self {
            key: row.key,
            value: row.value,
            updated_at: row.updated_at,
        }
    }
}
