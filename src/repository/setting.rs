use chrono::Utc;
use diesel::{prelude::*, upsert::excluded};

use crate::domain::setting::AdminSetting;
use crate::models::setting::AdminSetting as DbAdminSetting;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, SettingReader, SettingWriter};

impl SettingReader for DieselRepository {
    fn list_settings(&self) -> RepositoryResult<Vec<AdminSetting>> {
        use crate::schema::admin_settings;

        let mut conn = self.conn()?;
        let rows = admin_settings::table
            .order(admin_settings::key.asc())
            .load::<DbAdminSetting>(&mut conn)?;

        Ok(rows.into_iter().map(AdminSetting::from).collect())
    }
}

impl SettingWriter for DieselRepository {
    fn save_settings(&self, pairs: &[(String, String)]) -> RepositoryResult<()> {
        use crate::schema::admin_settings;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            for (key, value) in pairs {
                let row = DbAdminSetting {
                    key: key.clone(),
                    value: value.clone(),
                    updated_at: now,
                };
                diesel::insert_into(admin_settings::table)
                    .values(&row)
                    .on_conflict(admin_settings::key)
                    .do_update()
                    .set((
                        admin_settings::value.eq(excluded(admin_settings::value)),
                        admin_settings::updated_at.eq(excluded(admin_settings::updated_at)),
                    ))
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(RepositoryError::from)
    }
}
