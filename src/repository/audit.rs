use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::audit::{AuditLog, NewAuditLog};
use crate::models::audit::{AuditLog as DbAuditLog, NewAuditLog as DbNewAuditLog};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AuditListQuery, AuditReader, AuditWriter, DieselRepository};

impl AuditReader for DieselRepository {
    fn list_audit_logs(&self, query: AuditListQuery) -> RepositoryResult<(usize, Vec<AuditLog>)> {
        use crate::schema::audit_logs;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = audit_logs::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(email) = query.actor_email.as_deref() {
                items = items.filter(audit_logs::actor_email.eq(email.to_lowercase()));
            }
            if let Some(action) = query.action {
                items = items.filter(audit_logs::action.eq(action.as_str()));
            }
            if let Some(entity) = query.entity {
                items = items.filter(audit_logs::entity.eq(entity.as_str()));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items =
            query_builder().order((audit_logs::created_at.desc(), audit_logs::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let logs = items
            .load::<DbAuditLog>(&mut conn)?
            .into_iter()
            .map(|row| AuditLog::try_from(row).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, logs))
    }
}

impl AuditWriter for DieselRepository {
    fn create_audit_log(&self, entry: &NewAuditLog) -> RepositoryResult<()> {
        use crate::schema::audit_logs;

        let mut conn = self.conn()?;
        let insertable: DbNewAuditLog = entry.into();
        diesel::insert_into(audit_logs::table)
            .values(&insertable)
            .execute(&mut conn)?;
        Ok(())
    }

    fn purge_audit_logs_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<usize> {
        use crate::schema::audit_logs;

        let mut conn = self.conn()?;
        let affected = diesel::delete(audit_logs::table.filter(audit_logs::created_at.lt(cutoff)))
            .execute(&mut conn)?;
        Ok(affected)
    }
}
