use std::collections::HashMap;

use diesel::prelude::*;

use crate::domain::tag::{NewTag, Tag, TagUsage};
use crate::domain::types::{ClientId, TagId};
use crate::models::tag::{ClientTag, NewTag as DbNewTag, Tag as DbTag};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TagReader, TagWriter};

impl TagReader for DieselRepository {
    fn get_tag(&self, id: TagId) -> RepositoryResult<Option<Tag>> {
        use crate::schema::tags;

        let mut conn = self.conn()?;
        let row = tags::table
            .find(id.get())
            .first::<DbTag>(&mut conn)
            .optional()?;

        row.map(|t| Tag::try_from(t).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_tags(&self) -> RepositoryResult<Vec<TagUsage>> {
        use crate::schema::{client_tags, clients, tags};
        use diesel::dsl::count;

        let mut conn = self.conn()?;
        let rows = tags::table.order(tags::name.asc()).load::<DbTag>(&mut conn)?;

        let counts: HashMap<i32, i64> = client_tags::table
            .inner_join(clients::table)
            .filter(clients::deleted_at.is_null())
            .group_by(client_tags::tag_id)
            .select((client_tags::tag_id, count(client_tags::client_id)))
            .load::<(i32, i64)>(&mut conn)?
            .into_iter()
            .collect();

        rows.into_iter()
            .map(|row| -> RepositoryResult<TagUsage> {
                let client_count = counts.get(&row.id).copied().unwrap_or(0);
                Ok(TagUsage {
                    tag: Tag::try_from(row)?,
                    client_count,
                })
            })
            .collect()
    }

    fn list_client_tags(&self, client_id: ClientId) -> RepositoryResult<Vec<Tag>> {
        use crate::schema::{client_tags, tags};

        let mut conn = self.conn()?;
        tags::table
            .inner_join(client_tags::table)
            .filter(client_tags::client_id.eq(client_id.get()))
            .select(DbTag::as_select())
            .order(tags::name.asc())
            .load::<DbTag>(&mut conn)?
            .into_iter()
            .map(|t| Tag::try_from(t).map_err(RepositoryError::from))
            .collect()
    }
}

impl TagWriter for DieselRepository {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag> {
        use crate::schema::tags;

        let mut conn = self.conn()?;
        let insertable: DbNewTag = new_tag.into();
        let row = diesel::insert_into(tags::table)
            .values(&insertable)
            .get_result::<DbTag>(&mut conn)?;

        Ok(Tag::try_from(row)?)
    }

    fn update_tag(&self, id: TagId, tag: &NewTag) -> RepositoryResult<Tag> {
        use crate::schema::tags;

        let mut conn = self.conn()?;
        let changes: DbNewTag = tag.into();
        let row = diesel::update(tags::table.find(id.get()))
            .set(&changes)
            .get_result::<DbTag>(&mut conn)?;

        Ok(Tag::try_from(row)?)
    }

    fn delete_tag(&self, id: TagId) -> RepositoryResult<()> {
        use crate::schema::tags;

        let mut conn = self.conn()?;
        let affected = diesel::delete(tags::table.find(id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn set_client_tags(&self, client_id: ClientId, tag_ids: &[TagId]) -> RepositoryResult<usize> {
        use crate::schema::client_tags;

        let mut conn = self.conn()?;
        let mut links: Vec<ClientTag> = tag_ids
            .iter()
            .map(|tag_id| ClientTag {
                client_id: client_id.get(),
                tag_id: tag_id.get(),
            })
            .collect();
        links.sort_by_key(|link| link.tag_id);
        links.dedup_by_key(|link| link.tag_id);

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::delete(client_tags::table.filter(client_tags::client_id.eq(client_id.get())))
                .execute(conn)?;
            if links.is_empty() {
                return Ok(0);
            }
            diesel::insert_into(client_tags::table)
                .values(&links)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }
}
