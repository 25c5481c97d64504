use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::types::{AgentId, ClientId};
use crate::models::client::{
    Client as DbClient, NewClient as DbNewClient, UpdateClient as DbUpdateClient,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ClientListQuery, ClientReader, ClientWriter, DieselRepository};

pub(crate) fn into_domain(rows: Vec<DbClient>) -> RepositoryResult<Vec<Client>> {
    rows.into_iter()
        .map(|row| Client::try_from(row).map_err(RepositoryError::from))
        .collect()
}

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let client = clients::table
            .find(id.get())
            .first::<DbClient>(&mut conn)
            .optional()?;

        client
            .map(|c| Client::try_from(c).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        use crate::schema::{client_tags, clients};

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = clients::table.into_boxed::<diesel::sqlite::Sqlite>();

            items = if query.deleted {
                items.filter(clients::deleted_at.is_not_null())
            } else {
                items.filter(clients::deleted_at.is_null())
            };

            if let Some(agent_id) = query.agent_id {
                items = items.filter(clients::agent_id.eq(agent_id.get()));
            }

            if let Some(tag_id) = query.tag_id {
                items = items.filter(
                    clients::id.eq_any(
                        client_tags::table
                            .filter(client_tags::tag_id.eq(tag_id.get()))
                            .select(client_tags::client_id),
                    ),
                );
            }

            if let Some(term) = query.search.as_deref() {
                let pattern = format!("%{}%", term.trim());
                items = items.filter(
                    clients::name
                        .like(pattern.clone())
                        .or(clients::phone.like(pattern.clone()))
                        .or(clients::email.like(pattern.clone()))
                        .or(clients::address.like(pattern)),
                );
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order((clients::name.asc(), clients::id.asc()));
        if let Some(pagination) = &query.pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let rows = items.load::<DbClient>(&mut conn)?;

        Ok((total, into_domain(rows)?))
    }

    fn list_referrals(&self, referrer_id: ClientId) -> RepositoryResult<Vec<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let rows = clients::table
            .filter(clients::referrer_id.eq(referrer_id.get()))
            .filter(clients::deleted_at.is_null())
            .order(clients::name.asc())
            .load::<DbClient>(&mut conn)?;

        into_domain(rows)
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let insertable: DbNewClient = new_client.into();
        let row = diesel::insert_into(clients::table)
            .values(&insertable)
            .get_result::<DbClient>(&mut conn)?;

        Ok(Client::try_from(row)?)
    }

    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewClient> = new_clients.iter().map(Into::into).collect();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::insert_into(clients::table)
                .values(&insertables)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let changes = DbUpdateClient::from_domain(updates, Utc::now().naive_utc());

        let row = diesel::update(clients::table.find(id.get()))
            .set(&changes)
            .get_result::<DbClient>(&mut conn)?;

        Ok(Client::try_from(row)?)
    }

    fn soft_delete_client(&self, id: ClientId, at: NaiveDateTime) -> RepositoryResult<()> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let affected = diesel::update(
            clients::table
                .find(id.get())
                .filter(clients::deleted_at.is_null()),
        )
        .set(clients::deleted_at.eq(Some(at)))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn restore_client(&self, id: ClientId) -> RepositoryResult<()> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let affected = diesel::update(clients::table.find(id.get()))
            .set(clients::deleted_at.eq(None::<NaiveDateTime>))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn purge_client(&self, id: ClientId) -> RepositoryResult<()> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let affected = diesel::delete(clients::table.find(id.get())).execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn transfer_clients(
        &self,
        agent_id: AgentId,
        client_ids: &[ClientId],
    ) -> RepositoryResult<usize> {
        use crate::schema::{clients, meetings};

        let mut conn = self.conn()?;
        let ids: Vec<i32> = client_ids.iter().map(|id| id.get()).collect();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            let affected = diesel::update(clients::table.filter(clients::id.eq_any(&ids)))
                .set((
                    clients::agent_id.eq(agent_id.get()),
                    clients::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            // Meetings follow their client.
            diesel::update(meetings::table.filter(meetings::client_id.eq_any(&ids)))
                .set(meetings::agent_id.eq(agent_id.get()))
                .execute(conn)?;

            Ok(affected)
        })
        .map_err(RepositoryError::from)
    }
}
