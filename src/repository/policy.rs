use chrono::{NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::client::Client;
use crate::domain::policy::{NewPolicy, Policy, PolicyDetails, PolicyStatus};
use crate::domain::types::{AgentId, ClientId, PolicyId};
use crate::models::client::Client as DbClient;
use crate::models::policy::{NewPolicy as DbNewPolicy, Policy as DbPolicy, UpdatePolicy};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, PolicyReader, PolicyWriter};

impl PolicyReader for DieselRepository {
    fn get_policy(&self, id: PolicyId) -> RepositoryResult<Option<Policy>> {
        use crate::schema::policies;

        let mut conn = self.conn()?;
        let row = policies::table
            .find(id.get())
            .first::<DbPolicy>(&mut conn)
            .optional()?;

        row.map(|p| Policy::try_from(p).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_policies(&self, client_id: ClientId) -> RepositoryResult<Vec<Policy>> {
        use crate::schema::policies;

        let mut conn = self.conn()?;
        policies::table
            .filter(policies::client_id.eq(client_id.get()))
            .order((policies::start_date.desc(), policies::id.desc()))
            .load::<DbPolicy>(&mut conn)?
            .into_iter()
            .map(|p| Policy::try_from(p).map_err(RepositoryError::from))
            .collect()
    }

    fn list_policies_ending_between(
        &self,
        agent_id: Option<AgentId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<(Policy, Client)>> {
        use crate::schema::{clients, policies};

        let mut conn = self.conn()?;
        let mut query = policies::table
            .inner_join(clients::table)
            .filter(clients::deleted_at.is_null())
            .filter(policies::status.eq(PolicyStatus::Active.as_str()))
            .filter(policies::end_date.ge(from))
            .filter(policies::end_date.le(to))
            .select((DbPolicy::as_select(), DbClient::as_select()))
            .order(policies::end_date.asc())
            .into_boxed();

        if let Some(agent_id) = agent_id {
            query = query.filter(clients::agent_id.eq(agent_id.get()));
        }

        query
            .load::<(DbPolicy, DbClient)>(&mut conn)?
            .into_iter()
            .map(|(policy, client)| -> RepositoryResult<(Policy, Client)> {
                Ok((Policy::try_from(policy)?, Client::try_from(client)?))
            })
            .collect()
    }
}

impl PolicyWriter for DieselRepository {
    fn create_policy(&self, new_policy: &NewPolicy) -> RepositoryResult<Policy> {
        use crate::schema::policies;

        let mut conn = self.conn()?;
        let insertable: DbNewPolicy = new_policy.into();
        let row = diesel::insert_into(policies::table)
            .values(&insertable)
            .get_result::<DbPolicy>(&mut conn)?;

        Ok(Policy::try_from(row)?)
    }

    fn update_policy(&self, id: PolicyId, details: &PolicyDetails) -> RepositoryResult<Policy> {
        use crate::schema::policies;

        let mut conn = self.conn()?;
        let changes = UpdatePolicy::from_domain(details, Utc::now().naive_utc());
        let row = diesel::update(policies::table.find(id.get()))
            .set(&changes)
            .get_result::<DbPolicy>(&mut conn)?;

        Ok(Policy::try_from(row)?)
    }

    fn delete_policy(&self, id: PolicyId) -> RepositoryResult<()> {
        use crate::schema::policies;

        let mut conn = self.conn()?;
        let affected = diesel::delete(policies::table.find(id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
