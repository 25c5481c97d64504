//! Repository implementation for insurance agents.

use std::collections::HashMap;

use diesel::{prelude::*, upsert::excluded};

use crate::domain::agent::{Agent, AgentWithClientCount, NewAgent};
use crate::domain::types::{AgentEmail, AgentId};
use crate::models::agent::{Agent as DbAgent, NewAgent as DbNewAgent};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AgentReader, AgentWriter, DieselRepository};

impl AgentWriter for DieselRepository {
    fn create_or_update_agent(&self, new_agent: &NewAgent) -> RepositoryResult<Agent> {
        use crate::schema::agents;

        let mut conn = self.conn()?;
        let insertable: DbNewAgent = new_agent.into();

        let db_agent = diesel::insert_into(agents::table)
            .values(&insertable)
            .on_conflict(agents::email)
            .do_update()
            .set(agents::name.eq(excluded(agents::name)))
            .get_result::<DbAgent>(&mut conn)?;

        Ok(Agent::try_from(db_agent)?)
    }

    fn set_agent_active(&self, id: AgentId, is_active: bool) -> RepositoryResult<Agent> {
        use crate::schema::agents;

        let mut conn = self.conn()?;
        let db_agent = diesel::update(agents::table.find(id.get()))
            .set(agents::is_active.eq(is_active))
            .get_result::<DbAgent>(&mut conn)?;

        Ok(Agent::try_from(db_agent)?)
    }
}

impl AgentReader for DieselRepository {
    fn get_agent_by_id(&self, id: AgentId) -> RepositoryResult<Option<Agent>> {
        use crate::schema::agents;

        let mut conn = self.conn()?;
        let db_agent = agents::table
            .find(id.get())
            .first::<DbAgent>(&mut conn)
            .optional()?;

        db_agent
            .map(|a| Agent::try_from(a).map_err(RepositoryError::from))
            .transpose()
    }

    fn get_agent_by_email(&self, email: &AgentEmail) -> RepositoryResult<Option<Agent>> {
        use crate::schema::agents;

        let mut conn = self.conn()?;
        let db_agent = agents::table
            .filter(agents::email.eq(email.as_str()))
            .first::<DbAgent>(&mut conn)
            .optional()?;

        db_agent
            .map(|a| Agent::try_from(a).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_agents_with_client_counts(&self) -> RepositoryResult<Vec<AgentWithClientCount>> {
        use crate::schema::{agents, clients};
        use diesel::dsl::count;

        let mut conn = self.conn()?;
        let db_agents = agents::table
            .order(agents::name.asc())
            .load::<DbAgent>(&mut conn)?;

        let counts: HashMap<i32, i64> = clients::table
            .filter(clients::deleted_at.is_null())
            .group_by(clients::agent_id)
            .select((clients::agent_id, count(clients::id)))
            .load::<(i32, i64)>(&mut conn)?
            .into_iter()
            .collect();

        db_agents
            .into_iter()
            .map(|db_agent| -> RepositoryResult<AgentWithClientCount> {
                let client_count = counts.get(&db_agent.id).copied().unwrap_or(0);
                let agent = Agent::try_from(db_agent).map_err(RepositoryError::from)?;
                Ok(AgentWithClientCount {
                    agent,
                    client_count,
                })
            })
            .collect()
    }
}
