use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::Client;
use crate::domain::meeting::{Meeting, MeetingDetails, MeetingStatus, NewMeeting};
use crate::domain::types::{AgentId, ClientId, MeetingId};
use crate::models::client::Client as DbClient;
use crate::models::meeting::{Meeting as DbMeeting, NewMeeting as DbNewMeeting, UpdateMeeting};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, MeetingReader, MeetingWriter};

impl MeetingReader for DieselRepository {
    fn get_meeting(&self, id: MeetingId) -> RepositoryResult<Option<Meeting>> {
        use crate::schema::meetings;

        let mut conn = self.conn()?;
        let row = meetings::table
            .find(id.get())
            .first::<DbMeeting>(&mut conn)
            .optional()?;

        row.map(|m| Meeting::try_from(m).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_meetings(&self, client_id: ClientId) -> RepositoryResult<Vec<Meeting>> {
        use crate::schema::meetings;

        let mut conn = self.conn()?;
        meetings::table
            .filter(meetings::client_id.eq(client_id.get()))
            .order(meetings::scheduled_at.desc())
            .load::<DbMeeting>(&mut conn)?
            .into_iter()
            .map(|m| Meeting::try_from(m).map_err(RepositoryError::from))
            .collect()
    }

    fn list_upcoming_meetings(
        &self,
        agent_id: Option<AgentId>,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<(Meeting, Client)>> {
        use crate::schema::{clients, meetings};

        let mut conn = self.conn()?;
        let mut query = meetings::table
            .inner_join(clients::table)
            .filter(clients::deleted_at.is_null())
            .filter(meetings::status.eq(MeetingStatus::Scheduled.as_str()))
            .filter(meetings::scheduled_at.between(from, to))
            .select((DbMeeting::as_select(), DbClient::as_select()))
            .order(meetings::scheduled_at.asc())
            .into_boxed();

        if let Some(agent_id) = agent_id {
            query = query.filter(clients::agent_id.eq(agent_id.get()));
        }

        query
            .load::<(DbMeeting, DbClient)>(&mut conn)?
            .into_iter()
            .map(|(meeting, client)| -> RepositoryResult<(Meeting, Client)> {
                Ok((Meeting::try_from(meeting)?, Client::try_from(client)?))
            })
            .collect()
    }
}

impl MeetingWriter for DieselRepository {
    fn create_meeting(&self, new_meeting: &NewMeeting) -> RepositoryResult<Meeting> {
        use crate::schema::meetings;

        let mut conn = self.conn()?;
        let insertable: DbNewMeeting = new_meeting.into();
        let row = diesel::insert_into(meetings::table)
            .values(&insertable)
            .get_result::<DbMeeting>(&mut conn)?;

        Ok(Meeting::try_from(row)?)
    }

    fn update_meeting(
        &self,
        id: MeetingId,
        details: &MeetingDetails,
    ) -> RepositoryResult<Meeting> {
        use crate::schema::meetings;

        let mut conn = self.conn()?;
        let changes: UpdateMeeting = details.into();
        let row = diesel::update(meetings::table.find(id.get()))
            .set(&changes)
            .get_result::<DbMeeting>(&mut conn)?;

        Ok(Meeting::try_from(row)?)
    }

    fn delete_meeting(&self, id: MeetingId) -> RepositoryResult<()> {
        use crate::schema::meetings;

        let mut conn = self.conn()?;
        let affected = diesel::delete(meetings::table.find(id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
