use diesel::prelude::*;

use crate::domain::document::{Document, NewDocument};
use crate::domain::types::{ClientId, DocumentId, PublicId};
use crate::models::document::{Document as DbDocument, NewDocument as DbNewDocument};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, DocumentReader, DocumentWriter};

impl DocumentReader for DieselRepository {
    fn get_document(&self, public_id: PublicId) -> RepositoryResult<Option<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let row = documents::table
            .filter(documents::public_id.eq(public_id.to_string()))
            .first::<DbDocument>(&mut conn)
            .optional()?;

        row.map(|d| Document::try_from(d).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_documents(&self, client_id: ClientId) -> RepositoryResult<Vec<Document>> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        documents::table
            .filter(documents::client_id.eq(client_id.get()))
            .order((documents::created_at.desc(), documents::id.desc()))
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(|d| Document::try_from(d).map_err(RepositoryError::from))
            .collect()
    }
}

impl DocumentWriter for DieselRepository {
    fn create_document(&self, new_document: &NewDocument) -> RepositoryResult<Document> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let insertable: DbNewDocument = new_document.into();
        let row = diesel::insert_into(documents::table)
            .values(&insertable)
            .get_result::<DbDocument>(&mut conn)?;

        Ok(Document::try_from(row)?)
    }

    fn delete_document(&self, id: DocumentId) -> RepositoryResult<()> {
        use crate::schema::documents;

        let mut conn = self.conn()?;
        let affected = diesel::delete(documents::table.find(id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
