use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::{Document as DomainDocument, NewDocument as DomainNewDocument};
use crate::domain::types::{AgentId, ClientId, DocumentId, DocumentTitle, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::documents)]
pub struct Document {
    pub id: i32,
    pub public_id: String,
    pub client_id: i32,
    pub title: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub privacy_level: String,
    pub uploaded_by: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::documents)]
pub struct NewDocument<'a> {
    pub public_id: String,
    pub client_id: i32,
    pub title: &'a str,
    pub file_name: &'a str,
    pub content_type: Option<&'a str>,
    pub size_bytes: i64,
    pub privacy_level: &'a str,
    pub uploaded_by: i32,
}

impl TryFrom<Document> for DomainDocument {
    type Error = TypeConstraintError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DocumentId::new(document.id)?,
            public_id: document.public_id.parse()?,
            client_id: ClientId::new(document.client_id)?,
            title: DocumentTitle::new(document.title)?,
            file_name: document.file_name,
            content_type: document.content_type,
            size_bytes: document.size_bytes,
            privacy_level: document.privacy_level.parse()?,
            uploaded_by: AgentId::new(document.uploaded_by)?,
            created_at: document.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewDocument> for NewDocument<'a> {
    fn from(document: &'a DomainNewDocument) -> Self {
        Self {
            public_id: document.public_id.to_string(),
            client_id: document.client_id.get(),
            title: document.title.as_str(),
            file_name: document.file_name.as_str(),
            content_type: document.content_type.as_deref(),
            size_bytes: document.size_bytes,
            privacy_level: document.privacy_level.as_str(),
            uploaded_by: document.uploaded_by.get(),
        }
    }
}
