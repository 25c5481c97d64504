//! Files attached to a client record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::privacy::PrivacyLevel;
use crate::domain::types::{AgentId, ClientId, DocumentId, DocumentTitle, PublicId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub public_id: PublicId,
    pub client_id: ClientId,
    pub title: DocumentTitle,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub privacy_level: PrivacyLevel,
    pub uploaded_by: AgentId,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDocument {
    pub public_id: PublicId,
    pub client_id: ClientId,
    pub title: DocumentTitle,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub privacy_level: PrivacyLevel,
    pub uploaded_by: AgentId,
}

/// Reduces an uploaded file name to its last path component.
///
/// Browsers may send full client-side paths; only the base name is kept and
/// an empty result falls back to `document`.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace(['"', '\r', '\n'], "");
    if base.is_empty() || base == "." || base == ".." {
        "document".to_string()
    } else {
        base
    }
}
