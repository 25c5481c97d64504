use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};

use crate::domain::document::sanitize_file_name;
use crate::domain::privacy::PrivacyLevel;
use crate::domain::types::DocumentTitle;
use crate::forms::{FormError, parse_privacy_level};

/// Largest document accepted for upload, in bytes.
pub const MAX_DOCUMENT_SIZE: usize = 20 * 1024 * 1024;

#[derive(MultipartForm)]
pub struct UploadDocumentForm {
    #[multipart(limit = "20MiB")]
    pub file: TempFile,
    pub title: Option<Text<String>>,
    pub privacy_level: Option<Text<String>>,
}

/// Validated metadata of an uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpload {
    pub title: DocumentTitle,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    /// `None` inherits the client's level.
    pub privacy_level: Option<PrivacyLevel>,
}

impl DocumentUpload {
    /// Validates raw upload metadata; a blank title falls back to the file name.
    pub fn try_new(
        title: Option<&str>,
        file_name: Option<&str>,
        content_type: Option<String>,
        size: usize,
        privacy_level: Option<&str>,
    ) -> Result<Self, FormError> {
        if size == 0 {
            return Err(FormError::Upload("file is empty".to_string()));
        }
        if size > MAX_DOCUMENT_SIZE {
            return Err(FormError::Upload("file exceeds 20 MiB".to_string()));
        }

        let file_name = sanitize_file_name(file_name.unwrap_or_default());
        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => DocumentTitle::new(title)?,
            None => DocumentTitle::new(file_name.as_str())?,
        };
        let size_bytes = i64::try_from(size).map_err(|_| FormError::Upload("file too large".into()))?;

        Ok(Self {
            title,
            file_name,
            content_type,
            size_bytes,
            privacy_level: parse_privacy_level(privacy_level.unwrap_or_default())?,
        })
    }
}

impl TryFrom<&UploadDocumentForm> for DocumentUpload {
    type Error = FormError;

    fn try_from(form: &UploadDocumentForm) -> Result<Self, Self::Error> {
        DocumentUpload::try_new(
            form.title.as_ref().map(|t| t.as_str()),
            form.file.file_name.as_deref(),
            form.file.content_type.as_ref().map(|m| m.to_string()),
            form.file.size,
            form.privacy_level.as_ref().map(|t| t.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use actix_multipart::form::MultipartCollect;

    use super::*;

    #[test]
    fn title_defaults_to_file_name() {
        let upload =
            DocumentUpload::try_new(Some(" "), Some("C:\\scan\\id.pdf"), None, 10, None).unwrap();
        assert_eq!(upload.title.as_str(), "id.pdf");
        assert_eq!(upload.file_name, "id.pdf");
        assert_eq!(upload.privacy_level, None);
    }

    #[test]
    fn size_limits_are_enforced() {
        assert!(DocumentUpload::try_new(None, Some("a.txt"), None, 0, None).is_err());
        assert!(
            DocumentUpload::try_new(None, Some("a.txt"), None, MAX_DOCUMENT_SIZE, None).is_ok()
        );
        assert!(
            DocumentUpload::try_new(None, Some("a.txt"), None, MAX_DOCUMENT_SIZE + 1, None)
                .is_err()
        );
    }

    #[test]
    fn extractor_limit_matches_upload_check() {
        assert_eq!(
            <UploadDocumentForm as MultipartCollect>::limit("file"),
            Some(MAX_DOCUMENT_SIZE)
        );
    }

    #[test]
    fn explicit_privacy_level_is_kept() {
        let upload = DocumentUpload::try_new(
            Some("Medical report"),
            Some("report.pdf"),
            Some("application/pdf".into()),
            2048,
            Some("confidential"),
        )
        .unwrap();
        assert_eq!(upload.privacy_level, Some(PrivacyLevel::Confidential));
        assert_eq!(upload.size_bytes, 2048);
    }
}
