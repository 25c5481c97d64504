use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;

use crate::domain::client::ClientProfile;
use crate::domain::privacy::PrivacyLevel;
use crate::domain::types::AgentEmail;
use crate::forms::{FormError, non_blank, parse_date, parse_privacy_level};

#[derive(MultipartForm)]
pub struct UploadClientsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

/// One CSV row. Only `name` is required; other columns may be absent.
#[derive(Debug, Deserialize)]
struct CsvClientRecord {
    name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    birth_date: String,
    #[serde(default)]
    occupation: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    privacy_level: String,
    #[serde(default)]
    agent_email: String,
}

/// A client parsed from the import file, not yet assigned to an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedClient {
    pub profile: ClientProfile,
    pub level_given: bool,
    pub agent_email: Option<AgentEmail>,
}

impl ImportedClient {
    pub fn with_default_level(mut self, level: PrivacyLevel) -> Self {
        if !self.level_given {
            self.profile.privacy_level = level;
        }
        self
    }
}

impl TryFrom<CsvClientRecord> for ImportedClient {
    type Error = FormError;

    fn try_from(record: CsvClientRecord) -> Result<Self, Self::Error> {
        let level = parse_privacy_level(&record.privacy_level)?;
        let profile = ClientProfile::try_new(
            &record.name,
            Some(&record.phone),
            Some(&record.email),
            Some(&record.address),
            parse_date(&record.birth_date)?,
            Some(&record.occupation),
            Some(&record.notes),
            level.unwrap_or_default(),
        )?;
        let agent_email = non_blank(&record.agent_email)
            .map(AgentEmail::new)
            .transpose()?;

        Ok(Self {
            profile,
            level_given: level.is_some(),
            agent_email,
        })
    }
}

impl UploadClientsForm {
    pub fn parse(&self) -> Result<Vec<ImportedClient>, FormError> {
        let file = self
            .csv
            .file
            .reopen()
            .map_err(|err| FormError::Upload(err.to_string()))?;
        parse_clients_csv(file)
    }
}

/// Parses a client import file. The first line holds the headers; the whole
/// file is rejected when any row is invalid, naming the offending line.
pub fn parse_clients_csv<R: Read>(reader: R) -> Result<Vec<ImportedClient>, FormError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut clients = Vec::new();
    for (index, record) in rdr.deserialize::<CsvClientRecord>().enumerate() {
        let line = index + 2;
        let client = record
            .map_err(FormError::from)
            .and_then(ImportedClient::try_from)
            .map_err(|err| FormError::Csv(format!("line {line}: {err}")))?;
        clients.push(client);
    }

    if clients.is_empty() {
        return Err(FormError::Csv("no clients found".to_string()));
    }

    Ok(clients)
}
