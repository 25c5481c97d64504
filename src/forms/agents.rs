use serde::Deserialize;
use validator::Validate;

use crate::domain::agent::NewAgent;
use crate::domain::types::{AgentId, ClientId};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Validate)]
/// Pre-registers an agent before their first sign-in.
pub struct AddAgentForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl TryFrom<AddAgentForm> for NewAgent {
    type Error = FormError;

    fn try_from(form: AddAgentForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(NewAgent::try_new(
            &form.name,
            &form.email,
            non_blank(&form.phone),
        )?)
    }
}

#[derive(Debug, Default, Deserialize)]
/// Posted from the agents page; `client_id` repeats so it is parsed with
/// `serde_html_form`.
pub struct TransferClientsForm {
    pub agent_id: i32,
    #[serde(default)]
    pub client_id: Vec<i32>,
}

pub struct TransferClientsPayload {
    pub agent_id: AgentId,
    pub client_ids: Vec<ClientId>,
}

impl TryFrom<TransferClientsForm> for TransferClientsPayload {
    type Error = FormError;

    fn try_from(form: TransferClientsForm) -> Result<Self, Self::Error> {
        let agent_id = AgentId::new(form.agent_id)?;
        let mut client_ids = form
            .client_id
            .into_iter()
            .map(|id| ClientId::new(id).map_err(FormError::from))
            .collect::<Result<Vec<_>, _>>()?;
        client_ids.sort();
        client_ids.dedup();

        if client_ids.is_empty() {
            return Err(FormError::InvalidValue("no clients selected".to_string()));
        }

        Ok(Self {
            agent_id,
            client_ids,
        })
    }
}
