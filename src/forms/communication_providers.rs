use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::domain::communication_provider::{
    NewCommunicationProvider, UpdateCommunicationProvider,
};
use crate::domain::types::{NonEmptyString, OrganizationId, ProviderKind, ProviderName};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct ProviderForm {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// From address or sending phone number.
    #[validate(length(min = 1, max = 256))]
    pub sender: String,
    /// Omitted on update to keep the stored key.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub settings: Option<Value>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProviderForm {
    pub kind: ProviderKind,
    #[serde(flatten)]
    pub provider: ProviderForm,
}

fn settings_object(settings: Option<Value>) -> Result<Value, FormError> {
    match settings {
        None | Some(Value::Null) => Ok(Value::Object(Map::new())),
        Some(value @ Value::Object(_)) => Ok(value),
        Some(_) => Err(FormError::InvalidSettings),
    }
}

impl TryFrom<ProviderForm> for UpdateCommunicationProvider {
    type Error = FormError;

    fn try_from(form: ProviderForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(UpdateCommunicationProvider {
            name: ProviderName::new(form.name)?,
            sender: NonEmptyString::new(form.sender)?,
            api_key: non_blank(form.api_key),
            settings: settings_object(form.settings)?,
            is_default: form.is_default,
        })
    }
}

impl CreateProviderForm {
    pub fn into_new_provider(
        self,
        organization_id: OrganizationId,
    ) -> Result<NewCommunicationProvider, FormError> {
        let fields = UpdateCommunicationProvider::try_from(self.provider)?;
        Ok(NewCommunicationProvider {
            organization_id,
            kind: self.kind,
            name: fields.name,
            sender: fields.sender,
            api_key: fields.api_key,
            settings: fields.settings,
            is_default: fields.is_default,
        })
    }
}
