use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::domain::communication_provider::CommunicationProvider;
use crate::domain::types::{ProviderChannel, ProviderKind};

/// Provider as shown to admins; the API key is reduced to a hint.
#[derive(Debug, Serialize, PartialEq)]
pub struct ProviderDto {
    pub id: i32,
    pub kind: ProviderKind,
    pub channel: ProviderChannel,
    pub name: String,
    pub sender: String,
    pub api_key_hint: Option<String>,
    pub settings: Value,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CommunicationProvider> for ProviderDto {
    fn from(provider: CommunicationProvider) -> Self {
        Self {
            id: provider.id.get(),
            kind: provider.kind,
            channel: provider.channel(),
            api_key_hint: provider.api_key_hint(),
            name: provider.name.into_inner(),
            sender: provider.sender,
            settings: provider.settings,
            is_default: provider.is_default,
            created_at: provider.created_at,
            updated_at: provider.updated_at,
        }
    }
}
