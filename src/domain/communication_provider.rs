//! Outbound email/SMS provider settings of an organization.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{
    NonEmptyString, OrganizationId, ProviderChannel, ProviderId, ProviderKind, ProviderName,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CommunicationProvider {
    pub id: ProviderId,
    pub organization_id: OrganizationId,
    pub kind: ProviderKind,
    pub name: ProviderName,
    /// Sender address or phone number used by the provider.
    pub sender: String,
    #[serde(skip)]
    pub api_key: Option<String>,
    pub settings: Value,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CommunicationProvider {
    pub fn channel(&self) -> ProviderChannel {
        self.kind.channel()
    }

    /// Last four characters of the API key, the rest masked.
    pub fn api_key_hint(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }
}

pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("****{visible}")
}

#[derive(Clone, Debug)]
pub struct NewCommunicationProvider {
    pub organization_id: OrganizationId,
    pub kind: ProviderKind,
    pub name: ProviderName,
    pub sender: NonEmptyString,
    pub api_key: Option<String>,
    pub settings: Value,
    pub is_default: bool,
}

/// Replacement values; `api_key: None` keeps the stored key.
#[derive(Clone, Debug)]
pub struct UpdateCommunicationProvider {
    pub name: ProviderName,
    pub sender: NonEmptyString,
    pub api_key: Option<String>,
    pub settings: Value,
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_masked() {
        assert_eq!(mask_secret("SG.abcdef123456"), "****3456");
        assert_eq!(mask_secret("abc"), "****");
    }
}
