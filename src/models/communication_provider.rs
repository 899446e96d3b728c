use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::communication_provider::{
    CommunicationProvider as DomainProvider, NewCommunicationProvider as DomainNewProvider,
};
use crate::domain::types::{
    OrganizationId, ProviderId, ProviderKind, ProviderName, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::communication_providers)]
pub struct CommunicationProvider {
    pub id: i32,
    pub organization_id: i32,
    pub kind: String,
    pub name: String,
    pub sender: String,
    pub api_key: Option<String>,
    /// JSON object stored as text.
    pub settings: String,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::communication_providers)]
pub struct NewCommunicationProvider<'a> {
    pub organization_id: i32,
    pub kind: &'a str,
    pub name: &'a str,
    pub sender: &'a str,
    pub api_key: Option<&'a str>,
    pub settings: String,
    pub is_default: bool,
}

/// `api_key` is left untouched when `None`.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::communication_providers)]
pub struct UpdateCommunicationProvider<'a> {
    pub name: &'a str,
    pub sender: &'a str,
    pub api_key: Option<&'a str>,
    pub settings: String,
    pub is_default: bool,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<CommunicationProvider> for DomainProvider {
    type Error = TypeConstraintError;

    fn try_from(value: CommunicationProvider) -> Result<Self, Self::Error> {
        let settings = serde_json::from_str(&value.settings).map_err(|e| {
            TypeConstraintError::InvalidValue(format!("provider settings are not JSON: {e}"))
        })?;

        Ok(Self {
            id: ProviderId::new(value.id)?,
            organization_id: OrganizationId::new(value.organization_id)?,
            kind: value.kind.parse::<ProviderKind>()?,
            name: ProviderName::new(value.name)?,
            sender: value.sender,
            api_key: value.api_key,
            settings,
            is_default: value.is_default,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewProvider> for NewCommunicationProvider<'a> {
    fn from(value: &'a DomainNewProvider) -> Self {
        Self {
            organization_id: value.organization_id.get(),
            kind: value.kind.as_str(),
            name: value.name.as_str(),
            sender: value.sender.as_str(),
            api_key: value.api_key.as_deref(),
            settings: value.settings.to_string(),
            is_default: value.is_default,
        }
    }
}

impl<'a> UpdateCommunicationProvider<'a> {
    pub fn from_domain(
        value: &'a crate::domain::communication_provider::UpdateCommunicationProvider,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            name: value.name.as_str(),
            sender: value.sender.as_str(),
            api_key: value.api_key.as_deref(),
            settings: value.settings.to_string(),
            is_default: value.is_default,
            updated_at,
        }
    }
}
