//! Email and SMS provider settings, managed by organization admins.

use crate::domain::auth::{AuthenticatedUser, SERVICE_ADMIN_ROLE};
use crate::domain::communication_provider::UpdateCommunicationProvider;
use crate::domain::types::ProviderId;
use crate::dto::communication_providers::ProviderDto;
use crate::forms::communication_providers::{CreateProviderForm, ProviderForm};
use crate::repository::{CommunicationProviderReader, CommunicationProviderWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, organization_of};

pub fn list_providers<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<ProviderDto>>
where
    R: CommunicationProviderReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let providers = repo.list_providers(organization_of(user)?)?;
    Ok(providers.into_iter().map(ProviderDto::from).collect())
}

pub fn get_provider<R>(
    repo: &R,
    user: &AuthenticatedUser,
    provider_id: i32,
) -> ServiceResult<ProviderDto>
where
    R: CommunicationProviderReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    repo.get_provider_by_id(ProviderId::new(provider_id)?, organization_of(user)?)?
        .map(ProviderDto::from)
        .ok_or(ServiceError::NotFound)
}

pub fn create_provider<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateProviderForm,
) -> ServiceResult<ProviderDto>
where
    R: CommunicationProviderWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let new_provider = form.into_new_provider(organization_of(user)?)?;
    let provider = repo.create_provider(&new_provider).map_err(|err| {
        log::error!("Failed to create {} provider: {err}", new_provider.kind);
        err
    })?;

    if provider.is_default {
        log::info!(
            "Provider {} is now the default {} provider",
            provider.id,
            provider.channel()
        );
    }
    Ok(provider.into())
}

/// Leaving `api_key` out keeps the stored key.
pub fn update_provider<R>(
    repo: &R,
    user: &AuthenticatedUser,
    provider_id: i32,
    form: ProviderForm,
) -> ServiceResult<ProviderDto>
where
    R: CommunicationProviderWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let provider_id = ProviderId::new(provider_id)?;
    let updates = UpdateCommunicationProvider::try_from(form)?;
    let provider = repo
        .update_provider(provider_id, organization_of(user)?, &updates)
        .map_err(|err| {
            log::error!("Failed to update provider {provider_id}: {err}");
            err
        })?;
    Ok(provider.into())
}

pub fn delete_provider<R>(repo: &R, user: &AuthenticatedUser, provider_id: i32) -> ServiceResult<()>
where
    R: CommunicationProviderWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let provider_id = ProviderId::new(provider_id)?;
    repo.delete_provider(provider_id, organization_of(user)?)
        .map_err(|err| {
            log::error!("Failed to delete provider {provider_id}: {err}");
            err.into()
        })
}
