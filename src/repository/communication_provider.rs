use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::communication_provider::{
    CommunicationProvider, NewCommunicationProvider, UpdateCommunicationProvider,
};
use crate::domain::types::{OrganizationId, ProviderChannel, ProviderId, ProviderKind};
use crate::models::communication_provider::{
    CommunicationProvider as DbProvider, NewCommunicationProvider as DbNewProvider,
    UpdateCommunicationProvider as DbUpdateProvider,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CommunicationProviderReader, CommunicationProviderWriter, DieselRepository,
};
use crate::schema::communication_providers;

/// Stored kinds delivering through `channel`.
fn kinds_of(channel: ProviderChannel) -> Vec<&'static str> {
    ProviderKind::ALL
        .iter()
        .filter(|kind| kind.channel() == channel)
        .map(|kind| kind.as_str())
        .collect()
}

/// Drops the default flag from every other provider of the same channel.
fn clear_default(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    channel: ProviderChannel,
    except: Option<ProviderId>,
) -> RepositoryResult<()> {
    diesel::update(
        communication_providers::table
            .filter(communication_providers::organization_id.eq(organization_id.get()))
            .filter(communication_providers::kind.eq_any(kinds_of(channel)))
            .filter(communication_providers::id.ne(except.map(ProviderId::get).unwrap_or(0))),
    )
    .set(communication_providers::is_default.eq(false))
    .execute(conn)?;
    Ok(())
}

impl CommunicationProviderReader for DieselRepository {
    fn get_provider_by_id(
        &self,
        id: ProviderId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<CommunicationProvider>> {
        let mut conn = self.conn()?;
        let provider = communication_providers::table
            .filter(communication_providers::id.eq(id.get()))
            .filter(communication_providers::organization_id.eq(organization_id.get()))
            .first::<DbProvider>(&mut conn)
            .optional()?;

        Ok(provider.map(CommunicationProvider::try_from).transpose()?)
    }

    fn list_providers(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<CommunicationProvider>> {
        let mut conn = self.conn()?;
        let providers = communication_providers::table
            .filter(communication_providers::organization_id.eq(organization_id.get()))
            .order((
                communication_providers::kind.asc(),
                communication_providers::name.asc(),
            ))
            .load::<DbProvider>(&mut conn)?;

        Ok(providers
            .into_iter()
            .map(CommunicationProvider::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl CommunicationProviderWriter for DieselRepository {
    fn create_provider(
        &self,
        new_provider: &NewCommunicationProvider,
    ) -> RepositoryResult<CommunicationProvider> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            if new_provider.is_default {
                clear_default(
                    conn,
                    new_provider.organization_id,
                    new_provider.kind.channel(),
                    None,
                )?;
            }

            let provider = diesel::insert_into(communication_providers::table)
                .values(DbNewProvider::from(new_provider))
                .get_result::<DbProvider>(conn)?;

            Ok(provider.try_into()?)
        })
    }

    fn update_provider(
        &self,
        id: ProviderId,
        organization_id: OrganizationId,
        updates: &UpdateCommunicationProvider,
    ) -> RepositoryResult<CommunicationProvider> {
        let mut conn = self.conn()?;
        let changes = DbUpdateProvider::from_domain(updates, Utc::now().naive_utc());

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let kind = communication_providers::table
                .filter(communication_providers::id.eq(id.get()))
                .filter(communication_providers::organization_id.eq(organization_id.get()))
                .select(communication_providers::kind)
                .first::<String>(conn)?
                .parse::<ProviderKind>()?;

            if updates.is_default {
                clear_default(conn, organization_id, kind.channel(), Some(id))?;
            }

            let provider = diesel::update(communication_providers::table.find(id.get()))
                .set(&changes)
                .get_result::<DbProvider>(conn)?;

            Ok(provider.try_into()?)
        })
    }

    fn delete_provider(
        &self,
        id: ProviderId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            communication_providers::table
                .filter(communication_providers::id.eq(id.get()))
                .filter(communication_providers::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
