use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, ClientEmailRecord, ClientMerge, NewClient, UpdateClient};
use crate::domain::types::{ClientId, EmailAddress, OrganizationId};
use crate::models::client::{
    Client as DbClient, NewClient as DbNewClient, UpdateClient as DbUpdateClient,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, DieselRepository, contains_pattern,
};
use crate::schema::{clients, invoices, projects, work_orders};

/// Builds the filtered client query shared by the list and its count.
fn filtered_clients(query: &ClientListQuery) -> clients::BoxedQuery<'static, Sqlite> {
    let mut items = clients::table
        .filter(clients::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(term) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let pattern = contains_pattern(term);
        items = items.filter(
            clients::name
                .like(pattern.clone())
                .escape('\\')
                .or(clients::email.like(pattern.clone()).escape('\\'))
                .or(clients::phone.like(pattern.clone()).escape('\\'))
                .or(clients::address.like(pattern).escape('\\')),
        );
    }

    if let Some(technician_id) = query.technician_id {
        let assigned = work_orders::table
            .filter(work_orders::technician_id.eq(technician_id.get()))
            .select(work_orders::client_id);
        items = items.filter(clients::id.eq_any(assigned));
    }

    items
}

impl ClientReader for DieselRepository {
    fn get_client_by_id(
        &self,
        id: ClientId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Client>> {
        let mut conn = self.conn()?;
        let client = clients::table
            .filter(clients::id.eq(id.get()))
            .filter(clients::organization_id.eq(organization_id.get()))
            .first::<DbClient>(&mut conn)
            .optional()?;

        Ok(client.map(Client::try_from).transpose()?)
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_clients(&query).count().get_result(&mut conn)?;

        let mut items = filtered_clients(&query).order((clients::name.asc(), clients::id.asc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let clients = items
            .load::<DbClient>(&mut conn)?
            .into_iter()
            .map(Client::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, clients))
    }

    fn list_client_emails(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<String>> {
        let mut conn = self.conn()?;
        let emails = clients::table
            .filter(clients::organization_id.eq(organization_id.get()))
            .filter(clients::email.is_not_null())
            .select(clients::email)
            .load::<Option<String>>(&mut conn)?;

        Ok(emails.into_iter().flatten().collect())
    }

    fn list_client_email_records(
        &self,
        organization_id: Option<OrganizationId>,
    ) -> RepositoryResult<Vec<ClientEmailRecord>> {
        let mut conn = self.conn()?;
        let mut query = clients::table
            .select((clients::id, clients::organization_id, clients::email))
            .order(clients::id.asc())
            .into_boxed();
        if let Some(organization_id) = organization_id {
            query = query.filter(clients::organization_id.eq(organization_id.get()));
        }

        query
            .load::<(i32, i32, Option<String>)>(&mut conn)?
            .into_iter()
            .map(|(id, organization_id, email)| -> RepositoryResult<ClientEmailRecord> {
                Ok(ClientEmailRecord {
                    id: ClientId::new(id)?,
                    organization_id: OrganizationId::new(organization_id)?,
                    email,
                })
            })
            .collect()
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        let mut conn = self.conn()?;
        let client = diesel::insert_into(clients::table)
            .values(DbNewClient::from(new_client))
            .get_result::<DbClient>(&mut conn)?;

        Ok(client.try_into()?)
    }

    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let insertables: Vec<DbNewClient> = new_clients.iter().map(DbNewClient::from).collect();

        let affected = diesel::insert_into(clients::table)
            .values(&insertables)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn update_client(
        &self,
        id: ClientId,
        organization_id: OrganizationId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client> {
        let mut conn = self.conn()?;
        let changes = DbUpdateClient::from_domain(updates, Utc::now().naive_utc());

        let updated = diesel::update(
            clients::table
                .filter(clients::id.eq(id.get()))
                .filter(clients::organization_id.eq(organization_id.get())),
        )
        .set(&changes)
        .get_result::<DbClient>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_client(&self, id: ClientId, organization_id: OrganizationId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let exists = clients::table
                .filter(clients::id.eq(id.get()))
                .filter(clients::organization_id.eq(organization_id.get()))
                .select(clients::id)
                .first::<i32>(conn)
                .optional()?;
            if exists.is_none() {
                return Err(RepositoryError::NotFound);
            }

            let invoiced: i64 = invoices::table
                .filter(invoices::organization_id.eq(organization_id.get()))
                .filter(invoices::client_id.eq(id.get()))
                .count()
                .get_result(conn)?;
            if invoiced > 0 {
                return Err(RepositoryError::ConstraintViolation(format!(
                    "client {id} has {invoiced} invoice(s)"
                )));
            }

            let deleted = diesel::delete(
                clients::table
                    .filter(clients::id.eq(id.get()))
                    .filter(clients::organization_id.eq(organization_id.get())),
            )
            .execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }

    fn update_client_email(&self, id: ClientId, email: &EmailAddress) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        diesel::update(clients::table.find(id.get()))
            .set((
                clients::email.eq(Some(email.as_str())),
                clients::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    fn merge_clients(&self, merge: &ClientMerge) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let organization_id = merge.organization_id.get();
        let keep = merge.keep.get();
        let duplicates: Vec<i32> = merge.duplicates.iter().map(|id| id.get()).collect();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            diesel::update(
                projects::table
                    .filter(projects::organization_id.eq(organization_id))
                    .filter(projects::client_id.eq_any(&duplicates)),
            )
            .set(projects::client_id.eq(keep))
            .execute(conn)?;

            diesel::update(
                work_orders::table
                    .filter(work_orders::organization_id.eq(organization_id))
                    .filter(work_orders::client_id.eq_any(&duplicates)),
            )
            .set(work_orders::client_id.eq(keep))
            .execute(conn)?;

            diesel::update(
                invoices::table
                    .filter(invoices::organization_id.eq(organization_id))
                    .filter(invoices::client_id.eq_any(&duplicates)),
            )
            .set(invoices::client_id.eq(keep))
            .execute(conn)?;

            let deleted = diesel::delete(
                clients::table
                    .filter(clients::organization_id.eq(organization_id))
                    .filter(clients::id.eq_any(&duplicates)),
            )
            .execute(conn)?;

            diesel::update(
                clients::table
                    .filter(clients::id.eq(keep))
                    .filter(clients::organization_id.eq(organization_id)),
            )
            .set((
                clients::email.eq(Some(merge.email.as_str())),
                clients::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

            Ok(deleted)
        })
    }
}
