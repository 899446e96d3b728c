use std::collections::HashSet;

use crate::domain::auth::{AuthenticatedUser, SERVICE_ACCESS_ROLE, SERVICE_OFFICE_ROLE};
use crate::domain::client::Client;
use crate::domain::types::{ClientId, EmailAddress};
use crate::dto::clients::{ClientsQuery, UploadSummary};
use crate::forms::clients::{ClientForm, ClientPayload, UploadClientsForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, TechnicianReader, WorkOrderListQuery,
    WorkOrderReader,
};
use crate::services::{
    ServiceError, ServiceResult, WorkScope, ensure_role, organization_of, work_scope,
};

/// Clients visible to the caller, searched and paginated.
pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ClientsQuery,
) -> ServiceResult<Paginated<Client>>
where
    R: ClientReader + TechnicianReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let page = params.page.unwrap_or(1).max(1);
    let mut query =
        ClientListQuery::new(organization_of(user)?).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let WorkScope::Technician(technician_id) = work_scope(repo, user)? {
        query = query.technician(technician_id);
    }

    if let Some(term) = params
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        query = query.search(term);
    }

    let (total, clients) = repo.list_clients(query).map_err(|err| {
        log::error!("Failed to list clients: {err}");
        err
    })?;

    Ok(Paginated::new(clients, page, total, DEFAULT_ITEMS_PER_PAGE))
}

/// A technician may open a client only when they have work there.
pub fn get_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<Client>
where
    R: ClientReader + TechnicianReader + WorkOrderReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let organization_id = organization_of(user)?;
    let client_id = ClientId::new(client_id)?;
    let client = repo
        .get_client_by_id(client_id, organization_id)?
        .ok_or(ServiceError::NotFound)?;

    if let WorkScope::Technician(technician_id) = work_scope(repo, user)? {
        let (assigned, _) = repo.list_work_orders(
            WorkOrderListQuery::new(organization_id)
                .client(client_id)
                .technician(technician_id)
                .paginate(1, 1),
        )?;
        if assigned == 0 {
            return Err(ServiceError::NotFound);
        }
    }

    Ok(client)
}

pub fn create_client<R>(repo: &R, user: &AuthenticatedUser, form: ClientForm) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let new_client = ClientPayload::try_from(form)?.into_new_client(organization_of(user)?);

    repo.create_client(&new_client).map_err(|err| {
        log::error!("Failed to add client: {err}");
        err.into()
    })
}

pub fn update_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let client_id = ClientId::new(client_id)?;
    let updates = ClientPayload::try_from(form)?.into_update();

    repo.update_client(client_id, organization_of(user)?, &updates)
        .map_err(|err| {
            log::error!("Failed to update client {client_id}: {err}");
            err.into()
        })
}

/// Fails with a conflict while the client has invoices.
pub fn delete_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let client_id = ClientId::new(client_id)?;
    repo.delete_client(client_id, organization_of(user)?)
        .map_err(|err| {
            log::error!("Failed to delete client {client_id}: {err}");
            err.into()
        })
}

/// Imports clients from CSV, skipping emails the organization already has
/// and repeats within the file.
pub fn upload_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &UploadClientsForm,
) -> ServiceResult<UploadSummary>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let parsed = form.parse(organization_id).map_err(|err| {
        log::error!("Failed to parse clients: {err}");
        ServiceError::from(err)
    })?;

    let mut known: HashSet<EmailAddress> = repo
        .list_client_emails(organization_id)?
        .into_iter()
        .filter_map(|email| EmailAddress::new(email).ok())
        .collect();

    let total = parsed.len();
    let fresh: Vec<_> = parsed
        .into_iter()
        .filter(|client| match &client.email {
            Some(email) => known.insert(email.clone()),
            None => true,
        })
        .collect();

    let inserted = if fresh.is_empty() {
        0
    } else {
        repo.create_clients(&fresh).map_err(|err| {
            log::error!("Failed to add clients: {err}");
            err
        })?
    };

    Ok(UploadSummary {
        inserted,
        skipped: total - fresh.len(),
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::client::ClientProperty;
    use crate::domain::types::{OrganizationId, PersonName};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn client(id: i32, name: &str) -> Client {
        Client {
            id: ClientId::new(id).unwrap(),
            organization_id: org(),
            name: PersonName::new(name).unwrap(),
            email: None,
            phone: None,
            address: ClientProperty::default().address,
            pool_type: None,
            pool_volume_gallons: None,
            notes: None,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    #[test]
    fn list_trims_search_and_paginates() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .withf(|query| {
                query.organization_id == org()
                    && query.search.as_deref() == Some("lopez")
                    && query.technician_id.is_none()
                    && query.pagination.map(|p| (p.page, p.per_page))
                        == Some((2, DEFAULT_ITEMS_PER_PAGE))
            })
            .times(1)
            .returning(|_| Ok((21, vec![client(21, "Maria Lopez")])));

        let params = ClientsQuery {
            search: Some("  lopez ".to_string()),
            page: Some(2),
        };
        let page = list_clients(&repo, &office(), params).expect("listed");

        assert_eq!(page.total, 21);
        assert_eq!(page.page, 2);
        assert_eq!(page.pages, vec![Some(1), Some(2)]);
    }

    #[test]
    fn technicians_only_list_their_clients() {
        let mut repo = MockRepository::new();
        repo.expect_get_technician_by_user()
            .returning(|_| Ok(Some(linked_technician(4))));
        repo.expect_list_clients()
            .withf(|query| query.technician_id.map(|id| id.get()) == Some(4))
            .times(1)
            .returning(|_| Ok((0, vec![])));

        list_clients(&repo, &technician_user(), ClientsQuery::default()).expect("listed");
    }

    #[test]
    fn technician_cannot_open_unrelated_client() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|_, _| Ok(Some(client(8, "Tom Reed"))));
        repo.expect_get_technician_by_user()
            .returning(|_| Ok(Some(linked_technician(4))));
        repo.expect_list_work_orders()
            .withf(|query| {
                query.client_id.map(|id| id.get()) == Some(8)
                    && query.technician_id.map(|id| id.get()) == Some(4)
            })
            .returning(|_| Ok((0, vec![])));

        assert!(matches!(
            get_client(&repo, &technician_user(), 8),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn technicians_cannot_create_clients() {
        let mut repo = MockRepository::new();
        repo.expect_create_client().times(0);

        let form = ClientForm {
            name: "Maria".to_string(),
            ..ClientForm::default()
        };

        assert!(matches!(
            create_client(&repo, &technician_user(), form),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn invalid_client_form_is_reported() {
        let mut repo = MockRepository::new();
        repo.expect_create_client().times(0);

        let form = ClientForm {
            name: "Maria".to_string(),
            phone: Some("call me".to_string()),
            ..ClientForm::default()
        };

        assert!(matches!(
            create_client(&repo, &office(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn delete_with_invoices_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_delete_client()
            .withf(|id, organization_id| id.get() == 3 && *organization_id == org())
            .returning(|_, _| {
                Err(RepositoryError::ConstraintViolation(
                    "client has invoices".to_string(),
                ))
            });

        assert!(matches!(
            delete_client(&repo, &office(), 3),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn upload_skips_known_and_repeated_emails() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "name,email\nMaria,maria@example.com\nTom,TOM@example.com\nTom again,tom@example.com\nNo Email,\n"
        )
        .unwrap();
        let form = UploadClientsForm {
            csv: actix_multipart::form::tempfile::TempFile {
                file,
                content_type: None,
                file_name: Some("clients.csv".to_string()),
                size: 0,
            },
        };

        let mut repo = MockRepository::new();
        repo.expect_list_client_emails()
            .returning(|_| Ok(vec![" Maria@Example.com".to_string()]));
        repo.expect_create_clients()
            .withf(|clients| {
                clients.len() == 2
                    && clients[0].name.as_str() == "Tom"
                    && clients[1].email.is_none()
            })
            .times(1)
            .returning(|clients| Ok(clients.len()));

        let summary = upload_clients(&repo, &office(), &form).expect("uploaded");

        assert_eq!(summary, UploadSummary { inserted: 2, skipped: 2 });
    }

    #[test]
    fn update_is_scoped_to_the_organization() {
        let mut repo = MockRepository::new();
        repo.expect_update_client()
            .withf(|id, organization_id, updates| {
                id.get() == 3
                    && *organization_id == OrganizationId::new(ORG).unwrap()
                    && updates.name.as_str() == "Maria Lopez"
            })
            .times(1)
            .returning(|_, _, _| Ok(client(3, "Maria Lopez")));

        let form = ClientForm {
            name: "Maria Lopez".to_string(),
            ..ClientForm::default()
        };

        update_client(&repo, &office(), 3, form).expect("updated");
    }
}
