//! Work orders and the schedule built from them.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::domain::auth::{AuthenticatedUser, SERVICE_ACCESS_ROLE, SERVICE_OFFICE_ROLE};
use crate::domain::types::{
    ClientId, OrganizationId, ProjectId, TechnicianId, WorkOrderId,
};
use crate::domain::work_order::{UpdateWorkOrder, WorkOrder, WorkOrderTransition};
use crate::dto::work_orders::{ScheduleDay, ScheduleQuery, TransitionResult, WorkOrdersQuery};
use crate::forms::work_orders::{CreateWorkOrderForm, TransitionForm, WorkOrderForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ClientReader, ProjectReader, TechnicianReader, WorkOrderListQuery, WorkOrderReader,
    WorkOrderWriter,
};
use crate::services::{
    ServiceError, ServiceResult, WorkScope, ensure_role, organization_of, work_scope,
};

/// Longest range `/api/schedule` answers for, in days.
pub const MAX_SCHEDULE_DAYS: i64 = 62;

pub fn list_work_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: WorkOrdersQuery,
) -> ServiceResult<Paginated<WorkOrder>>
where
    R: TechnicianReader + WorkOrderReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let page = params.page.unwrap_or(1).max(1);
    let mut query = WorkOrderListQuery::new(organization_of(user)?)
        .scheduled_between(params.from, params.to)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(status) = params.status {
        query = query.status(status);
    }
    if let Some(kind) = params.kind {
        query = query.kind(kind);
    }
    if let Some(client_id) = params.client_id {
        query = query.client(ClientId::new(client_id)?);
    }
    if let Some(project_id) = params.project_id {
        query = query.project(ProjectId::new(project_id)?);
    }
    query = match work_scope(repo, user)? {
        WorkScope::Technician(own) => query.technician(own),
        WorkScope::Organization => match params.technician_id {
            Some(technician_id) => query.technician(TechnicianId::new(technician_id)?),
            None => query,
        },
    };

    let (total, work_orders) = repo.list_work_orders(query).map_err(|err| {
        log::error!("Failed to list work orders: {err}");
        err
    })?;

    Ok(Paginated::new(work_orders, page, total, DEFAULT_ITEMS_PER_PAGE))
}

/// Work orders between two dates, grouped by day, cancelled ones left out.
pub fn schedule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ScheduleQuery,
) -> ServiceResult<Vec<ScheduleDay>>
where
    R: TechnicianReader + WorkOrderReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    if params.to < params.from {
        return Err(ServiceError::Form(
            "schedule must end on or after its start".to_string(),
        ));
    }
    if (params.to - params.from).num_days() > MAX_SCHEDULE_DAYS {
        return Err(ServiceError::Form(format!(
            "schedule cannot span more than {MAX_SCHEDULE_DAYS} days"
        )));
    }

    let mut query = WorkOrderListQuery::new(organization_of(user)?)
        .scheduled_between(Some(params.from), Some(params.to))
        .without_cancelled();
    query = match work_scope(repo, user)? {
        WorkScope::Technician(own) => query.technician(own),
        WorkScope::Organization => match params.technician_id {
            Some(technician_id) => query.technician(TechnicianId::new(technician_id)?),
            None => query,
        },
    };

    let (_, work_orders) = repo.list_work_orders(query)?;

    let mut days: BTreeMap<_, Vec<WorkOrder>> = BTreeMap::new();
    for work_order in work_orders {
        days.entry(work_order.scheduled_on)
            .or_default()
            .push(work_order);
    }

    Ok(days
        .into_iter()
        .map(|(date, work_orders)| ScheduleDay { date, work_orders })
        .collect())
}

/// Loads a work order the caller may see.
fn load_visible<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: WorkOrderId,
) -> ServiceResult<WorkOrder>
where
    R: TechnicianReader + WorkOrderReader + ?Sized,
{
    let work_order = repo
        .get_work_order_by_id(work_order_id, organization_of(user)?)?
        .ok_or(ServiceError::NotFound)?;

    match work_scope(repo, user)? {
        WorkScope::Technician(own) if work_order.technician_id != Some(own) => {
            Err(ServiceError::NotFound)
        }
        _ => Ok(work_order),
    }
}

pub fn get_work_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
) -> ServiceResult<WorkOrder>
where
    R: TechnicianReader + WorkOrderReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    load_visible(repo, user, WorkOrderId::new(work_order_id)?)
}

/// The client, technician and project must all belong to the organization,
/// and the project to the client.
fn check_references<R>(
    repo: &R,
    organization_id: OrganizationId,
    client_id: ClientId,
    technician_id: Option<TechnicianId>,
    project_id: Option<ProjectId>,
) -> ServiceResult<()>
where
    R: ClientReader + TechnicianReader + ProjectReader + ?Sized,
{
    if repo.get_client_by_id(client_id, organization_id)?.is_none() {
        return Err(ServiceError::Form(format!("unknown client {client_id}")));
    }

    if let Some(technician_id) = technician_id {
        match repo.get_technician_by_id(technician_id, organization_id)? {
            Some(technician) if technician.is_active => {}
            Some(_) => {
                return Err(ServiceError::Form(format!(
                    "technician {technician_id} is inactive"
                )));
            }
            None => {
                return Err(ServiceError::Form(format!(
                    "unknown technician {technician_id}"
                )));
            }
        }
    }

    if let Some(project_id) = project_id {
        match repo.get_project_by_id(project_id, organization_id)? {
            Some(project) if project.client_id == client_id => {}
            Some(_) => {
                return Err(ServiceError::Form(format!(
                    "project {project_id} belongs to another client"
                )));
            }
            None => {
                return Err(ServiceError::Form(format!("unknown project {project_id}")));
            }
        }
    }

    Ok(())
}

pub fn create_work_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateWorkOrderForm,
) -> ServiceResult<WorkOrder>
where
    R: ClientReader + TechnicianReader + ProjectReader + WorkOrderWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let new_work_order = form.into_new_work_order(organization_id)?;
    check_references(
        repo,
        organization_id,
        new_work_order.client_id,
        new_work_order.technician_id,
        new_work_order.project_id,
    )?;

    repo.create_work_order(&new_work_order).map_err(|err| {
        log::error!("Failed to create work order: {err}");
        err.into()
    })
}

fn ensure_not_invoiced(work_order: &WorkOrder) -> ServiceResult<()> {
    match work_order.invoice_id {
        Some(invoice_id) => Err(ServiceError::Conflict(format!(
            "work order {} is billed on invoice {invoice_id}",
            work_order.id
        ))),
        None => Ok(()),
    }
}

pub fn update_work_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
    form: WorkOrderForm,
) -> ServiceResult<WorkOrder>
where
    R: ClientReader + TechnicianReader + ProjectReader + WorkOrderReader + WorkOrderWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let work_order_id = WorkOrderId::new(work_order_id)?;
    let updates = UpdateWorkOrder::try_from(form)?;

    let existing = repo
        .get_work_order_by_id(work_order_id, organization_id)?
        .ok_or(ServiceError::NotFound)?;
    ensure_not_invoiced(&existing)?;
    check_references(
        repo,
        organization_id,
        existing.client_id,
        updates.technician_id,
        updates.project_id,
    )?;

    repo.update_work_order(work_order_id, organization_id, &updates)
        .map_err(|err| {
            log::error!("Failed to update work order {work_order_id}: {err}");
            err.into()
        })
}

/// Moves a work order along its status machine. Technicians may move their
/// own work orders only.
pub fn transition_work_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
    form: TransitionForm,
) -> ServiceResult<TransitionResult>
where
    R: TechnicianReader + WorkOrderReader + WorkOrderWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let work_order = load_visible(repo, user, WorkOrderId::new(work_order_id)?)?;
    let transition =
        WorkOrderTransition::plan(&work_order, form.status, Utc::now().naive_utc()).ok_or_else(
            || {
                ServiceError::InvalidTransition(format!(
                    "cannot move work order from {} to {}",
                    work_order.status, form.status
                ))
            },
        )?;

    let (work_order, next_occurrence) = repo
        .transition_work_order(work_order.id, work_order.organization_id, &transition)
        .map_err(|err| {
            log::error!("Failed to change status of work order {}: {err}", work_order.id);
            err
        })?;

    if let Some(next) = &next_occurrence {
        log::info!(
            "Scheduled work order {} on {} after completing {}",
            next.id,
            next.scheduled_on,
            work_order.id
        );
    }

    Ok(TransitionResult {
        work_order,
        next_occurrence,
    })
}

pub fn delete_work_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
) -> ServiceResult<()>
where
    R: WorkOrderReader + WorkOrderWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let work_order_id = WorkOrderId::new(work_order_id)?;
    let existing = repo
        .get_work_order_by_id(work_order_id, organization_id)?
        .ok_or(ServiceError::NotFound)?;
    ensure_not_invoiced(&existing)?;

    repo.delete_work_order(work_order_id, organization_id)
        .map_err(|err| {
            log::error!("Failed to delete work order {work_order_id}: {err}");
            err.into()
        })
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::client::Client;
    use crate::domain::types::{
        Cents, InvoiceId, PersonName, Recurrence, WorkOrderKind, WorkOrderStatus, WorkOrderTitle,
    };
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    pub(crate) fn work_order(id: i32, technician: Option<i32>, day: u32) -> WorkOrder {
        WorkOrder {
            id: WorkOrderId::new(id).unwrap(),
            organization_id: org(),
            client_id: ClientId::new(1).unwrap(),
            technician_id: technician.map(|t| TechnicianId::new(t).unwrap()),
            project_id: None,
            invoice_id: None,
            kind: WorkOrderKind::Maintenance,
            status: WorkOrderStatus::Scheduled,
            recurrence: Recurrence::Weekly,
            title: WorkOrderTitle::new("Weekly service").unwrap(),
            description: None,
            scheduled_on: NaiveDate::from_ymd_opt(2026, 5, day).unwrap(),
            price: Cents::new(8_500).unwrap(),
            completed_at: None,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    fn client() -> Client {
        Client {
            id: ClientId::new(1).unwrap(),
            organization_id: org(),
            name: PersonName::new("Maria Lopez").unwrap(),
            email: None,
            phone: None,
            address: "12 Palm Dr".to_string(),
            pool_type: None,
            pool_volume_gallons: None,
            notes: None,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    fn form() -> WorkOrderForm {
        WorkOrderForm {
            technician_id: Some(4),
            project_id: None,
            kind: WorkOrderKind::Maintenance,
            recurrence: Recurrence::Weekly,
            title: "Weekly service".to_string(),
            description: None,
            scheduled_on: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            price: 8_500,
        }
    }

    #[test]
    fn technician_filter_cannot_be_widened_by_technicians() {
        let mut repo = MockRepository::new();
        repo.expect_get_technician_by_user()
            .returning(|_| Ok(Some(linked_technician(4))));
        repo.expect_list_work_orders()
            .withf(|query| query.technician_id.map(|t| t.get()) == Some(4))
            .times(1)
            .returning(|_| Ok((0, vec![])));

        let params = WorkOrdersQuery {
            technician_id: Some(99),
            ..WorkOrdersQuery::default()
        };
        list_work_orders(&repo, &technician_user(), params).expect("listed");
    }

    #[test]
    fn schedule_groups_by_day() {
        let mut repo = MockRepository::new();
        repo.expect_list_work_orders()
            .withf(|query| {
                query.exclude_cancelled
                    && query.pagination.is_none()
                    && query.scheduled_from == NaiveDate::from_ymd_opt(2026, 5, 1)
                    && query.scheduled_to == NaiveDate::from_ymd_opt(2026, 5, 31)
            })
            .returning(|_| {
                Ok((
                    3,
                    vec![
                        work_order(1, Some(4), 4),
                        work_order(2, None, 4),
                        work_order(3, Some(4), 11),
                    ],
                ))
            });

        let params = ScheduleQuery {
            from: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
            technician_id: None,
        };
        let days = schedule(&repo, &office(), params).expect("schedule");

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].work_orders.len(), 2);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2026, 5, 11).unwrap());
    }

    #[test]
    fn schedule_range_is_bounded() {
        let mut repo = MockRepository::new();
        repo.expect_list_work_orders().times(0);

        let params = ScheduleQuery {
            from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            technician_id: None,
        };

        assert!(matches!(
            schedule(&repo, &office(), params),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn technicians_do_not_see_other_work() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|_, _| Ok(Some(work_order(1, Some(5), 4))));
        repo.expect_get_technician_by_user()
            .returning(|_| Ok(Some(linked_technician(4))));

        assert!(matches!(
            get_work_order(&repo, &technician_user(), 1),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn technician_completes_own_recurring_visit() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id()
            .returning(|_, _| Ok(Some(work_order(1, Some(4), 4))));
        repo.expect_get_technician_by_user()
            .returning(|_| Ok(Some(linked_technician(4))));
        repo.expect_transition_work_order()
            .withf(|id, _, transition| {
                id.get() == 1
                    && transition.status == WorkOrderStatus::Completed
                    && transition.next_occurrence.as_ref().map(|n| n.scheduled_on)
                        == NaiveDate::from_ymd_opt(2026, 5, 11)
            })
            .times(1)
            .returning(|_, _, _| {
                let mut done = work_order(1, Some(4), 4);
                done.status = WorkOrderStatus::Completed;
                Ok((done, Some(work_order(2, Some(4), 11))))
            });

        let form = TransitionForm {
            status: WorkOrderStatus::Completed,
        };
        let result = transition_work_order(&repo, &technician_user(), 1, form).expect("moved");

        assert_eq!(result.work_order.status, WorkOrderStatus::Completed);
        assert_eq!(result.next_occurrence.map(|n| n.id.get()), Some(2));
    }

    #[test]
    fn invalid_transition_is_reported() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id().returning(|_, _| {
            let mut done = work_order(1, None, 4);
            done.status = WorkOrderStatus::Cancelled;
            Ok(Some(done))
        });
        repo.expect_transition_work_order().times(0);

        let form = TransitionForm {
            status: WorkOrderStatus::InProgress,
        };

        assert!(matches!(
            transition_work_order(&repo, &office(), 1, form),
            Err(ServiceError::InvalidTransition(_))
        ));
    }

    #[test]
    fn invoiced_work_orders_are_frozen() {
        let mut repo = MockRepository::new();
        repo.expect_get_work_order_by_id().returning(|_, _| {
            let mut billed = work_order(1, None, 4);
            billed.status = WorkOrderStatus::Completed;
            billed.invoice_id = Some(InvoiceId::new(3).unwrap());
            Ok(Some(billed))
        });
        repo.expect_update_work_order().times(0);
        repo.expect_delete_work_order().times(0);

        assert!(matches!(
            update_work_order(&repo, &office(), 1, form()),
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            delete_work_order(&repo, &office(), 1),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn create_checks_the_technician() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|_, _| Ok(Some(client())));
        repo.expect_get_technician_by_id().returning(|_, _| {
            let mut technician = linked_technician(4);
            technician.is_active = false;
            Ok(Some(technician))
        });
        repo.expect_create_work_order().times(0);

        let form = CreateWorkOrderForm {
            client_id: 1,
            work_order: form(),
        };

        assert!(matches!(
            create_work_order(&repo, &office(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn technicians_cannot_create_work_orders() {
        let repo = MockRepository::new();
        let form = CreateWorkOrderForm {
            client_id: 1,
            work_order: form(),
        };

        assert!(matches!(
            create_work_order(&repo, &technician_user(), form),
            Err(ServiceError::Unauthorized)
        ));
    }
}
