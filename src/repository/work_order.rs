use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::types::{OrganizationId, WorkOrderId, WorkOrderStatus};
use crate::domain::work_order::{NewWorkOrder, UpdateWorkOrder, WorkOrder, WorkOrderTransition};
use crate::models::work_order::{
    NewWorkOrder as DbNewWorkOrder, UpdateWorkOrder as DbUpdateWorkOrder,
    UpdateWorkOrderStatus as DbUpdateWorkOrderStatus, WorkOrder as DbWorkOrder,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, WorkOrderListQuery, WorkOrderReader, WorkOrderWriter};
use crate::schema::work_orders;

fn filtered_work_orders(query: &WorkOrderListQuery) -> work_orders::BoxedQuery<'static, Sqlite> {
    let mut items = work_orders::table
        .filter(work_orders::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(status) = query.status {
        items = items.filter(work_orders::status.eq(status.as_str()));
    }
    if query.exclude_cancelled {
        items = items.filter(work_orders::status.ne(WorkOrderStatus::Cancelled.as_str()));
    }
    if let Some(kind) = query.kind {
        items = items.filter(work_orders::kind.eq(kind.as_str()));
    }
    if let Some(technician_id) = query.technician_id {
        items = items.filter(work_orders::technician_id.eq(technician_id.get()));
    }
    if let Some(client_id) = query.client_id {
        items = items.filter(work_orders::client_id.eq(client_id.get()));
    }
    if let Some(project_id) = query.project_id {
        items = items.filter(work_orders::project_id.eq(project_id.get()));
    }
    if let Some(from) = query.scheduled_from {
        items = items.filter(work_orders::scheduled_on.ge(from));
    }
    if let Some(to) = query.scheduled_to {
        items = items.filter(work_orders::scheduled_on.le(to));
    }

    items
}

fn into_domain(rows: Vec<DbWorkOrder>) -> RepositoryResult<Vec<WorkOrder>> {
    Ok(rows
        .into_iter()
        .map(WorkOrder::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

impl WorkOrderReader for DieselRepository {
    fn get_work_order_by_id(
        &self,
        id: WorkOrderId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<WorkOrder>> {
        let mut conn = self.conn()?;
        let work_order = work_orders::table
            .filter(work_orders::id.eq(id.get()))
            .filter(work_orders::organization_id.eq(organization_id.get()))
            .first::<DbWorkOrder>(&mut conn)
            .optional()?;

        Ok(work_order.map(WorkOrder::try_from).transpose()?)
    }

    fn get_work_orders_by_ids(
        &self,
        ids: &[WorkOrderId],
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<WorkOrder>> {
        let mut conn = self.conn()?;
        let ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();
        let rows = work_orders::table
            .filter(work_orders::organization_id.eq(organization_id.get()))
            .filter(work_orders::id.eq_any(ids))
            .order(work_orders::id.asc())
            .load::<DbWorkOrder>(&mut conn)?;

        into_domain(rows)
    }

    fn list_work_orders(
        &self,
        query: WorkOrderListQuery,
    ) -> RepositoryResult<(usize, Vec<WorkOrder>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_work_orders(&query).count().get_result(&mut conn)?;

        let mut items = filtered_work_orders(&query)
            .order((work_orders::scheduled_on.asc(), work_orders::id.asc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let rows = items.load::<DbWorkOrder>(&mut conn)?;
        Ok((total as usize, into_domain(rows)?))
    }
}

impl WorkOrderWriter for DieselRepository {
    fn create_work_order(&self, new_work_order: &NewWorkOrder) -> RepositoryResult<WorkOrder> {
        let mut conn = self.conn()?;
        let work_order = diesel::insert_into(work_orders::table)
            .values(DbNewWorkOrder::from(new_work_order))
            .get_result::<DbWorkOrder>(&mut conn)?;

        Ok(work_order.try_into()?)
    }

    fn update_work_order(
        &self,
        id: WorkOrderId,
        organization_id: OrganizationId,
        updates: &UpdateWorkOrder,
    ) -> RepositoryResult<WorkOrder> {
        let mut conn = self.conn()?;
        let changes = DbUpdateWorkOrder::from_domain(updates, Utc::now().naive_utc());
        let work_order = diesel::update(
            work_orders::table
                .filter(work_orders::id.eq(id.get()))
                .filter(work_orders::organization_id.eq(organization_id.get())),
        )
        .set(&changes)
        .get_result::<DbWorkOrder>(&mut conn)?;

        Ok(work_order.try_into()?)
    }

    fn transition_work_order(
        &self,
        id: WorkOrderId,
        organization_id: OrganizationId,
        transition: &WorkOrderTransition,
    ) -> RepositoryResult<(WorkOrder, Option<WorkOrder>)> {
        let mut conn = self.conn()?;
        let changes = DbUpdateWorkOrderStatus {
            status: transition.status.as_str(),
            completed_at: transition.completed_at,
            updated_at: Utc::now().naive_utc(),
        };

        conn.transaction::<_, RepositoryError, _>(|conn| {
            // Only applies while the row still has the status the plan was made from.
            let updated = diesel::update(
                work_orders::table
                    .filter(work_orders::id.eq(id.get()))
                    .filter(work_orders::organization_id.eq(organization_id.get()))
                    .filter(work_orders::status.eq(transition.from.as_str())),
            )
            .set(&changes)
            .get_result::<DbWorkOrder>(conn)
            .optional()?;

            let updated: WorkOrder = match updated {
                Some(row) => row.try_into()?,
                None => {
                    let exists = work_orders::table
                        .filter(work_orders::id.eq(id.get()))
                        .filter(work_orders::organization_id.eq(organization_id.get()))
                        .select(work_orders::id)
                        .first::<i32>(conn)
                        .optional()?;
                    return Err(match exists {
                        Some(_) => RepositoryError::ConstraintViolation(format!(
                            "work order {id} is no longer {}",
                            transition.from
                        )),
                        None => RepositoryError::NotFound,
                    });
                }
            };

            let next: Option<WorkOrder> = match &transition.next_occurrence {
                Some(next) => Some(
                    diesel::insert_into(work_orders::table)
                        .values(DbNewWorkOrder::from(next))
                        .get_result::<DbWorkOrder>(conn)?
                        .try_into()?,
                ),
                None => None,
            };

            Ok((updated, next))
        })
    }

    fn delete_work_order(
        &self,
        id: WorkOrderId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            work_orders::table
                .filter(work_orders::id.eq(id.get()))
                .filter(work_orders::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
