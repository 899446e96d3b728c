use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::dashboard::DashboardStats;
use crate::domain::types::{Cents, OrganizationId, WorkOrderStatus};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DashboardReader, DieselRepository, InvoiceListQuery, InvoiceReader};
use crate::schema::{clients, work_orders};

impl DashboardReader for DieselRepository {
    fn dashboard_stats(
        &self,
        organization_id: OrganizationId,
        today: NaiveDate,
    ) -> RepositoryResult<DashboardStats> {
        let (clients, open_work_orders, work_orders_today) = {
            let mut conn = self.conn()?;

            let clients: i64 = clients::table
                .filter(clients::organization_id.eq(organization_id.get()))
                .count()
                .get_result(&mut conn)?;

            let open: i64 = work_orders::table
                .filter(work_orders::organization_id.eq(organization_id.get()))
                .filter(work_orders::status.eq_any([
                    WorkOrderStatus::Scheduled.as_str(),
                    WorkOrderStatus::InProgress.as_str(),
                ]))
                .count()
                .get_result(&mut conn)?;

            let today_count: i64 = work_orders::table
                .filter(work_orders::organization_id.eq(organization_id.get()))
                .filter(work_orders::scheduled_on.eq(today))
                .filter(work_orders::status.ne(WorkOrderStatus::Cancelled.as_str()))
                .count()
                .get_result(&mut conn)?;

            (clients, open, today_count)
        };

        let (overdue_invoices, overdue) =
            self.list_invoices(InvoiceListQuery::new(organization_id).overdue_on(today))?;
        let outstanding = overdue
            .iter()
            .fold(Cents::ZERO, |acc, invoice| acc.saturating_add(invoice.totals().total));

        Ok(DashboardStats {
            clients: clients as usize,
            open_work_orders: open_work_orders as usize,
            work_orders_today: work_orders_today as usize,
            overdue_invoices,
            outstanding,
        })
    }
}
