use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::invoice::{
    Invoice, NewInvoice, NewInvoiceItem, format_invoice_number, parse_invoice_number,
};
use crate::domain::types::{
    InvoiceId, InvoiceStatus, OrganizationId, WorkOrderId, WorkOrderStatus,
};
use crate::models::invoice::{
    Invoice as DbInvoice, InvoiceItem as DbInvoiceItem, NewInvoice as DbNewInvoice,
    NewInvoiceItem as DbNewInvoiceItem, UpdateInvoiceStatus as DbUpdateInvoiceStatus, into_domain,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, InvoiceListQuery, InvoiceReader, InvoiceWriter};
use crate::schema::{invoice_items, invoices, work_orders};

fn filtered_invoices(query: &InvoiceListQuery) -> invoices::BoxedQuery<'static, Sqlite> {
    let mut items = invoices::table
        .filter(invoices::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(status) = query.status {
        items = items.filter(invoices::status.eq(status.as_str()));
    }
    if let Some(client_id) = query.client_id {
        items = items.filter(invoices::client_id.eq(client_id.get()));
    }
    if let Some(today) = query.overdue_on {
        items = items
            .filter(invoices::status.eq(InvoiceStatus::Sent.as_str()))
            .filter(invoices::due_on.lt(today));
    }

    items
}

/// Loads the items of `rows` and assembles domain invoices.
fn with_items(conn: &mut SqliteConnection, rows: Vec<DbInvoice>) -> RepositoryResult<Vec<Invoice>> {
    let items = DbInvoiceItem::belonging_to(&rows)
        .order(invoice_items::id.asc())
        .load::<DbInvoiceItem>(conn)?
        .grouped_by(&rows);

    rows.into_iter()
        .zip(items)
        .map(|(invoice, items)| into_domain(invoice, items).map_err(RepositoryError::from))
        .collect()
}

fn load_invoice(
    conn: &mut SqliteConnection,
    id: InvoiceId,
    organization_id: OrganizationId,
) -> RepositoryResult<Invoice> {
    let row = invoices::table
        .filter(invoices::id.eq(id.get()))
        .filter(invoices::organization_id.eq(organization_id.get()))
        .first::<DbInvoice>(conn)?;

    with_items(conn, vec![row])?
        .pop()
        .ok_or(RepositoryError::NotFound)
}

fn next_invoice_number(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
) -> RepositoryResult<String> {
    let numbers = invoices::table
        .filter(invoices::organization_id.eq(organization_id.get()))
        .select(invoices::number)
        .load::<String>(conn)?;

    let last = numbers
        .iter()
        .filter_map(|number| parse_invoice_number(number))
        .max()
        .unwrap_or(0);

    Ok(format_invoice_number(last + 1))
}

/// Zero rows matched a conditional write: the invoice is gone or no longer
/// in a state that allows it.
fn missing_or_conflict(
    conn: &mut SqliteConnection,
    id: InvoiceId,
    organization_id: OrganizationId,
    conflict: impl FnOnce(InvoiceStatus) -> String,
) -> RepositoryError {
    let current = invoices::table
        .filter(invoices::id.eq(id.get()))
        .filter(invoices::organization_id.eq(organization_id.get()))
        .select(invoices::status)
        .first::<String>(conn)
        .optional();

    match current {
        Ok(Some(status)) => match status.parse::<InvoiceStatus>() {
            Ok(status) => RepositoryError::ConstraintViolation(conflict(status)),
            Err(e) => e.into(),
        },
        Ok(None) => RepositoryError::NotFound,
        Err(e) => e.into(),
    }
}

/// Inserts `items` for `invoice_id` and links the work orders they bill.
/// Every billed work order must be completed and not on another invoice.
fn insert_items(
    conn: &mut SqliteConnection,
    invoice_id: i32,
    organization_id: OrganizationId,
    items: &[NewInvoiceItem],
) -> RepositoryResult<()> {
    let rows: Vec<DbNewInvoiceItem> = items
        .iter()
        .map(|item| DbNewInvoiceItem::from_domain(invoice_id, item))
        .collect();
    diesel::insert_into(invoice_items::table)
        .values(&rows)
        .execute(conn)?;

    let billed: Vec<i32> = items
        .iter()
        .filter_map(|item| item.work_order_id.map(WorkOrderId::get))
        .collect();
    if !billed.is_empty() {
        let expected = billed.len();
        let linked = diesel::update(
            work_orders::table
                .filter(work_orders::organization_id.eq(organization_id.get()))
                .filter(work_orders::id.eq_any(billed))
                .filter(work_orders::status.eq(WorkOrderStatus::Completed.as_str()))
                .filter(work_orders::invoice_id.is_null()),
        )
        .set(work_orders::invoice_id.eq(Some(invoice_id)))
        .execute(conn)?;
        if linked < expected {
            return Err(RepositoryError::ConstraintViolation(
                "work order is not billable or already billed".to_string(),
            ));
        }
    }
    Ok(())
}

fn release_work_orders(conn: &mut SqliteConnection, invoice_id: i32) -> RepositoryResult<usize> {
    Ok(
        diesel::update(work_orders::table.filter(work_orders::invoice_id.eq(invoice_id)))
            .set(work_orders::invoice_id.eq(None::<i32>))
            .execute(conn)?,
    )
}

impl InvoiceReader for DieselRepository {
    fn get_invoice_by_id(
        &self,
        id: InvoiceId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Invoice>> {
        let mut conn = self.conn()?;
        match load_invoice(&mut conn, id, organization_id) {
            Ok(invoice) => Ok(Some(invoice)),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_invoices(&query).count().get_result(&mut conn)?;

        let mut items = filtered_invoices(&query)
            .order((invoices::issued_on.desc(), invoices::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let rows = items.load::<DbInvoice>(&mut conn)?;

        Ok((total as usize, with_items(&mut conn, rows)?))
    }
}

impl InvoiceWriter for DieselRepository {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let number = next_invoice_number(conn, new_invoice.organization_id)?;
            let row = DbNewInvoice {
                organization_id: new_invoice.organization_id.get(),
                client_id: new_invoice.client_id.get(),
                number: &number,
                status: InvoiceStatus::Draft.as_str(),
                issued_on: new_invoice.dates.issued_on,
                due_on: new_invoice.dates.due_on,
                tax_rate_bp: new_invoice.tax_rate.basis_points(),
                notes: new_invoice.notes.as_ref().map(|n| n.as_str()),
            };
            let invoice_id = diesel::insert_into(invoices::table)
                .values(&row)
                .returning(invoices::id)
                .get_result::<i32>(conn)?;

            insert_items(conn, invoice_id, new_invoice.organization_id, &new_invoice.items)?;

            load_invoice(conn, InvoiceId::new(invoice_id)?, new_invoice.organization_id)
        })
    }

    fn replace_invoice_items(
        &self,
        id: InvoiceId,
        organization_id: OrganizationId,
        items: &[NewInvoiceItem],
    ) -> RepositoryResult<Invoice> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let touched = diesel::update(
                invoices::table
                    .filter(invoices::id.eq(id.get()))
                    .filter(invoices::organization_id.eq(organization_id.get()))
                    .filter(invoices::status.eq(InvoiceStatus::Draft.as_str())),
            )
            .set(invoices::updated_at.eq(Utc::now().naive_utc()))
            .execute(conn)?;
            if touched == 0 {
                return Err(missing_or_conflict(conn, id, organization_id, |current| {
                    format!("invoice is {current}, only drafts can be edited")
                }));
            }

            release_work_orders(conn, id.get())?;
            diesel::delete(invoice_items::table.filter(invoice_items::invoice_id.eq(id.get())))
                .execute(conn)?;
            insert_items(conn, id.get(), organization_id, items)?;

            load_invoice(conn, id, organization_id)
        })
    }

    fn update_invoice_status(
        &self,
        id: InvoiceId,
        organization_id: OrganizationId,
        status: InvoiceStatus,
        paid_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<Invoice> {
        let mut conn = self.conn()?;
        let changes = DbUpdateInvoiceStatus {
            status: status.as_str(),
            paid_at,
            updated_at: Utc::now().naive_utc(),
        };

        let allowed_from: Vec<&str> = InvoiceStatus::ALL
            .iter()
            .filter(|from| from.can_transition_to(status))
            .map(|from| from.as_str())
            .collect();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let updated = diesel::update(
                invoices::table
                    .filter(invoices::id.eq(id.get()))
                    .filter(invoices::organization_id.eq(organization_id.get()))
                    .filter(invoices::status.eq_any(allowed_from)),
            )
            .set(&changes)
            .execute(conn)?;
            if updated == 0 {
                return Err(missing_or_conflict(conn, id, organization_id, |current| {
                    format!("invoice cannot move from {current} to {status}")
                }));
            }

            if status == InvoiceStatus::Void {
                release_work_orders(conn, id.get())?;
            }

            load_invoice(conn, id, organization_id)
        })
    }

    fn delete_invoice(&self, id: InvoiceId, organization_id: OrganizationId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let draft = invoices::table
                .filter(invoices::id.eq(id.get()))
                .filter(invoices::organization_id.eq(organization_id.get()))
                .filter(invoices::status.eq(InvoiceStatus::Draft.as_str()))
                .select(invoices::id)
                .first::<i32>(conn)
                .optional()?;
            if draft.is_none() {
                return Err(missing_or_conflict(conn, id, organization_id, |current| {
                    format!("invoice is {current}, only drafts can be deleted")
                }));
            }

            release_work_orders(conn, id.get())?;
            diesel::delete(invoice_items::table.filter(invoice_items::invoice_id.eq(id.get())))
                .execute(conn)?;
            diesel::delete(invoices::table.find(id.get())).execute(conn)?;
            Ok(())
        })
    }
}
