//! Invoicing: manual invoices, billing completed work orders and the
//! draft, sent, paid lifecycle.

use std::collections::HashSet;

use chrono::Utc;

use crate::domain::auth::{AuthenticatedUser, SERVICE_OFFICE_ROLE};
use crate::domain::invoice::{NewInvoice, NewInvoiceItem};
use crate::domain::types::{
    ClientId, Description, InvoiceId, InvoiceStatus, OrganizationId, Quantity, WorkOrderId,
    WorkOrderStatus,
};
use crate::dto::invoices::{InvoiceDto, InvoicesQuery};
use crate::forms::invoices::{
    CreateInvoiceForm, CreateInvoicePayload, InvoiceFromWorkOrdersForm,
    InvoiceFromWorkOrdersPayload, InvoiceHeader, InvoiceItemsForm, InvoiceStatusForm,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ClientReader, InvoiceListQuery, InvoiceReader, InvoiceWriter, WorkOrderReader,
};
use crate::services::{ServiceError, ServiceResult, ensure_role, organization_of, today};

pub fn list_invoices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: InvoicesQuery,
) -> ServiceResult<Paginated<InvoiceDto>>
where
    R: InvoiceReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let today = today();
    let page = params.page.unwrap_or(1).max(1);
    let mut query =
        InvoiceListQuery::new(organization_of(user)?).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(status) = params.status {
        query = query.status(status);
    }
    if let Some(client_id) = params.client_id {
        query = query.client(ClientId::new(client_id)?);
    }
    if params.overdue {
        query = query.overdue_on(today);
    }

    let (total, invoices) = repo.list_invoices(query).map_err(|err| {
        log::error!("Failed to list invoices: {err}");
        err
    })?;

    let items = invoices
        .into_iter()
        .map(|invoice| InvoiceDto::new(invoice, today))
        .collect();
    Ok(Paginated::new(items, page, total, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_invoice<R>(repo: &R, user: &AuthenticatedUser, invoice_id: i32) -> ServiceResult<InvoiceDto>
where
    R: InvoiceReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let invoice = repo
        .get_invoice_by_id(InvoiceId::new(invoice_id)?, organization_of(user)?)?
        .ok_or(ServiceError::NotFound)?;
    Ok(InvoiceDto::new(invoice, today()))
}

fn ensure_client<R>(repo: &R, client_id: ClientId, organization_id: OrganizationId) -> ServiceResult<()>
where
    R: ClientReader + ?Sized,
{
    match repo.get_client_by_id(client_id, organization_id)? {
        Some(_) => Ok(()),
        None => Err(ServiceError::Form(format!("unknown client {client_id}"))),
    }
}

/// Work orders referenced by `items` must exist, belong to `client_id`, be
/// completed and not be billed on an invoice other than `invoice_id`.
fn check_billable_items<R>(
    repo: &R,
    organization_id: OrganizationId,
    client_id: ClientId,
    items: &[NewInvoiceItem],
    invoice_id: Option<InvoiceId>,
) -> ServiceResult<()>
where
    R: WorkOrderReader + ?Sized,
{
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for id in items.iter().filter_map(|item| item.work_order_id) {
        if !seen.insert(id) {
            return Err(ServiceError::Form(format!(
                "work order {id} is billed twice on the invoice"
            )));
        }
        ids.push(id);
    }
    if ids.is_empty() {
        return Ok(());
    }

    let work_orders = repo.get_work_orders_by_ids(&ids, organization_id)?;
    if work_orders.len() != ids.len() {
        let found: HashSet<WorkOrderId> = work_orders.iter().map(|wo| wo.id).collect();
        let missing = ids.iter().find(|id| !found.contains(id));
        return Err(ServiceError::Form(match missing {
            Some(id) => format!("unknown work order {id}"),
            None => "unknown work order".to_string(),
        }));
    }

    for work_order in &work_orders {
        if work_order.client_id != client_id {
            return Err(ServiceError::Form(format!(
                "work order {} belongs to another client",
                work_order.id
            )));
        }
        let billed_elsewhere = work_order.invoice_id.is_some() && work_order.invoice_id != invoice_id;
        if billed_elsewhere {
            return Err(ServiceError::Conflict(format!(
                "work order {} is already billed",
                work_order.id
            )));
        }
        if work_order.status != WorkOrderStatus::Completed {
            return Err(ServiceError::Conflict(format!(
                "work order {} is not completed",
                work_order.id
            )));
        }
    }

    Ok(())
}

fn new_invoice(
    organization_id: OrganizationId,
    header: InvoiceHeader,
    items: Vec<NewInvoiceItem>,
) -> NewInvoice {
    NewInvoice {
        organization_id,
        client_id: header.client_id,
        dates: header.dates,
        tax_rate: header.tax_rate,
        notes: header.notes,
        items,
    }
}

/// Creates a draft invoice from free-form line items.
pub fn create_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateInvoiceForm,
) -> ServiceResult<InvoiceDto>
where
    R: ClientReader + WorkOrderReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let payload = CreateInvoicePayload::try_from(form)?;
    ensure_client(repo, payload.header.client_id, organization_id)?;
    check_billable_items(
        repo,
        organization_id,
        payload.header.client_id,
        &payload.items,
        None,
    )?;

    let invoice = repo
        .create_invoice(&new_invoice(organization_id, payload.header, payload.items))
        .map_err(|err| {
            log::error!("Failed to create invoice: {err}");
            err
        })?;

    log::info!("Created invoice {} for client {}", invoice.number, invoice.client_id);
    Ok(InvoiceDto::new(invoice, today()))
}

/// Bills completed work orders of one client, one line per work order.
pub fn create_invoice_from_work_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: InvoiceFromWorkOrdersForm,
) -> ServiceResult<InvoiceDto>
where
    R: ClientReader + WorkOrderReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let payload = InvoiceFromWorkOrdersPayload::try_from(form)?;
    if payload.work_order_ids.is_empty() {
        return Err(ServiceError::Form(
            "select at least one work order".to_string(),
        ));
    }
    ensure_client(repo, payload.header.client_id, organization_id)?;

    let work_orders = repo.get_work_orders_by_ids(&payload.work_order_ids, organization_id)?;
    let mut items = Vec::with_capacity(work_orders.len());
    for work_order in &work_orders {
        items.push(NewInvoiceItem {
            work_order_id: Some(work_order.id),
            description: Description::new(work_order.title.as_str())?,
            quantity: Quantity::new(1)?,
            unit_price: work_order.price,
        });
    }
    if items.len() != payload.work_order_ids.len() {
        return Err(ServiceError::Form("unknown work order".to_string()));
    }
    check_billable_items(
        repo,
        organization_id,
        payload.header.client_id,
        &items,
        None,
    )?;

    let invoice = repo
        .create_invoice(&new_invoice(organization_id, payload.header, items))
        .map_err(|err| {
            log::error!("Failed to bill work orders: {err}");
            err
        })?;

    log::info!(
        "Billed {} work orders on invoice {}",
        payload.work_order_ids.len(),
        invoice.number
    );
    Ok(InvoiceDto::new(invoice, today()))
}

/// Replaces all line items of a draft invoice.
pub fn replace_invoice_items<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: InvoiceItemsForm,
) -> ServiceResult<InvoiceDto>
where
    R: InvoiceReader + InvoiceWriter + WorkOrderReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let invoice_id = InvoiceId::new(invoice_id)?;
    let items = form.into_items()?;

    let invoice = repo
        .get_invoice_by_id(invoice_id, organization_id)?
        .ok_or(ServiceError::NotFound)?;
    if invoice.status != InvoiceStatus::Draft {
        return Err(ServiceError::Conflict(format!(
            "invoice {} is {} and cannot be edited",
            invoice.number, invoice.status
        )));
    }
    check_billable_items(
        repo,
        organization_id,
        invoice.client_id,
        &items,
        Some(invoice_id),
    )?;

    let invoice = repo
        .replace_invoice_items(invoice_id, organization_id, &items)
        .map_err(|err| {
            log::error!("Failed to replace items of invoice {invoice_id}: {err}");
            err
        })?;
    Ok(InvoiceDto::new(invoice, today()))
}

/// Moves an invoice along draft, sent, paid; void from draft or sent. Voiding
/// makes its work orders billable again.
pub fn update_invoice_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: InvoiceStatusForm,
) -> ServiceResult<InvoiceDto>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let invoice_id = InvoiceId::new(invoice_id)?;
    let invoice = repo
        .get_invoice_by_id(invoice_id, organization_id)?
        .ok_or(ServiceError::NotFound)?;

    if !invoice.status.can_transition_to(form.status) {
        return Err(ServiceError::InvalidTransition(format!(
            "cannot move invoice from {} to {}",
            invoice.status, form.status
        )));
    }
    if form.status == InvoiceStatus::Sent && invoice.items.is_empty() {
        return Err(ServiceError::Form(
            "an invoice needs at least one item before it is sent".to_string(),
        ));
    }

    let paid_at = (form.status == InvoiceStatus::Paid).then(|| Utc::now().naive_utc());
    let invoice = repo
        .update_invoice_status(invoice_id, organization_id, form.status, paid_at)
        .map_err(|err| {
            log::error!("Failed to update status of invoice {invoice_id}: {err}");
            err
        })?;
    Ok(InvoiceDto::new(invoice, today()))
}

/// Only drafts can be deleted; their work orders become billable again.
pub fn delete_invoice<R>(repo: &R, user: &AuthenticatedUser, invoice_id: i32) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let invoice_id = InvoiceId::new(invoice_id)?;
    let invoice = repo
        .get_invoice_by_id(invoice_id, organization_id)?
        .ok_or(ServiceError::NotFound)?;
    if invoice.status != InvoiceStatus::Draft {
        return Err(ServiceError::Conflict(format!(
            "invoice {} is {}; void it instead",
            invoice.number, invoice.status
        )));
    }

    repo.delete_invoice(invoice_id, organization_id)
        .map_err(|err| {
            log::error!("Failed to delete invoice {invoice_id}: {err}");
            err.into()
        })
}
