//! Diesel models for invoices and invoice lines.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::invoice::{
    Invoice as DomainInvoice, InvoiceItem as DomainInvoiceItem,
    NewInvoiceItem as DomainNewInvoiceItem,
};
use crate::domain::types::{
    Cents, ClientId, Description, InvoiceId, InvoiceItemId, InvoiceNumber, InvoiceStatus,
    OrganizationId, Quantity, TaxRate, TypeConstraintError, WorkOrderId,
};
use crate::models::optional_description;

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct Invoice {
    pub id: i32,
    pub organization_id: i32,
    pub client_id: i32,
    pub number: String,
    pub status: String,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub tax_rate_bp: i32,
    pub notes: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct NewInvoice<'a> {
    pub organization_id: i32,
    pub client_id: i32,
    pub number: &'a str,
    pub status: &'a str,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub tax_rate_bp: i32,
    pub notes: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::invoices)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateInvoiceStatus<'a> {
    pub status: &'a str,
    pub paid_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(belongs_to(Invoice, foreign_key = invoice_id))]
#[diesel(table_name = crate::schema::invoice_items)]
pub struct InvoiceItem {
    pub id: i32,
    pub invoice_id: i32,
    pub work_order_id: Option<i32>,
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoice_items)]
pub struct NewInvoiceItem<'a> {
    pub invoice_id: i32,
    pub work_order_id: Option<i32>,
    pub description: &'a str,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl TryFrom<InvoiceItem> for DomainInvoiceItem {
    type Error = TypeConstraintError;

    fn try_from(value: InvoiceItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InvoiceItemId::new(value.id)?,
            invoice_id: InvoiceId::new(value.invoice_id)?,
            work_order_id: value.work_order_id.map(WorkOrderId::new).transpose()?,
            description: Description::new(value.description)?,
            quantity: Quantity::new(value.quantity)?,
            unit_price: Cents::new(value.unit_price_cents)?,
        })
    }
}

impl<'a> NewInvoiceItem<'a> {
    pub fn from_domain(invoice_id: i32, item: &'a DomainNewInvoiceItem) -> Self {
        Self {
            invoice_id,
            work_order_id: item.work_order_id.map(WorkOrderId::get),
            description: item.description.as_str(),
            quantity: item.quantity.get(),
            unit_price_cents: item.unit_price.get(),
        }
    }
}

/// Assembles a domain invoice from its row and line rows.
pub fn into_domain(
    invoice: Invoice,
    items: Vec<InvoiceItem>,
) -> Result<DomainInvoice, TypeConstraintError> {
    Ok(DomainInvoice {
        id: InvoiceId::new(invoice.id)?,
        organization_id: OrganizationId::new(invoice.organization_id)?,
        client_id: ClientId::new(invoice.client_id)?,
        number: InvoiceNumber::new(invoice.number)?,
        status: invoice.status.parse::<InvoiceStatus>()?,
        issued_on: invoice.issued_on,
        due_on: invoice.due_on,
        tax_rate: TaxRate::new(invoice.tax_rate_bp)?,
        notes: optional_description(invoice.notes),
        paid_at: invoice.paid_at,
        created_at: invoice.created_at,
        updated_at: invoice.updated_at,
        items: items
            .into_iter()
            .map(DomainInvoiceItem::try_from)
            .collect::<Result<Vec<_>, _>>()?,
    })
}
