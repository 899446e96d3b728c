//! Invoices and their line items.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Cents, ClientId, Description, InvoiceId, InvoiceItemId, InvoiceNumber, InvoiceStatus,
    OrganizationId, Quantity, TaxRate, TypeConstraintError, WorkOrderId,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub invoice_id: InvoiceId,
    pub work_order_id: Option<WorkOrderId>,
    pub description: Description,
    pub quantity: Quantity,
    pub unit_price: Cents,
}

impl InvoiceItem {
    pub fn amount(&self) -> Cents {
        self.unit_price.saturating_mul(self.quantity)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub organization_id: OrganizationId,
    pub client_id: ClientId,
    pub number: InvoiceNumber,
    pub status: InvoiceStatus,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub tax_rate: TaxRate,
    pub notes: Option<Description>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub items: Vec<InvoiceItem>,
}

/// Computed amounts of an invoice.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Cents,
    pub tax: Cents,
    pub total: Cents,
}

impl Invoice {
    pub fn totals(&self) -> InvoiceTotals {
        let subtotal = self
            .items
            .iter()
            .fold(Cents::ZERO, |acc, item| acc.saturating_add(item.amount()));
        let tax = self.tax_rate.apply(subtotal);
        InvoiceTotals {
            subtotal,
            tax,
            total: subtotal.saturating_add(tax),
        }
    }

    /// Sent but not paid and past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && self.due_on < today
    }
}

impl InvoiceStatus {
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Draft, Void) | (Sent, Paid) | (Sent, Void)
        )
    }
}

/// Formats the sequential invoice number of an organization.
pub fn format_invoice_number(sequence: i64) -> String {
    format!("INV-{sequence:05}")
}

/// Sequence part of a number produced by [`format_invoice_number`].
pub fn parse_invoice_number(number: &str) -> Option<i64> {
    number.strip_prefix("INV-")?.parse().ok()
}

/// Issue and due dates, due never before issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvoiceDates {
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
}

impl InvoiceDates {
    pub fn new(issued_on: NaiveDate, due_on: NaiveDate) -> Result<Self, TypeConstraintError> {
        if due_on < issued_on {
            return Err(TypeConstraintError::InvalidValue(
                "invoice cannot be due before it is issued".to_string(),
            ));
        }
        Ok(Self { issued_on, due_on })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewInvoiceItem {
    pub work_order_id: Option<WorkOrderId>,
    pub description: Description,
    pub quantity: Quantity,
    pub unit_price: Cents,
}

/// Invoice to be created; the number is assigned by the repository.
#[derive(Clone, Debug)]
pub struct NewInvoice {
    pub organization_id: OrganizationId,
    pub client_id: ClientId,
    pub dates: InvoiceDates,
    pub tax_rate: TaxRate,
    pub notes: Option<Description>,
    pub items: Vec<NewInvoiceItem>,
}
