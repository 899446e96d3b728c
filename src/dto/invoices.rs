use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::invoice::{Invoice, InvoiceTotals};
use crate::domain::types::InvoiceStatus;

#[derive(Debug, Default, Deserialize)]
pub struct InvoicesQuery {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<i32>,
    /// Only sent invoices past their due date.
    #[serde(default)]
    pub overdue: bool,
    pub page: Option<usize>,
}

/// Invoice with computed totals.
#[derive(Debug, Serialize, PartialEq)]
pub struct InvoiceDto {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub totals: InvoiceTotals,
    pub overdue: bool,
}

impl InvoiceDto {
    pub fn new(invoice: Invoice, today: NaiveDate) -> Self {
        Self {
            totals: invoice.totals(),
            overdue: invoice.is_overdue(today),
            invoice,
        }
    }
}
