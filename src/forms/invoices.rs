use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::invoice::{InvoiceDates, NewInvoiceItem};
use crate::domain::types::{
    Cents, ClientId, Description, InvoiceStatus, Quantity, TaxRate, WorkOrderId,
};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct InvoiceItemForm {
    #[serde(default)]
    pub work_order_id: Option<i32>,
    #[validate(length(min = 1, max = 512))]
    pub description: String,
    pub quantity: i32,
    /// Cents.
    pub unit_price: i64,
}

impl TryFrom<InvoiceItemForm> for NewInvoiceItem {
    type Error = FormError;

    fn try_from(form: InvoiceItemForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(NewInvoiceItem {
            work_order_id: form.work_order_id.map(WorkOrderId::new).transpose()?,
            description: Description::new(form.description)?,
            quantity: Quantity::new(form.quantity)?,
            unit_price: Cents::new(form.unit_price)?,
        })
    }
}

fn items_into_domain(items: Vec<InvoiceItemForm>) -> Result<Vec<NewInvoiceItem>, FormError> {
    items.into_iter().map(NewInvoiceItem::try_from).collect()
}

/// Header fields shared by every way of creating an invoice.
#[derive(Debug, Deserialize)]
pub struct InvoiceHeaderForm {
    pub client_id: i32,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    /// Basis points, 825 = 8.25%.
    #[serde(default)]
    pub tax_rate_bp: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug)]
pub struct InvoiceHeader {
    pub client_id: ClientId,
    pub dates: InvoiceDates,
    pub tax_rate: TaxRate,
    pub notes: Option<Description>,
}

impl TryFrom<InvoiceHeaderForm> for InvoiceHeader {
    type Error = FormError;

    fn try_from(form: InvoiceHeaderForm) -> Result<Self, Self::Error> {
        Ok(Self {
            client_id: ClientId::new(form.client_id)?,
            dates: InvoiceDates::new(form.issued_on, form.due_on)?,
            tax_rate: TaxRate::new(form.tax_rate_bp)?,
            notes: Description::optional(form.notes),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceForm {
    #[serde(flatten)]
    pub header: InvoiceHeaderForm,
    #[serde(default)]
    pub items: Vec<InvoiceItemForm>,
}

#[derive(Debug)]
pub struct CreateInvoicePayload {
    pub header: InvoiceHeader,
    pub items: Vec<NewInvoiceItem>,
}

impl TryFrom<CreateInvoiceForm> for CreateInvoicePayload {
    type Error = FormError;

    fn try_from(form: CreateInvoiceForm) -> Result<Self, Self::Error> {
        Ok(Self {
            header: InvoiceHeader::try_from(form.header)?,
            items: items_into_domain(form.items)?,
        })
    }
}

/// Bills completed work orders of one client, one line per work order.
#[derive(Debug, Deserialize)]
pub struct InvoiceFromWorkOrdersForm {
    #[serde(flatten)]
    pub header: InvoiceHeaderForm,
    pub work_order_ids: Vec<i32>,
}

#[derive(Debug)]
pub struct InvoiceFromWorkOrdersPayload {
    pub header: InvoiceHeader,
    pub work_order_ids: Vec<WorkOrderId>,
}

impl TryFrom<InvoiceFromWorkOrdersForm> for InvoiceFromWorkOrdersPayload {
    type Error = FormError;

    fn try_from(form: InvoiceFromWorkOrdersForm) -> Result<Self, Self::Error> {
        let mut work_order_ids = form
            .work_order_ids
            .into_iter()
            .map(WorkOrderId::new)
            .collect::<Result<Vec<_>, _>>()?;
        work_order_ids.sort();
        work_order_ids.dedup();
        Ok(Self {
            header: InvoiceHeader::try_from(form.header)?,
            work_order_ids,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct InvoiceItemsForm {
    pub items: Vec<InvoiceItemForm>,
}

impl InvoiceItemsForm {
    pub fn into_items(self) -> Result<Vec<NewInvoiceItem>, FormError> {
        items_into_domain(self.items)
    }
}

#[derive(Debug, Deserialize)]
pub struct InvoiceStatusForm {
    pub status: InvoiceStatus,
}
