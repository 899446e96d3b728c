//! Diesel models for work orders.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::types::{
    Cents, ClientId, InvoiceId, OrganizationId, ProjectId, Recurrence, TechnicianId,
    TypeConstraintError, WorkOrderId, WorkOrderKind, WorkOrderStatus, WorkOrderTitle,
};
use crate::domain::work_order::{
    NewWorkOrder as DomainNewWorkOrder, UpdateWorkOrder as DomainUpdateWorkOrder,
    WorkOrder as DomainWorkOrder,
};
use crate::models::optional_description;

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::work_orders)]
pub struct WorkOrder {
    pub id: i32,
    pub organization_id: i32,
    pub client_id: i32,
    pub technician_id: Option<i32>,
    pub project_id: Option<i32>,
    pub invoice_id: Option<i32>,
    pub kind: String,
    pub status: String,
    pub recurrence: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_on: NaiveDate,
    pub price_cents: i64,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_orders)]
pub struct NewWorkOrder<'a> {
    pub organization_id: i32,
    pub client_id: i32,
    pub technician_id: Option<i32>,
    pub project_id: Option<i32>,
    pub kind: &'a str,
    pub status: &'a str,
    pub recurrence: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub scheduled_on: NaiveDate,
    pub price_cents: i64,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::work_orders)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateWorkOrder<'a> {
    pub technician_id: Option<i32>,
    pub project_id: Option<i32>,
    pub kind: &'a str,
    pub recurrence: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub scheduled_on: NaiveDate,
    pub price_cents: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::work_orders)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateWorkOrderStatus<'a> {
    pub status: &'a str,
    pub completed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<WorkOrder> for DomainWorkOrder {
    type Error = TypeConstraintError;

    fn try_from(value: WorkOrder) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WorkOrderId::new(value.id)?,
            organization_id: OrganizationId::new(value.organization_id)?,
            client_id: ClientId::new(value.client_id)?,
            technician_id: value.technician_id.map(TechnicianId::new).transpose()?,
            project_id: value.project_id.map(ProjectId::new).transpose()?,
            invoice_id: value.invoice_id.map(InvoiceId::new).transpose()?,
            kind: value.kind.parse::<WorkOrderKind>()?,
            status: value.status.parse::<WorkOrderStatus>()?,
            recurrence: value.recurrence.parse::<Recurrence>()?,
            title: WorkOrderTitle::new(value.title)?,
            description: optional_description(value.description),
            scheduled_on: value.scheduled_on,
            price: Cents::new(value.price_cents)?,
            completed_at: value.completed_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewWorkOrder> for NewWorkOrder<'a> {
    fn from(value: &'a DomainNewWorkOrder) -> Self {
        Self {
            organization_id: value.organization_id.get(),
            client_id: value.client_id.get(),
            technician_id: value.technician_id.map(TechnicianId::get),
            project_id: value.project_id.map(ProjectId::get),
            kind: value.kind.as_str(),
            status: WorkOrderStatus::Scheduled.as_str(),
            recurrence: value.recurrence.as_str(),
            title: value.title.as_str(),
            description: value.description.as_ref().map(|d| d.as_str()),
            scheduled_on: value.scheduled_on,
            price_cents: value.price.get(),
        }
    }
}

impl<'a> UpdateWorkOrder<'a> {
    pub fn from_domain(value: &'a DomainUpdateWorkOrder, updated_at: NaiveDateTime) -> Self {
        Self {
            technician_id: value.technician_id.map(TechnicianId::get),
            project_id: value.project_id.map(ProjectId::get),
            kind: value.kind.as_str(),
            recurrence: value.recurrence.as_str(),
            title: value.title.as_str(),
            description: value.description.as_ref().map(|d| d.as_str()),
            scheduled_on: value.scheduled_on,
            price_cents: value.price.get(),
            updated_at,
        }
    }
}
