use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{
    Cents, ClientId, Description, OrganizationId, ProjectId, Recurrence, TechnicianId,
    WorkOrderKind, WorkOrderStatus, WorkOrderTitle,
};
use crate::domain::work_order::{NewWorkOrder, UpdateWorkOrder, validate_recurrence};
use crate::forms::FormError;

fn no_recurrence() -> Recurrence {
    Recurrence::None
}

#[derive(Debug, Deserialize, Validate)]
/// Editable work order fields.
pub struct WorkOrderForm {
    #[serde(default)]
    pub technician_id: Option<i32>,
    #[serde(default)]
    pub project_id: Option<i32>,
    pub kind: WorkOrderKind,
    #[serde(default = "no_recurrence")]
    pub recurrence: Recurrence,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_on: NaiveDate,
    /// Cents.
    #[serde(default)]
    pub price: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkOrderForm {
    pub client_id: i32,
    #[serde(flatten)]
    pub work_order: WorkOrderForm,
}

#[derive(Debug, Deserialize)]
pub struct TransitionForm {
    pub status: WorkOrderStatus,
}

impl TryFrom<WorkOrderForm> for UpdateWorkOrder {
    type Error = FormError;

    fn try_from(form: WorkOrderForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(UpdateWorkOrder {
            technician_id: form.technician_id.map(TechnicianId::new).transpose()?,
            project_id: form.project_id.map(ProjectId::new).transpose()?,
            kind: form.kind,
            recurrence: validate_recurrence(form.kind, form.recurrence)?,
            title: WorkOrderTitle::new(form.title)?,
            description: Description::optional(form.description),
            scheduled_on: form.scheduled_on,
            price: Cents::new(form.price)?,
        })
    }
}

impl CreateWorkOrderForm {
    pub fn into_new_work_order(
        self,
        organization_id: OrganizationId,
    ) -> Result<NewWorkOrder, FormError> {
        let client_id = ClientId::new(self.client_id)?;
        let fields = UpdateWorkOrder::try_from(self.work_order)?;
        Ok(NewWorkOrder {
            organization_id,
            client_id,
            technician_id: fields.technician_id,
            project_id: fields.project_id,
            kind: fields.kind,
            recurrence: fields.recurrence,
            title: fields.title,
            description: fields.description,
            scheduled_on: fields.scheduled_on,
            price: fields.price,
        })
    }
}
