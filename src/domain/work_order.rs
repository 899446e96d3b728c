//! Work orders: scheduled maintenance visits, repairs and other field jobs.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Cents, ClientId, Description, InvoiceId, OrganizationId, ProjectId, Recurrence,
    TechnicianId, TypeConstraintError, WorkOrderId, WorkOrderKind, WorkOrderStatus, WorkOrderTitle,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub organization_id: OrganizationId,
    pub client_id: ClientId,
    pub technician_id: Option<TechnicianId>,
    pub project_id: Option<ProjectId>,
    pub invoice_id: Option<InvoiceId>,
    pub kind: WorkOrderKind,
    pub status: WorkOrderStatus,
    pub recurrence: Recurrence,
    pub title: WorkOrderTitle,
    pub description: Option<Description>,
    pub scheduled_on: NaiveDate,
    pub price: Cents,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WorkOrder {
    /// Scheduled or in progress.
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            WorkOrderStatus::Scheduled | WorkOrderStatus::InProgress
        )
    }

    /// Completed and not yet billed.
    pub fn is_billable(&self) -> bool {
        self.status == WorkOrderStatus::Completed && self.invoice_id.is_none()
    }

    /// Next occurrence of a recurring visit, if any.
    pub fn next_occurrence(&self) -> Option<NewWorkOrder> {
        let scheduled_on = self.recurrence.next_date(self.scheduled_on)?;
        Some(NewWorkOrder {
            organization_id: self.organization_id,
            client_id: self.client_id,
            technician_id: self.technician_id,
            project_id: self.project_id,
            kind: self.kind,
            recurrence: self.recurrence,
            title: self.title.clone(),
            description: self.description.clone(),
            scheduled_on,
            price: self.price,
        })
    }
}

impl WorkOrderStatus {
    /// Whether a work order may move from `self` to `next`.
    pub fn can_transition_to(self, next: WorkOrderStatus) -> bool {
        use WorkOrderStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (Scheduled, Completed)
                | (Scheduled, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }
}

impl Recurrence {
    /// Date of the following visit, `None` for one-off work.
    ///
    /// Monthly recurrence keeps the day of month, clamped to the last day of
    /// shorter months.
    pub fn next_date(self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Recurrence::None => None,
            Recurrence::Weekly => from.checked_add_signed(Duration::days(7)),
            Recurrence::Biweekly => from.checked_add_signed(Duration::days(14)),
            Recurrence::Monthly => {
                let (year, month) = if from.month() == 12 {
                    (from.year() + 1, 1)
                } else {
                    (from.year(), from.month() + 1)
                };
                let last_day = last_day_of_month(year, month)?;
                NaiveDate::from_ymd_opt(year, month, from.day().min(last_day))
            }
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewWorkOrder {
    pub organization_id: OrganizationId,
    pub client_id: ClientId,
    pub technician_id: Option<TechnicianId>,
    pub project_id: Option<ProjectId>,
    pub kind: WorkOrderKind,
    pub recurrence: Recurrence,
    pub title: WorkOrderTitle,
    pub description: Option<Description>,
    pub scheduled_on: NaiveDate,
    pub price: Cents,
}

/// Only maintenance visits may repeat.
pub fn validate_recurrence(
    kind: WorkOrderKind,
    recurrence: Recurrence,
) -> Result<Recurrence, TypeConstraintError> {
    if recurrence != Recurrence::None && kind != WorkOrderKind::Maintenance {
        return Err(TypeConstraintError::InvalidValue(format!(
            "{kind} work orders cannot recur"
        )));
    }
    Ok(recurrence)
}

#[derive(Clone, Debug)]
pub struct UpdateWorkOrder {
    pub technician_id: Option<TechnicianId>,
    pub project_id: Option<ProjectId>,
    pub kind: WorkOrderKind,
    pub recurrence: Recurrence,
    pub title: WorkOrderTitle,
    pub description: Option<Description>,
    pub scheduled_on: NaiveDate,
    pub price: Cents,
}

/// Status change of a work order, with the follow-up visit to create when a
/// recurring work order is completed.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkOrderTransition {
    /// Status the work order had when the change was planned.
    pub from: WorkOrderStatus,
    pub status: WorkOrderStatus,
    pub completed_at: Option<NaiveDateTime>,
    pub next_occurrence: Option<NewWorkOrder>,
}

impl WorkOrderTransition {
    /// Validates moving `work_order` to `next` at `now`.
    pub fn plan(
        work_order: &WorkOrder,
        next: WorkOrderStatus,
        now: NaiveDateTime,
    ) -> Option<Self> {
        if !work_order.status.can_transition_to(next) {
            return None;
        }
        let completed = next == WorkOrderStatus::Completed;
        Some(Self {
            from: work_order.status,
            status: next,
            completed_at: completed.then_some(now),
            next_occurrence: if completed {
                work_order.next_occurrence()
            } else {
                None
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn terminal_statuses_do_not_transition() {
        assert!(WorkOrderStatus::Scheduled.can_transition_to(WorkOrderStatus::InProgress));
        assert!(WorkOrderStatus::InProgress.can_transition_to(WorkOrderStatus::Completed));
        assert!(!WorkOrderStatus::Completed.can_transition_to(WorkOrderStatus::Scheduled));
        assert!(!WorkOrderStatus::Cancelled.can_transition_to(WorkOrderStatus::InProgress));
        assert!(!WorkOrderStatus::InProgress.can_transition_to(WorkOrderStatus::Scheduled));
    }

    #[test]
    fn weekly_and_biweekly_add_days() {
        assert_eq!(Recurrence::Weekly.next_date(date(2026, 12, 28)), Some(date(2027, 1, 4)));
        assert_eq!(Recurrence::Biweekly.next_date(date(2026, 2, 20)), Some(date(2026, 3, 6)));
        assert_eq!(Recurrence::None.next_date(date(2026, 2, 20)), None);
    }

    #[test]
    fn monthly_clamps_to_month_end() {
        assert_eq!(Recurrence::Monthly.next_date(date(2026, 1, 31)), Some(date(2026, 2, 28)));
        assert_eq!(Recurrence::Monthly.next_date(date(2028, 1, 30)), Some(date(2028, 2, 29)));
        assert_eq!(Recurrence::Monthly.next_date(date(2026, 12, 15)), Some(date(2027, 1, 15)));
    }

    #[test]
    fn only_maintenance_recurs() {
        assert!(validate_recurrence(WorkOrderKind::Repair, Recurrence::Weekly).is_err());
        assert_eq!(
            validate_recurrence(WorkOrderKind::Maintenance, Recurrence::Weekly),
            Ok(Recurrence::Weekly)
        );
        assert!(validate_recurrence(WorkOrderKind::Repair, Recurrence::None).is_ok());
    }

    fn work_order(status: WorkOrderStatus, recurrence: Recurrence) -> WorkOrder {
        let now = date(2026, 3, 2).and_hms_opt(9, 0, 0).unwrap();
        WorkOrder {
            id: WorkOrderId::new(1).unwrap(),
            organization_id: OrganizationId::new(1).unwrap(),
            client_id: ClientId::new(1).unwrap(),
            technician_id: None,
            project_id: None,
            invoice_id: None,
            kind: WorkOrderKind::Maintenance,
            status,
            recurrence,
            title: WorkOrderTitle::new("Weekly service").unwrap(),
            description: None,
            scheduled_on: date(2026, 3, 2),
            price: Cents::new(9_000).unwrap(),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn completing_recurring_work_schedules_next_visit() {
        let now = date(2026, 3, 2).and_hms_opt(15, 30, 0).unwrap();
        let order = work_order(WorkOrderStatus::InProgress, Recurrence::Biweekly);

        let transition =
            WorkOrderTransition::plan(&order, WorkOrderStatus::Completed, now).unwrap();

        assert_eq!(transition.completed_at, Some(now));
        let next = transition.next_occurrence.unwrap();
        assert_eq!(next.scheduled_on, date(2026, 3, 16));
        assert_eq!(next.title, order.title);
    }

    #[test]
    fn cancelling_does_not_schedule_next_visit() {
        let now = date(2026, 3, 2).and_hms_opt(15, 30, 0).unwrap();
        let order = work_order(WorkOrderStatus::Scheduled, Recurrence::Weekly);

        let transition =
            WorkOrderTransition::plan(&order, WorkOrderStatus::Cancelled, now).unwrap();
        assert!(transition.next_occurrence.is_none());
        assert!(transition.completed_at.is_none());

        let done = work_order(WorkOrderStatus::Completed, Recurrence::Weekly);
        assert!(WorkOrderTransition::plan(&done, WorkOrderStatus::InProgress, now).is_none());
    }
}
