use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::{WorkOrderKind, WorkOrderStatus};
use crate::domain::work_order::WorkOrder;

#[derive(Debug, Default, Deserialize)]
pub struct WorkOrdersQuery {
    pub status: Option<WorkOrderStatus>,
    pub kind: Option<WorkOrderKind>,
    pub technician_id: Option<i32>,
    pub client_id: Option<i32>,
    pub project_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub technician_id: Option<i32>,
}

/// Work orders of one calendar day.
#[derive(Debug, Serialize, PartialEq)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub work_orders: Vec<WorkOrder>,
}

/// Result of a status change.
#[derive(Debug, Serialize, PartialEq)]
pub struct TransitionResult {
    pub work_order: WorkOrder,
    /// Follow-up visit created for a completed recurring work order.
    pub next_occurrence: Option<WorkOrder>,
}
