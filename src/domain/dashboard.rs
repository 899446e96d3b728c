use serde::Serialize;

use crate::domain::types::Cents;

/// Headline numbers of an organization.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub clients: usize,
    /// Scheduled or in progress.
    pub open_work_orders: usize,
    pub work_orders_today: usize,
    pub overdue_invoices: usize,
    /// Sum of the totals of overdue invoices.
    pub outstanding: Cents,
}
