use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    /// Matched against name, email, phone and address.
    pub search: Option<String>,
    pub page: Option<usize>,
}

/// Outcome of a CSV import.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UploadSummary {
    pub inserted: usize,
    /// Rows whose email already belongs to a client of the organization.
    pub skipped: usize,
}
