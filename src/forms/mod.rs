//! Request bodies accepted by the JSON API and their conversion into
//! validated domain payloads.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod auth;
pub mod chemical_prices;
pub mod clients;
pub mod communication_providers;
pub mod invoices;
pub mod projects;
pub mod technicians;
pub mod users;
pub mod vendors;
pub mod work_orders;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Constraint(#[from] TypeConstraintError),

    #[error("invalid csv: {0}")]
    Csv(String),

    #[error("invalid csv row {row}: {message}")]
    CsvRow { row: usize, message: String },

    #[error("settings must be a JSON object")]
    InvalidSettings,
}

/// Trims the value and drops it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_drops_whitespace() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" a ".to_string())), Some("a".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
