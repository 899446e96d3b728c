//! Diesel models and conversions to and from the domain layer.

pub mod chemical_price;
pub mod client;
pub mod communication_provider;
pub mod config;
pub mod invoice;
pub mod organization;
pub mod project;
pub mod technician;
pub mod user;
pub mod vendor;
pub mod work_order;

use crate::domain::types::{Description, EmailAddress, PhoneNumber, TypeConstraintError};

/// Parses an optional stored email, treating blanks as absent.
pub(crate) fn optional_email(value: Option<String>) -> Result<Option<EmailAddress>, TypeConstraintError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(EmailAddress::new)
        .transpose()
}

/// Parses an optional stored phone, treating blanks as absent.
pub(crate) fn optional_phone(value: Option<String>) -> Result<Option<PhoneNumber>, TypeConstraintError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(PhoneNumber::new)
        .transpose()
}

pub(crate) fn optional_description(value: Option<String>) -> Option<Description> {
    Description::optional(value)
}
