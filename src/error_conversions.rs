//! Error conversion glue between the domain and the persistence layer.
//!
//! The domain layer does not know about repository errors; rows that fail to
//! convert into domain values surface as validation errors.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}
