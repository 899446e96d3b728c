//! Business rules behind the HTTP handlers.
//!
//! Every function takes the repository as a trait object bound and the
//! signed-in user, checks the caller's role before touching storage and
//! returns a [`ServiceResult`].

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::domain::auth::{AuthenticatedUser, SERVICE_OFFICE_ROLE, SERVICE_TECHNICIAN_ROLE};
use crate::domain::types::{OrganizationId, TechnicianId, TypeConstraintError};
use crate::forms::FormError;
use crate::repository::TechnicianReader;
use crate::repository::errors::RepositoryError;

pub mod admin;
pub mod auth;
pub mod chemical_prices;
pub mod clients;
pub mod communication_providers;
pub mod dashboard;
pub mod invoices;
pub mod projects;
pub mod technicians;
pub mod users;
pub mod vendors;
pub mod work_orders;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    TypeConstraint(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ConstraintViolation(message) => ServiceError::Conflict(message),
            other => ServiceError::Repository(other),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(err.to_string())
    }
}

/// Fails with [`ServiceError::Unauthorized`] unless the user holds `role`.
pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if user.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// What part of the organization's field work a user may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkScope {
    Organization,
    Technician(TechnicianId),
}

impl WorkScope {
    pub fn technician(self) -> Option<TechnicianId> {
        match self {
            WorkScope::Organization => None,
            WorkScope::Technician(id) => Some(id),
        }
    }
}

/// Office staff see everything; technicians see the work of the technician
/// record linked to their account.
pub fn work_scope<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<WorkScope>
where
    R: TechnicianReader + ?Sized,
{
    if user.has_role(SERVICE_OFFICE_ROLE) {
        return Ok(WorkScope::Organization);
    }
    ensure_role(user, SERVICE_TECHNICIAN_ROLE)?;

    let organization_id = user.organization_id()?;
    let technician = repo.get_technician_by_user(user.user_id()?)?;
    match technician {
        Some(technician) if technician.organization_id == organization_id => {
            Ok(WorkScope::Technician(technician.id))
        }
        _ => Err(ServiceError::Unauthorized),
    }
}

pub(crate) fn organization_of(user: &AuthenticatedUser) -> ServiceResult<OrganizationId> {
    Ok(user.organization_id()?)
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::domain::auth::{AuthenticatedUser, roles_for};
    use crate::domain::technician::Technician;
    use crate::domain::types::{
        Cents, OrganizationId, PersonName, TechnicianId, UserId, UserRole,
    };

    pub const ORG: i32 = 42;

    pub fn org() -> OrganizationId {
        OrganizationId::new(ORG).expect("valid organization id")
    }

    pub fn user_with_role(id: i32, role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: id.to_string(),
            email: format!("user{id}@pools.test"),
            name: format!("User {id}"),
            organization_id: ORG,
            roles: roles_for(role).iter().map(|r| r.to_string()).collect(),
            exp: 0,
        }
    }

    pub fn admin() -> AuthenticatedUser {
        user_with_role(1, UserRole::Admin)
    }

    pub fn office() -> AuthenticatedUser {
        user_with_role(2, UserRole::Office)
    }

    pub fn technician_user() -> AuthenticatedUser {
        user_with_role(3, UserRole::Technician)
    }

    pub fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp")
    }

    /// Technician record linked to [`technician_user`].
    pub fn linked_technician(id: i32) -> Technician {
        Technician {
            id: TechnicianId::new(id).expect("valid technician id"),
            organization_id: org(),
            user_id: Some(UserId::new(3).expect("valid user id")),
            name: PersonName::new("Sam Ortiz").expect("valid name"),
            email: None,
            phone: None,
            hourly_rate: Cents::new(3500).expect("valid rate"),
            is_active: true,
            created_at: stamp(),
        }
    }
}
