use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{EmailAddress, OrganizationId, OrganizationName, PersonName};

/// A tenant. Every other record belongs to exactly one organization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: OrganizationName,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewOrganization {
    pub name: OrganizationName,
}

impl NewOrganization {
    #[must_use]
    pub fn new(name: OrganizationName) -> Self {
        Self { name }
    }
}

/// Sign-up of a new organization together with its first administrator.
#[derive(Clone, Debug)]
pub struct Registration {
    pub organization: NewOrganization,
    pub email: EmailAddress,
    pub name: PersonName,
    pub password_hash: String,
}
