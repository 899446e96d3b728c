//! User accounts and their credentials.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{EmailAddress, OrganizationId, PersonName, UserId, UserRole};

/// Account able to sign in. The password hash is never serialized.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub organization_id: OrganizationId,
    pub email: EmailAddress,
    pub name: PersonName,
    #[serde(skip)]
    pub password_hash: Option<String>,
    #[serde(skip)]
    pub google_sub: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub organization_id: OrganizationId,
    pub email: EmailAddress,
    pub name: PersonName,
    pub password_hash: Option<String>,
    pub role: UserRole,
}

impl NewUser {
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        email: EmailAddress,
        name: PersonName,
        password_hash: Option<String>,
        role: UserRole,
    ) -> Self {
        Self {
            organization_id,
            email,
            name,
            password_hash,
            role,
        }
    }
}

/// Administrative changes to an existing user.
#[derive(Clone, Debug)]
pub struct UpdateUser {
    pub name: PersonName,
    pub role: UserRole,
    pub is_active: bool,
}
