//! Claims describing the signed-in user.

use serde::{Deserialize, Serialize};

use crate::domain::types::{OrganizationId, TypeConstraintError, UserId, UserRole};
use crate::domain::user::User;

/// Role granted to every active user of an organization.
pub const SERVICE_ACCESS_ROLE: &str = "pool";
/// Role allowing user and provider administration.
pub const SERVICE_ADMIN_ROLE: &str = "pool_admin";
/// Role allowing day-to-day office work (clients, scheduling, billing).
pub const SERVICE_OFFICE_ROLE: &str = "pool_office";
/// Role of field technicians.
pub const SERVICE_TECHNICIAN_ROLE: &str = "pool_technician";

/// Identity carried in the session cookie.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User id as a string, JWT style.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub organization_id: i32,
    pub roles: Vec<String>,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Builds claims for `user` that expire at `exp`.
    pub fn from_user(user: &User, exp: usize) -> Self {
        Self {
            sub: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.as_str().to_string(),
            organization_id: user.organization_id.get(),
            roles: roles_for(user.role)
                .iter()
                .map(|role| role.to_string())
                .collect(),
            exp,
        }
    }

    pub fn user_id(&self) -> Result<UserId, TypeConstraintError> {
        let id = self
            .sub
            .parse::<i32>()
            .map_err(|_| TypeConstraintError::InvalidValue(format!("bad subject `{}`", self.sub)))?;
        UserId::new(id)
    }

    pub fn organization_id(&self) -> Result<OrganizationId, TypeConstraintError> {
        OrganizationId::new(self.organization_id)
    }

    pub fn has_role(&self, role: &str) -> bool {
        check_role(role, &self.roles)
    }
}

/// Identity asserted by an external OAuth provider.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct OAuthProfile {
    /// Stable account id at the provider.
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
}

/// Role strings granted for a stored [`UserRole`].
pub fn roles_for(role: UserRole) -> &'static [&'static str] {
    match role {
        UserRole::Admin => &[SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE, SERVICE_OFFICE_ROLE],
        UserRole::Office => &[SERVICE_ACCESS_ROLE, SERVICE_OFFICE_ROLE],
        UserRole::Technician => &[SERVICE_ACCESS_ROLE, SERVICE_TECHNICIAN_ROLE],
    }
}

pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_gets_office_rights() {
        let roles = roles_for(UserRole::Admin);
        assert!(roles.contains(&SERVICE_OFFICE_ROLE));
        assert!(!roles.contains(&SERVICE_TECHNICIAN_ROLE));
    }

    #[test]
    fn user_id_is_parsed_from_subject() {
        let user = AuthenticatedUser {
            sub: "17".to_string(),
            email: "a@b.co".to_string(),
            name: "A".to_string(),
            organization_id: 3,
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        };
        assert_eq!(user.user_id().unwrap().get(), 17);
        assert!(user.has_role(SERVICE_ACCESS_ROLE));
        assert!(!user.has_role(SERVICE_ADMIN_ROLE));
    }
}
