use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{EmailAddress, OrganizationId, Password, PersonName, UserRole};
use crate::domain::user::UpdateUser;
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub role: UserRole,
    /// Users without a password can only sign in through Google.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct CreateUserPayload {
    pub organization_id: OrganizationId,
    pub email: EmailAddress,
    pub name: PersonName,
    pub role: UserRole,
    pub password: Option<Password>,
}

impl CreateUserForm {
    pub fn into_payload(self, organization_id: OrganizationId) -> Result<CreateUserPayload, FormError> {
        self.validate()?;
        Ok(CreateUserPayload {
            organization_id,
            email: EmailAddress::new(self.email)?,
            name: PersonName::new(self.name)?,
            role: self.role,
            password: non_blank(self.password).map(Password::new).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserForm {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl TryFrom<UpdateUserForm> for UpdateUser {
    type Error = FormError;

    fn try_from(form: UpdateUserForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(UpdateUser {
            name: PersonName::new(form.name)?,
            role: form.role,
            is_active: form.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_password_means_oauth_only() {
        let form: CreateUserForm = serde_json::from_str(
            r#"{"email":"tech@pools.test","name":"Sam","role":"technician","password":"  "}"#,
        )
        .unwrap();
        let payload = form.into_payload(OrganizationId::new(1).unwrap()).unwrap();
        assert!(payload.password.is_none());
        assert_eq!(payload.role, UserRole::Technician);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_str::<CreateUserForm>(
            r#"{"email":"tech@pools.test","name":"Sam","role":"owner"}"#,
        );
        assert!(result.is_err());
    }
}
