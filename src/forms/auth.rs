//! Sign-up, sign-in and password forms.

use serde::Deserialize;
use validator::Validate;

use crate::domain::organization::NewOrganization;
use crate::domain::types::{EmailAddress, OrganizationName, Password, PersonName};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 128))]
    pub organization_name: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Validated registration data; the password is still in plain text.
#[derive(Debug)]
pub struct RegisterPayload {
    pub organization: NewOrganization,
    pub name: PersonName,
    pub email: EmailAddress,
    pub password: Password,
}

impl TryFrom<RegisterForm> for RegisterPayload {
    type Error = FormError;

    fn try_from(form: RegisterForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            organization: NewOrganization::new(OrganizationName::new(form.organization_name)?),
            name: PersonName::new(form.name)?,
            email: EmailAddress::new(form.email)?,
            password: Password::new(form.password)?,
        })
    }
}

/// Credentials are checked as given; malformed input is simply a failed login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    /// Empty for accounts that never had a password.
    #[serde(default)]
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str) -> RegisterForm {
        RegisterForm {
            organization_name: " Blue Water Pools ".to_string(),
            name: "Dana".to_string(),
            email: "Owner@BlueWater.test".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn registration_normalizes_fields() {
        let payload = RegisterPayload::try_from(form("correct horse")).unwrap();
        assert_eq!(payload.organization.name.as_str(), "Blue Water Pools");
        assert_eq!(payload.email.as_str(), "owner@bluewater.test");
    }

    #[test]
    fn registration_rejects_short_password() {
        let err = RegisterPayload::try_from(form("short")).unwrap_err();
        assert!(matches!(
            err,
            FormError::Constraint(crate::domain::types::TypeConstraintError::PasswordTooShort(8))
        ));
    }
}
