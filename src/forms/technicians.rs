use serde::Deserialize;
use validator::Validate;

use crate::domain::technician::{NewTechnician, UpdateTechnician};
use crate::domain::types::{
    Cents, EmailAddress, OrganizationId, PersonName, PhoneNumber, UserId,
};
use crate::forms::{FormError, non_blank};

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct TechnicianForm {
    #[serde(default)]
    pub user_id: Option<i32>,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Cents per hour.
    #[serde(default)]
    pub hourly_rate: i64,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

#[derive(Debug)]
pub struct TechnicianPayload {
    pub user_id: Option<UserId>,
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub hourly_rate: Cents,
    pub is_active: bool,
}

impl TryFrom<TechnicianForm> for TechnicianPayload {
    type Error = FormError;

    fn try_from(form: TechnicianForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            user_id: form.user_id.map(UserId::new).transpose()?,
            name: PersonName::new(form.name)?,
            email: non_blank(form.email).map(EmailAddress::new).transpose()?,
            phone: non_blank(form.phone).map(PhoneNumber::new).transpose()?,
            hourly_rate: Cents::new(form.hourly_rate)?,
            is_active: form.is_active,
        })
    }
}

impl TechnicianPayload {
    pub fn into_new_technician(self, organization_id: OrganizationId) -> NewTechnician {
        NewTechnician {
            organization_id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            hourly_rate: self.hourly_rate,
        }
    }

    pub fn into_update(self) -> UpdateTechnician {
        UpdateTechnician {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            hourly_rate: self.hourly_rate,
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_active_without_linked_user() {
        let form: TechnicianForm =
            serde_json::from_str(r#"{"name":"Sam Ortiz","hourly_rate":3500}"#).unwrap();
        let payload = TechnicianPayload::try_from(form).unwrap();
        assert!(payload.is_active);
        assert!(payload.user_id.is_none());
        assert_eq!(payload.hourly_rate.get(), 3500);
    }

    #[test]
    fn negative_rate_is_rejected() {
        let form: TechnicianForm =
            serde_json::from_str(r#"{"name":"Sam","hourly_rate":-1}"#).unwrap();
        assert!(TechnicianPayload::try_from(form).is_err());
    }
}
