use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{
    Description, EmailAddress, OrganizationId, PhoneNumber, VendorName, WebsiteUrl,
};
use crate::domain::vendor::{NewVendor, UpdateVendor};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct VendorForm {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<VendorForm> for UpdateVendor {
    type Error = FormError;

    fn try_from(form: VendorForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(UpdateVendor {
            name: VendorName::new(form.name)?,
            email: non_blank(form.email).map(EmailAddress::new).transpose()?,
            phone: non_blank(form.phone).map(PhoneNumber::new).transpose()?,
            website: non_blank(form.website).map(WebsiteUrl::new).transpose()?,
            notes: Description::optional(form.notes),
        })
    }
}

impl VendorForm {
    pub fn into_new_vendor(self, organization_id: OrganizationId) -> Result<NewVendor, FormError> {
        let fields = UpdateVendor::try_from(self)?;
        Ok(NewVendor {
            organization_id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            website: fields.website,
            notes: fields.notes,
        })
    }
}
