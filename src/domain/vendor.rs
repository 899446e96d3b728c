use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Description, EmailAddress, OrganizationId, PhoneNumber, VendorId, VendorName, WebsiteUrl,
};

/// Supplier of chemicals, parts and equipment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub id: VendorId,
    pub organization_id: OrganizationId,
    pub name: VendorName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub website: Option<WebsiteUrl>,
    pub notes: Option<Description>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewVendor {
    pub organization_id: OrganizationId,
    pub name: VendorName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub website: Option<WebsiteUrl>,
    pub notes: Option<Description>,
}

#[derive(Clone, Debug)]
pub struct UpdateVendor {
    pub name: VendorName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub website: Option<WebsiteUrl>,
    pub notes: Option<Description>,
}
