use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{OrganizationId, TypeConstraintError, VendorId, VendorName, WebsiteUrl};
use crate::domain::vendor::{
    NewVendor as DomainNewVendor, UpdateVendor as DomainUpdateVendor, Vendor as DomainVendor,
};
use crate::models::{optional_description, optional_email, optional_phone};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::vendors)]
pub struct Vendor {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::vendors)]
pub struct NewVendor<'a> {
    pub organization_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub website: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::vendors)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateVendor<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub website: Option<&'a str>,
    pub notes: Option<&'a str>,
}

impl TryFrom<Vendor> for DomainVendor {
    type Error = TypeConstraintError;

    fn try_from(value: Vendor) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VendorId::new(value.id)?,
            organization_id: OrganizationId::new(value.organization_id)?,
            name: VendorName::new(value.name)?,
            email: optional_email(value.email)?,
            phone: optional_phone(value.phone)?,
            website: value
                .website
                .filter(|w| !w.trim().is_empty())
                .map(WebsiteUrl::new)
                .transpose()?,
            notes: optional_description(value.notes),
            created_at: value.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewVendor> for NewVendor<'a> {
    fn from(value: &'a DomainNewVendor) -> Self {
        Self {
            organization_id: value.organization_id.get(),
            name: value.name.as_str(),
            email: value.email.as_ref().map(|e| e.as_str()),
            phone: value.phone.as_ref().map(|p| p.as_str()),
            website: value.website.as_ref().map(|w| w.as_str()),
            notes: value.notes.as_ref().map(|n| n.as_str()),
        }
    }
}

impl<'a> From<&'a DomainUpdateVendor> for UpdateVendor<'a> {
    fn from(value: &'a DomainUpdateVendor) -> Self {
        Self {
            name: value.name.as_str(),
            email: value.email.as_ref().map(|e| e.as_str()),
            phone: value.phone.as_ref().map(|p| p.as_str()),
            website: value.website.as_ref().map(|w| w.as_str()),
            notes: value.notes.as_ref().map(|n| n.as_str()),
        }
    }
}
