use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::organization::{
    NewOrganization as DomainNewOrganization, Organization as DomainOrganization,
};
use crate::domain::types::{OrganizationId, OrganizationName, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::organizations)]
pub struct Organization {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::organizations)]
pub struct NewOrganization<'a> {
    pub name: &'a str,
}

impl TryFrom<Organization> for DomainOrganization {
    type Error = TypeConstraintError;

    fn try_from(value: Organization) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrganizationId::new(value.id)?,
            name: OrganizationName::new(value.name)?,
            created_at: value.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewOrganization> for NewOrganization<'a> {
    fn from(value: &'a DomainNewOrganization) -> Self {
        Self {
            name: value.name.as_str(),
        }
    }
}
