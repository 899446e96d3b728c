use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::technician::{
    NewTechnician as DomainNewTechnician, Technician as DomainTechnician,
    UpdateTechnician as DomainUpdateTechnician,
};
use crate::domain::types::{
    Cents, OrganizationId, PersonName, TechnicianId, TypeConstraintError, UserId,
};
use crate::models::{optional_email, optional_phone};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::technicians)]
pub struct Technician {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hourly_rate_cents: i64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::technicians)]
pub struct NewTechnician<'a> {
    pub organization_id: i32,
    pub user_id: Option<i32>,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub hourly_rate_cents: i64,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::technicians)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateTechnician<'a> {
    pub user_id: Option<i32>,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub hourly_rate_cents: i64,
    pub is_active: bool,
}

impl TryFrom<Technician> for DomainTechnician {
    type Error = TypeConstraintError;

    fn try_from(value: Technician) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TechnicianId::new(value.id)?,
            organization_id: OrganizationId::new(value.organization_id)?,
            user_id: value.user_id.map(UserId::new).transpose()?,
            name: PersonName::new(value.name)?,
            email: optional_email(value.email)?,
            phone: optional_phone(value.phone)?,
            hourly_rate: Cents::new(value.hourly_rate_cents)?,
            is_active: value.is_active,
            created_at: value.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewTechnician> for NewTechnician<'a> {
    fn from(value: &'a DomainNewTechnician) -> Self {
        Self {
            organization_id: value.organization_id.get(),
            user_id: value.user_id.map(UserId::get),
            name: value.name.as_str(),
            email: value.email.as_ref().map(|e| e.as_str()),
            phone: value.phone.as_ref().map(|p| p.as_str()),
            hourly_rate_cents: value.hourly_rate.get(),
        }
    }
}

impl<'a> From<&'a DomainUpdateTechnician> for UpdateTechnician<'a> {
    fn from(value: &'a DomainUpdateTechnician) -> Self {
        Self {
            user_id: value.user_id.map(UserId::get),
            name: value.name.as_str(),
            email: value.email.as_ref().map(|e| e.as_str()),
            phone: value.phone.as_ref().map(|p| p.as_str()),
            hourly_rate_cents: value.hourly_rate.get(),
            is_active: value.is_active,
        }
    }
}
