//! Diesel models for user accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{
    EmailAddress, OrganizationId, PersonName, TypeConstraintError, UserId, UserRole,
};
use crate::domain::user::{
    NewUser as DomainNewUser, UpdateUser as DomainUpdateUser, User as DomainUser,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub organization_id: i32,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub google_sub: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub organization_id: i32,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: Option<&'a str>,
    pub role: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UpdateUser<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(user.id)?,
            organization_id: OrganizationId::new(user.organization_id)?,
            email: EmailAddress::new(user.email)?,
            name: PersonName::new(user.name)?,
            password_hash: user.password_hash,
            google_sub: user.google_sub,
            role: user.role.parse::<UserRole>()?,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            organization_id: user.organization_id.get(),
            email: user.email.as_str(),
            name: user.name.as_str(),
            password_hash: user.password_hash.as_deref(),
            role: user.role.as_str(),
        }
    }
}

impl<'a> UpdateUser<'a> {
    pub fn from_domain(user: &'a DomainUpdateUser, updated_at: NaiveDateTime) -> Self {
        Self {
            name: user.name.as_str(),
            role: user.role.as_str(),
            is_active: user.is_active,
            updated_at,
        }
    }
}
