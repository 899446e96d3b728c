use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::project::{
    NewProject as DomainNewProject, Project as DomainProject, UpdateProject as DomainUpdateProject,
};
use crate::domain::types::{
    Cents, ClientId, OrganizationId, ProjectId, ProjectName, ProjectStatus, TypeConstraintError,
};
use crate::models::optional_description;

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::projects)]
pub struct Project {
    pub id: i32,
    pub organization_id: i32,
    pub client_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub budget_cents: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::projects)]
pub struct NewProject<'a> {
    pub organization_id: i32,
    pub client_id: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub budget_cents: Option<i64>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateProject<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub budget_cents: Option<i64>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Project> for DomainProject {
    type Error = TypeConstraintError;

    fn try_from(value: Project) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProjectId::new(value.id)?,
            organization_id: OrganizationId::new(value.organization_id)?,
            client_id: ClientId::new(value.client_id)?,
            name: ProjectName::new(value.name)?,
            description: optional_description(value.description),
            status: value.status.parse::<ProjectStatus>()?,
            starts_on: value.starts_on,
            ends_on: value.ends_on,
            budget: value.budget_cents.map(Cents::new).transpose()?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewProject> for NewProject<'a> {
    fn from(value: &'a DomainNewProject) -> Self {
        Self {
            organization_id: value.organization_id.get(),
            client_id: value.client_id.get(),
            name: value.name.as_str(),
            description: value.description.as_ref().map(|d| d.as_str()),
            status: value.status.as_str(),
            starts_on: value.dates.starts_on,
            ends_on: value.dates.ends_on,
            budget_cents: value.budget.map(Cents::get),
        }
    }
}

impl<'a> UpdateProject<'a> {
    pub fn from_domain(value: &'a DomainUpdateProject, updated_at: NaiveDateTime) -> Self {
        Self {
            name: value.name.as_str(),
            description: value.description.as_ref().map(|d| d.as_str()),
            status: value.status.as_str(),
            starts_on: value.dates.starts_on,
            ends_on: value.dates.ends_on,
            budget_cents: value.budget.map(Cents::get),
            updated_at,
        }
    }
}
