use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Cents, ClientId, Description, OrganizationId, ProjectId, ProjectName, ProjectStatus,
    TypeConstraintError,
};

/// A larger job for a client (renovation, equipment upgrade) grouping work orders.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub organization_id: OrganizationId,
    pub client_id: ClientId,
    pub name: ProjectName,
    pub description: Option<Description>,
    pub status: ProjectStatus,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub budget: Option<Cents>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Start and end dates of a project, end never before start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectDates {
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
}

impl ProjectDates {
    pub fn new(
        starts_on: Option<NaiveDate>,
        ends_on: Option<NaiveDate>,
    ) -> Result<Self, TypeConstraintError> {
        if let (Some(start), Some(end)) = (starts_on, ends_on)
            && end < start
        {
            return Err(TypeConstraintError::InvalidValue(
                "project cannot end before it starts".to_string(),
            ));
        }
        Ok(Self { starts_on, ends_on })
    }
}

#[derive(Clone, Debug)]
pub struct NewProject {
    pub organization_id: OrganizationId,
    pub client_id: ClientId,
    pub name: ProjectName,
    pub description: Option<Description>,
    pub status: ProjectStatus,
    pub dates: ProjectDates,
    pub budget: Option<Cents>,
}

#[derive(Clone, Debug)]
pub struct UpdateProject {
    pub name: ProjectName,
    pub description: Option<Description>,
    pub status: ProjectStatus,
    pub dates: ProjectDates,
    pub budget: Option<Cents>,
}
