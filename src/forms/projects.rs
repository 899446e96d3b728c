use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::project::{NewProject, ProjectDates, UpdateProject};
use crate::domain::types::{
    Cents, ClientId, Description, OrganizationId, ProjectName, ProjectStatus,
};
use crate::forms::FormError;

fn planned() -> ProjectStatus {
    ProjectStatus::Planned
}

#[derive(Debug, Deserialize, Validate)]
/// Editable project fields.
pub struct ProjectForm {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "planned")]
    pub status: ProjectStatus,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    #[serde(default)]
    pub budget: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectForm {
    pub client_id: i32,
    #[serde(flatten)]
    pub project: ProjectForm,
}

impl TryFrom<ProjectForm> for UpdateProject {
    type Error = FormError;

    fn try_from(form: ProjectForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(UpdateProject {
            name: ProjectName::new(form.name)?,
            description: Description::optional(form.description),
            status: form.status,
            dates: ProjectDates::new(form.starts_on, form.ends_on)?,
            budget: form.budget.map(Cents::new).transpose()?,
        })
    }
}

impl CreateProjectForm {
    pub fn into_new_project(self, organization_id: OrganizationId) -> Result<NewProject, FormError> {
        let client_id = ClientId::new(self.client_id)?;
        let fields = UpdateProject::try_from(self.project)?;
        Ok(NewProject {
            organization_id,
            client_id,
            name: fields.name,
            description: fields.description,
            status: fields.status,
            dates: fields.dates,
            budget: fields.budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_form_reads_flattened_fields() {
        let form: CreateProjectForm = serde_json::from_str(
            r#"{"client_id":4,"name":"Resurface","starts_on":"2026-04-01","ends_on":"2026-04-20","budget":1250000}"#,
        )
        .unwrap();
        let project = form
            .into_new_project(OrganizationId::new(1).unwrap())
            .unwrap();
        assert_eq!(project.client_id.get(), 4);
        assert_eq!(project.status, ProjectStatus::Planned);
        assert_eq!(project.budget.unwrap().get(), 1_250_000);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let form: ProjectForm = serde_json::from_str(
            r#"{"name":"Resurface","starts_on":"2026-04-20","ends_on":"2026-04-01"}"#,
        )
        .unwrap();
        assert!(UpdateProject::try_from(form).is_err());
    }
}
