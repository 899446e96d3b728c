use crate::domain::auth::{AuthenticatedUser, SERVICE_OFFICE_ROLE};
use crate::domain::project::{Project, UpdateProject};
use crate::domain::types::{ClientId, ProjectId};
use crate::dto::projects::ProjectsQuery;
use crate::forms::projects::{CreateProjectForm, ProjectForm};
use crate::repository::{ClientReader, ProjectReader, ProjectWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, organization_of};

pub fn list_projects<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ProjectsQuery,
) -> ServiceResult<Vec<Project>>
where
    R: ProjectReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let client_id = params.client_id.map(ClientId::new).transpose()?;
    Ok(repo.list_projects(organization_of(user)?, client_id)?)
}

pub fn get_project<R>(repo: &R, user: &AuthenticatedUser, project_id: i32) -> ServiceResult<Project>
where
    R: ProjectReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;
    repo.get_project_by_id(ProjectId::new(project_id)?, organization_of(user)?)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_project<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateProjectForm,
) -> ServiceResult<Project>
where
    R: ClientReader + ProjectWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let new_project = form.into_new_project(organization_id)?;

    if repo
        .get_client_by_id(new_project.client_id, organization_id)?
        .is_none()
    {
        return Err(ServiceError::NotFound);
    }

    repo.create_project(&new_project).map_err(|err| {
        log::error!("Failed to create project: {err}");
        err.into()
    })
}

pub fn update_project<R>(
    repo: &R,
    user: &AuthenticatedUser,
    project_id: i32,
    form: ProjectForm,
) -> ServiceResult<Project>
where
    R: ProjectWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let project_id = ProjectId::new(project_id)?;
    let updates = UpdateProject::try_from(form)?;

    repo.update_project(project_id, organization_of(user)?, &updates)
        .map_err(|err| {
            log::error!("Failed to update project {project_id}: {err}");
            err.into()
        })
}

/// Work orders of the project stay, without the project link.
pub fn delete_project<R>(repo: &R, user: &AuthenticatedUser, project_id: i32) -> ServiceResult<()>
where
    R: ProjectWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let project_id = ProjectId::new(project_id)?;
    repo.delete_project(project_id, organization_of(user)?)
        .map_err(|err| {
            log::error!("Failed to delete project {project_id}: {err}");
            err.into()
        })
}
