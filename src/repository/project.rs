use chrono::Utc;
use diesel::prelude::*;

use crate::domain::project::{NewProject, Project, UpdateProject};
use crate::domain::types::{ClientId, OrganizationId, ProjectId};
use crate::models::project::{
    NewProject as DbNewProject, Project as DbProject, UpdateProject as DbUpdateProject,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, ProjectReader, ProjectWriter};
use crate::schema::{projects, work_orders};

impl ProjectReader for DieselRepository {
    fn get_project_by_id(
        &self,
        id: ProjectId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Project>> {
        let mut conn = self.conn()?;
        let project = projects::table
            .filter(projects::id.eq(id.get()))
            .filter(projects::organization_id.eq(organization_id.get()))
            .first::<DbProject>(&mut conn)
            .optional()?;

        Ok(project.map(Project::try_from).transpose()?)
    }

    fn list_projects(
        &self,
        organization_id: OrganizationId,
        client_id: Option<ClientId>,
    ) -> RepositoryResult<Vec<Project>> {
        let mut conn = self.conn()?;
        let mut query = projects::table
            .filter(projects::organization_id.eq(organization_id.get()))
            .into_boxed();
        if let Some(client_id) = client_id {
            query = query.filter(projects::client_id.eq(client_id.get()));
        }

        let projects = query
            .order((projects::created_at.desc(), projects::id.desc()))
            .load::<DbProject>(&mut conn)?;

        Ok(projects
            .into_iter()
            .map(Project::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl ProjectWriter for DieselRepository {
    fn create_project(&self, new_project: &NewProject) -> RepositoryResult<Project> {
        let mut conn = self.conn()?;
        let project = diesel::insert_into(projects::table)
            .values(DbNewProject::from(new_project))
            .get_result::<DbProject>(&mut conn)?;

        Ok(project.try_into()?)
    }

    fn update_project(
        &self,
        id: ProjectId,
        organization_id: OrganizationId,
        updates: &UpdateProject,
    ) -> RepositoryResult<Project> {
        let mut conn = self.conn()?;
        let changes = DbUpdateProject::from_domain(updates, Utc::now().naive_utc());
        let project = diesel::update(
            projects::table
                .filter(projects::id.eq(id.get()))
                .filter(projects::organization_id.eq(organization_id.get())),
        )
        .set(&changes)
        .get_result::<DbProject>(&mut conn)?;

        Ok(project.try_into()?)
    }

    fn delete_project(
        &self,
        id: ProjectId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            diesel::update(
                work_orders::table
                    .filter(work_orders::organization_id.eq(organization_id.get()))
                    .filter(work_orders::project_id.eq(id.get())),
            )
            .set(work_orders::project_id.eq(None::<i32>))
            .execute(conn)?;

            let deleted = diesel::delete(
                projects::table
                    .filter(projects::id.eq(id.get()))
                    .filter(projects::organization_id.eq(organization_id.get())),
            )
            .execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }
}
