use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::projects::ProjectsQuery;
use crate::forms::projects::{CreateProjectForm, ProjectForm};
use crate::repository::DieselRepository;
use crate::routes::{created_json, no_content, ok_json};
use crate::services::projects as projects_service;

#[get("/projects")]
pub async fn list_projects(
    params: web::Query<ProjectsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(projects_service::list_projects(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/projects")]
pub async fn create_project(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateProjectForm>,
) -> impl Responder {
    created_json(projects_service::create_project(repo.get_ref(), &user, form))
}

#[get("/projects/{project_id}")]
pub async fn get_project(
    project_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(projects_service::get_project(
        repo.get_ref(),
        &user,
        project_id.into_inner(),
    ))
}

#[put("/projects/{project_id}")]
pub async fn update_project(
    project_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ProjectForm>,
) -> impl Responder {
    ok_json(projects_service::update_project(
        repo.get_ref(),
        &user,
        project_id.into_inner(),
        form,
    ))
}

#[delete("/projects/{project_id}")]
pub async fn delete_project(
    project_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(projects_service::delete_project(
        repo.get_ref(),
        &user,
        project_id.into_inner(),
    ))
}
