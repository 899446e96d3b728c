use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::technicians::TechnicianForm;
use crate::repository::DieselRepository;
use crate::routes::{created_json, no_content, ok_json};
use crate::services::technicians as technicians_service;

#[get("/technicians")]
pub async fn list_technicians(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(technicians_service::list_technicians(repo.get_ref(), &user))
}

#[post("/technicians")]
pub async fn create_technician(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<TechnicianForm>,
) -> impl Responder {
    created_json(technicians_service::create_technician(
        repo.get_ref(),
        &user,
        form,
    ))
}

#[get("/technicians/{technician_id}")]
pub async fn get_technician(
    technician_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(technicians_service::get_technician(
        repo.get_ref(),
        &user,
        technician_id.into_inner(),
    ))
}

#[put("/technicians/{technician_id}")]
pub async fn update_technician(
    technician_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<TechnicianForm>,
) -> impl Responder {
    ok_json(technicians_service::update_technician(
        repo.get_ref(),
        &user,
        technician_id.into_inner(),
        form,
    ))
}

#[delete("/technicians/{technician_id}")]
pub async fn delete_technician(
    technician_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(technicians_service::delete_technician(
        repo.get_ref(),
        &user,
        technician_id.into_inner(),
    ))
}
