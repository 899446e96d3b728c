use actix_multipart::form::MultipartForm;
use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::clients::ClientsQuery;
use crate::forms::clients::{ClientForm, UploadClientsForm};
use crate::repository::DieselRepository;
use crate::routes::{created_json, no_content, ok_json};
use crate::services::clients as clients_service;

#[get("/clients")]
pub async fn list_clients(
    params: web::Query<ClientsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(clients_service::list_clients(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/clients")]
pub async fn create_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ClientForm>,
) -> impl Responder {
    created_json(clients_service::create_client(repo.get_ref(), &user, form))
}

/// Bulk import from a multipart `csv` field.
#[post("/clients/upload")]
pub async fn upload_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadClientsForm>,
) -> impl Responder {
    ok_json(clients_service::upload_clients(repo.get_ref(), &user, &form))
}

#[get("/clients/{client_id}")]
pub async fn get_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(clients_service::get_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
    ))
}

#[put("/clients/{client_id}")]
pub async fn update_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ClientForm>,
) -> impl Responder {
    ok_json(clients_service::update_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
        form,
    ))
}

#[delete("/clients/{client_id}")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(clients_service::delete_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
    ))
}
