use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::communication_providers::{CreateProviderForm, ProviderForm};
use crate::repository::DieselRepository;
use crate::routes::{created_json, no_content, ok_json};
use crate::services::communication_providers as providers_service;

#[get("/communication-providers")]
pub async fn list_providers(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(providers_service::list_providers(repo.get_ref(), &user))
}

#[post("/communication-providers")]
pub async fn create_provider(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateProviderForm>,
) -> impl Responder {
    created_json(providers_service::create_provider(repo.get_ref(), &user, form))
}

#[get("/communication-providers/{provider_id}")]
pub async fn get_provider(
    provider_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(providers_service::get_provider(
        repo.get_ref(),
        &user,
        provider_id.into_inner(),
    ))
}

#[put("/communication-providers/{provider_id}")]
pub async fn update_provider(
    provider_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ProviderForm>,
) -> impl Responder {
    ok_json(providers_service::update_provider(
        repo.get_ref(),
        &user,
        provider_id.into_inner(),
        form,
    ))
}

#[delete("/communication-providers/{provider_id}")]
pub async fn delete_provider(
    provider_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(providers_service::delete_provider(
        repo.get_ref(),
        &user,
        provider_id.into_inner(),
    ))
}
