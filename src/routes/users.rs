use actix_web::{Responder, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::users::{CreateUserForm, UpdateUserForm};
use crate::repository::DieselRepository;
use crate::routes::{created_json, ok_json};
use crate::services::users as users_service;

#[get("/users")]
pub async fn list_users(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(users_service::list_users(repo.get_ref(), &user))
}

#[post("/users")]
pub async fn create_user(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateUserForm>,
) -> impl Responder {
    created_json(users_service::create_user(repo.get_ref(), &user, form))
}

#[put("/users/{user_id}")]
pub async fn update_user(
    user_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateUserForm>,
) -> impl Responder {
    ok_json(users_service::update_user(
        repo.get_ref(),
        &user,
        user_id.into_inner(),
        form,
    ))
}
