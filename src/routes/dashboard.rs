use actix_web::{Responder, get, web};

use crate::domain::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::ok_json;
use crate::services::dashboard as dashboard_service;

#[get("/dashboard")]
pub async fn dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(dashboard_service::dashboard(repo.get_ref(), &user))
}
