use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::vendors::VendorForm;
use crate::repository::DieselRepository;
use crate::routes::{created_json, no_content, ok_json};
use crate::services::vendors as vendors_service;

#[get("/vendors")]
pub async fn list_vendors(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(vendors_service::list_vendors(repo.get_ref(), &user))
}

#[post("/vendors")]
pub async fn create_vendor(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<VendorForm>,
) -> impl Responder {
    created_json(vendors_service::create_vendor(repo.get_ref(), &user, form))
}

#[get("/vendors/{vendor_id}")]
pub async fn get_vendor(
    vendor_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(vendors_service::get_vendor(
        repo.get_ref(),
        &user,
        vendor_id.into_inner(),
    ))
}

#[put("/vendors/{vendor_id}")]
pub async fn update_vendor(
    vendor_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<VendorForm>,
) -> impl Responder {
    ok_json(vendors_service::update_vendor(
        repo.get_ref(),
        &user,
        vendor_id.into_inner(),
        form,
    ))
}

#[delete("/vendors/{vendor_id}")]
pub async fn delete_vendor(
    vendor_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(vendors_service::delete_vendor(
        repo.get_ref(),
        &user,
        vendor_id.into_inner(),
    ))
}
