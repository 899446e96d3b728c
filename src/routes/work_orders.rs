use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::work_orders::{ScheduleQuery, WorkOrdersQuery};
use crate::forms::work_orders::{CreateWorkOrderForm, TransitionForm, WorkOrderForm};
use crate::repository::DieselRepository;
use crate::routes::{created_json, no_content, ok_json};
use crate::services::work_orders as work_orders_service;

#[get("/work-orders")]
pub async fn list_work_orders(
    params: web::Query<WorkOrdersQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(work_orders_service::list_work_orders(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/work-orders")]
pub async fn create_work_order(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateWorkOrderForm>,
) -> impl Responder {
    created_json(work_orders_service::create_work_order(
        repo.get_ref(),
        &user,
        form,
    ))
}

#[get("/work-orders/{work_order_id}")]
pub async fn get_work_order(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(work_orders_service::get_work_order(
        repo.get_ref(),
        &user,
        work_order_id.into_inner(),
    ))
}

#[put("/work-orders/{work_order_id}")]
pub async fn update_work_order(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<WorkOrderForm>,
) -> impl Responder {
    ok_json(work_orders_service::update_work_order(
        repo.get_ref(),
        &user,
        work_order_id.into_inner(),
        form,
    ))
}

#[delete("/work-orders/{work_order_id}")]
pub async fn delete_work_order(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(work_orders_service::delete_work_order(
        repo.get_ref(),
        &user,
        work_order_id.into_inner(),
    ))
}

/// Moves a work order through its lifecycle; completing a recurring one
/// also schedules the next visit.
#[post("/work-orders/{work_order_id}/status")]
pub async fn transition_work_order(
    work_order_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<TransitionForm>,
) -> impl Responder {
    ok_json(work_orders_service::transition_work_order(
        repo.get_ref(),
        &user,
        work_order_id.into_inner(),
        form,
    ))
}

#[get("/schedule")]
pub async fn schedule(
    params: web::Query<ScheduleQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(work_orders_service::schedule(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}
