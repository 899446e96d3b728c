use actix_web::{Responder, delete, get, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::invoices::InvoicesQuery;
use crate::forms::invoices::{
    CreateInvoiceForm, InvoiceFromWorkOrdersForm, InvoiceItemsForm, InvoiceStatusForm,
};
use crate::repository::DieselRepository;
use crate::routes::{created_json, no_content, ok_json};
use crate::services::invoices as invoices_service;

#[get("/invoices")]
pub async fn list_invoices(
    params: web::Query<InvoicesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(invoices_service::list_invoices(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/invoices")]
pub async fn create_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateInvoiceForm>,
) -> impl Responder {
    created_json(invoices_service::create_invoice(repo.get_ref(), &user, form))
}

#[post("/invoices/from-work-orders")]
pub async fn create_invoice_from_work_orders(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<InvoiceFromWorkOrdersForm>,
) -> impl Responder {
    created_json(invoices_service::create_invoice_from_work_orders(
        repo.get_ref(),
        &user,
        form,
    ))
}

#[get("/invoices/{invoice_id}")]
pub async fn get_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(invoices_service::get_invoice(
        repo.get_ref(),
        &user,
        invoice_id.into_inner(),
    ))
}

#[put("/invoices/{invoice_id}/items")]
pub async fn replace_invoice_items(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<InvoiceItemsForm>,
) -> impl Responder {
    ok_json(invoices_service::replace_invoice_items(
        repo.get_ref(),
        &user,
        invoice_id.into_inner(),
        form,
    ))
}

#[post("/invoices/{invoice_id}/status")]
pub async fn update_invoice_status(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<InvoiceStatusForm>,
) -> impl Responder {
    ok_json(invoices_service::update_invoice_status(
        repo.get_ref(),
        &user,
        invoice_id.into_inner(),
        form,
    ))
}

#[delete("/invoices/{invoice_id}")]
pub async fn delete_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(invoices_service::delete_invoice(
        repo.get_ref(),
        &user,
        invoice_id.into_inner(),
    ))
}
