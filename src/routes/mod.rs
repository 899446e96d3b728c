//! JSON handlers mounted under `/api`.

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, error, web};
use serde::Serialize;
use serde_json::json;

use crate::services::{ServiceError, ServiceResult};

pub mod auth;
pub mod chemical_prices;
pub mod clients;
pub mod communication_providers;
pub mod dashboard;
pub mod invoices;
pub mod projects;
pub mod technicians;
pub mod users;
pub mod vendors;
pub mod work_orders;

pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Unauthorized => StatusCode::FORBIDDEN,
        ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Form(_) | ServiceError::TypeConstraint(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ServiceError::Conflict(_) | ServiceError::InvalidTransition(_) => StatusCode::CONFLICT,
        ServiceError::Repository(_) | ServiceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn error_body(message: impl Into<String>) -> serde_json::Value {
    json!({ "error": message.into() })
}

/// Maps a service failure to its status and a JSON body. Storage details are
/// logged, not returned.
pub fn error_response(err: ServiceError) -> HttpResponse {
    let status = status_for(&err);
    let message = if status.is_server_error() {
        log::error!("Request failed: {err}");
        "internal server error".to_string()
    } else {
        err.to_string()
    };
    HttpResponse::build(status).json(error_body(message))
}

pub fn ok_json<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => error_response(err),
    }
}

pub fn created_json<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Created().json(body),
        Err(err) => error_response(err),
    }
}

pub fn no_content(result: ServiceResult<()>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

/// Undecodable JSON bodies become 422 with the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
            let response =
                HttpResponse::UnprocessableEntity().json(error_body(err.to_string()));
            InternalError::from_response(err, response).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(
        |err: error::QueryPayloadError, _req: &HttpRequest| {
            let response =
                HttpResponse::UnprocessableEntity().json(error_body(err.to_string()));
            InternalError::from_response(err, response).into()
        },
    )
}

/// Registers every API handler under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(auth::change_password)
            .service(auth::google_start)
            .service(auth::google_callback)
            .service(users::list_users)
            .service(users::create_user)
            .service(users::update_user)
            .service(clients::list_clients)
            .service(clients::create_client)
            .service(clients::upload_clients)
            .service(clients::get_client)
            .service(clients::update_client)
            .service(clients::delete_client)
            .service(technicians::list_technicians)
            .service(technicians::create_technician)
            .service(technicians::get_technician)
            .service(technicians::update_technician)
            .service(technicians::delete_technician)
            .service(projects::list_projects)
            .service(projects::create_project)
            .service(projects::get_project)
            .service(projects::update_project)
            .service(projects::delete_project)
            .service(work_orders::list_work_orders)
            .service(work_orders::create_work_order)
            .service(work_orders::get_work_order)
            .service(work_orders::update_work_order)
            .service(work_orders::delete_work_order)
            .service(work_orders::transition_work_order)
            .service(work_orders::schedule)
            .service(invoices::list_invoices)
            .service(invoices::create_invoice)
            .service(invoices::create_invoice_from_work_orders)
            .service(invoices::get_invoice)
            .service(invoices::replace_invoice_items)
            .service(invoices::update_invoice_status)
            .service(invoices::delete_invoice)
            .service(vendors::list_vendors)
            .service(vendors::create_vendor)
            .service(vendors::get_vendor)
            .service(vendors::update_vendor)
            .service(vendors::delete_vendor)
            .service(chemical_prices::best_chemical_prices)
            .service(chemical_prices::list_chemical_prices)
            .service(chemical_prices::create_chemical_price)
            .service(chemical_prices::delete_chemical_price)
            .service(communication_providers::list_providers)
            .service(communication_providers::create_provider)
            .service(communication_providers::get_provider)
            .service(communication_providers::update_provider)
            .service(communication_providers::delete_provider)
            .service(dashboard::dashboard),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryError;

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(status_for(&ServiceError::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&ServiceError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&ServiceError::TypeConstraint("bad".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ServiceError::InvalidTransition("no".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ServiceError::Repository(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_hidden() {
        let response = error_response(ServiceError::Internal("disk on fire".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
