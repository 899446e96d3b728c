use actix_web::{Responder, delete, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::chemical_prices::ChemicalPricesQuery;
use crate::forms::chemical_prices::ChemicalPriceForm;
use crate::repository::DieselRepository;
use crate::routes::{created_json, no_content, ok_json};
use crate::services::chemical_prices as chemical_prices_service;

#[get("/chemical-prices")]
pub async fn list_chemical_prices(
    params: web::Query<ChemicalPricesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(chemical_prices_service::list_chemical_prices(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

/// Cheapest current offer per chemical.
#[get("/chemical-prices/best")]
pub async fn best_chemical_prices(
    params: web::Query<ChemicalPricesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    ok_json(chemical_prices_service::best_chemical_prices(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/chemical-prices")]
pub async fn create_chemical_price(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ChemicalPriceForm>,
) -> impl Responder {
    created_json(chemical_prices_service::create_chemical_price(
        repo.get_ref(),
        &user,
        form,
    ))
}

#[delete("/chemical-prices/{price_id}")]
pub async fn delete_chemical_price(
    price_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(chemical_prices_service::delete_chemical_price(
        repo.get_ref(),
        &user,
        price_id.into_inner(),
    ))
}
