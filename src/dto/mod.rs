//! Query parameters and response bodies of the JSON API.

pub mod auth;
pub mod chemical_prices;
pub mod clients;
pub mod communication_providers;
pub mod invoices;
pub mod projects;
pub mod work_orders;
