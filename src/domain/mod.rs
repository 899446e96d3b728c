//! Domain aggregates exposed by the service layer.

pub mod auth;
pub mod chemical_price;
pub mod client;
pub mod communication_provider;
pub mod dashboard;
pub mod invoice;
pub mod organization;
pub mod project;
pub mod technician;
pub mod types;
pub mod user;
pub mod vendor;
pub mod work_order;
