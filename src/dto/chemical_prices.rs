use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ChemicalPricesQuery {
    pub vendor_id: Option<i32>,
    pub chemical: Option<String>,
}
