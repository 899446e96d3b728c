use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::chemical_price::NewChemicalPrice;
use crate::domain::types::{Cents, ChemicalName, ChemicalUnit, OrganizationId, VendorId};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct ChemicalPriceForm {
    pub vendor_id: i32,
    #[validate(length(min = 1, max = 128))]
    pub chemical: String,
    #[validate(length(min = 1, max = 32))]
    pub unit: String,
    /// Cents per unit.
    pub price: i64,
    pub effective_on: NaiveDate,
}

impl ChemicalPriceForm {
    pub fn into_new_price(
        self,
        organization_id: OrganizationId,
    ) -> Result<NewChemicalPrice, FormError> {
        self.validate()?;
        Ok(NewChemicalPrice {
            organization_id,
            vendor_id: VendorId::new(self.vendor_id)?,
            chemical: ChemicalName::new(self.chemical)?,
            unit: ChemicalUnit::new(self.unit)?,
            price: Cents::new(self.price)?,
            effective_on: self.effective_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_form_converts() {
        let form: ChemicalPriceForm = serde_json::from_str(
            r#"{"vendor_id":1,"chemical":" Liquid chlorine ","unit":"gallon","price":699,"effective_on":"2026-03-01"}"#,
        )
        .unwrap();
        let price = form.into_new_price(OrganizationId::new(1).unwrap()).unwrap();
        assert_eq!(price.chemical.as_str(), "Liquid chlorine");
        assert_eq!(price.price.get(), 699);
    }
}
