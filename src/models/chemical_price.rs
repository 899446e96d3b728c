use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::chemical_price::{
    ChemicalPrice as DomainChemicalPrice, NewChemicalPrice as DomainNewChemicalPrice,
};
use crate::domain::types::{
    Cents, ChemicalName, ChemicalPriceId, ChemicalUnit, OrganizationId, TypeConstraintError,
    VendorId,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::chemical_prices)]
pub struct ChemicalPrice {
    pub id: i32,
    pub organization_id: i32,
    pub vendor_id: i32,
    pub chemical: String,
    pub unit: String,
    pub price_cents: i64,
    pub effective_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::chemical_prices)]
pub struct NewChemicalPrice<'a> {
    pub organization_id: i32,
    pub vendor_id: i32,
    pub chemical: &'a str,
    pub unit: &'a str,
    pub price_cents: i64,
    pub effective_on: NaiveDate,
}

impl TryFrom<ChemicalPrice> for DomainChemicalPrice {
    type Error = TypeConstraintError;

    fn try_from(value: ChemicalPrice) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ChemicalPriceId::new(value.id)?,
            organization_id: OrganizationId::new(value.organization_id)?,
            vendor_id: VendorId::new(value.vendor_id)?,
            chemical: ChemicalName::new(value.chemical)?,
            unit: ChemicalUnit::new(value.unit)?,
            price: Cents::new(value.price_cents)?,
            effective_on: value.effective_on,
            created_at: value.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewChemicalPrice> for NewChemicalPrice<'a> {
    fn from(value: &'a DomainNewChemicalPrice) -> Self {
        Self {
            organization_id: value.organization_id.get(),
            vendor_id: value.vendor_id.get(),
            chemical: value.chemical.as_str(),
            unit: value.unit.as_str(),
            price_cents: value.price.get(),
            effective_on: value.effective_on,
        }
    }
}
