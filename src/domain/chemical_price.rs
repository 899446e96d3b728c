//! Chemical price quotes collected from vendors.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Cents, ChemicalName, ChemicalPriceId, ChemicalUnit, OrganizationId, VendorId,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChemicalPrice {
    pub id: ChemicalPriceId,
    pub organization_id: OrganizationId,
    pub vendor_id: VendorId,
    pub chemical: ChemicalName,
    pub unit: ChemicalUnit,
    pub price: Cents,
    pub effective_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewChemicalPrice {
    pub organization_id: OrganizationId,
    pub vendor_id: VendorId,
    pub chemical: ChemicalName,
    pub unit: ChemicalUnit,
    pub price: Cents,
    pub effective_on: NaiveDate,
}

/// Cheapest current quote for one chemical and unit.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct BestPrice {
    pub chemical: ChemicalName,
    pub unit: ChemicalUnit,
    pub vendor_id: VendorId,
    pub price: Cents,
    pub effective_on: NaiveDate,
    /// Number of vendors with a current quote.
    pub vendors_compared: usize,
}

/// Picks the cheapest current vendor quote for every chemical/unit pair.
///
/// Only quotes effective on or before `today` count, and only the most recent
/// one per vendor. Chemical and unit names are compared case-insensitively.
/// Ties go to the vendor with the lowest id.
pub fn best_prices(prices: &[ChemicalPrice], today: NaiveDate) -> Vec<BestPrice> {
    let mut current: BTreeMap<(String, String), HashMap<VendorId, &ChemicalPrice>> =
        BTreeMap::new();

    for price in prices.iter().filter(|p| p.effective_on <= today) {
        let key = (
            price.chemical.as_str().to_lowercase(),
            price.unit.as_str().to_lowercase(),
        );
        let per_vendor = current.entry(key).or_default();
        let newer = per_vendor.get(&price.vendor_id).is_none_or(|existing| {
            (existing.effective_on, existing.id) < (price.effective_on, price.id)
        });
        if newer {
            per_vendor.insert(price.vendor_id, price);
        }
    }

    current
        .into_values()
        .filter_map(|per_vendor| {
            let vendors_compared = per_vendor.len();
            per_vendor
                .into_values()
                .min_by_key(|p| (p.price, p.vendor_id))
                .map(|best| BestPrice {
                    chemical: best.chemical.clone(),
                    unit: best.unit.clone(),
                    vendor_id: best.vendor_id,
                    price: best.price,
                    effective_on: best.effective_on,
                    vendors_compared,
                })
        })
        .collect()
}
