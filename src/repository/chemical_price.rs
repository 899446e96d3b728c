use diesel::prelude::*;

use crate::domain::chemical_price::{ChemicalPrice, NewChemicalPrice};
use crate::domain::types::{ChemicalPriceId, OrganizationId};
use crate::models::chemical_price::{
    ChemicalPrice as DbChemicalPrice, NewChemicalPrice as DbNewChemicalPrice,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ChemicalPriceListQuery, ChemicalPriceReader, ChemicalPriceWriter, DieselRepository,
    contains_pattern,
};
use crate::schema::chemical_prices;

impl ChemicalPriceReader for DieselRepository {
    fn list_chemical_prices(
        &self,
        query: ChemicalPriceListQuery,
    ) -> RepositoryResult<Vec<ChemicalPrice>> {
        let mut conn = self.conn()?;
        let mut items = chemical_prices::table
            .filter(chemical_prices::organization_id.eq(query.organization_id.get()))
            .into_boxed();

        if let Some(vendor_id) = query.vendor_id {
            items = items.filter(chemical_prices::vendor_id.eq(vendor_id.get()));
        }
        if let Some(chemical) = query
            .chemical
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            items = items.filter(
                chemical_prices::chemical
                    .like(contains_pattern(chemical))
                    .escape('\\'),
            );
        }

        let prices = items
            .order((
                chemical_prices::chemical.asc(),
                chemical_prices::effective_on.desc(),
                chemical_prices::id.desc(),
            ))
            .load::<DbChemicalPrice>(&mut conn)?;

        Ok(prices
            .into_iter()
            .map(ChemicalPrice::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl ChemicalPriceWriter for DieselRepository {
    fn create_chemical_price(
        &self,
        new_price: &NewChemicalPrice,
    ) -> RepositoryResult<ChemicalPrice> {
        let mut conn = self.conn()?;
        let price = diesel::insert_into(chemical_prices::table)
            .values(DbNewChemicalPrice::from(new_price))
            .get_result::<DbChemicalPrice>(&mut conn)?;

        Ok(price.try_into()?)
    }

    fn delete_chemical_price(
        &self,
        id: ChemicalPriceId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            chemical_prices::table
                .filter(chemical_prices::id.eq(id.get()))
                .filter(chemical_prices::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
