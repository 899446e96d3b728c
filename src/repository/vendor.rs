use diesel::prelude::*;

use crate::domain::types::{OrganizationId, VendorId};
use crate::domain::vendor::{NewVendor, UpdateVendor, Vendor};
use crate::models::vendor::{
    NewVendor as DbNewVendor, UpdateVendor as DbUpdateVendor, Vendor as DbVendor,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, VendorReader, VendorWriter};
use crate::schema::{chemical_prices, vendors};

impl VendorReader for DieselRepository {
    fn get_vendor_by_id(
        &self,
        id: VendorId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Vendor>> {
        let mut conn = self.conn()?;
        let vendor = vendors::table
            .filter(vendors::id.eq(id.get()))
            .filter(vendors::organization_id.eq(organization_id.get()))
            .first::<DbVendor>(&mut conn)
            .optional()?;

        Ok(vendor.map(Vendor::try_from).transpose()?)
    }

    fn list_vendors(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<Vendor>> {
        let mut conn = self.conn()?;
        let vendors = vendors::table
            .filter(vendors::organization_id.eq(organization_id.get()))
            .order(vendors::name.asc())
            .load::<DbVendor>(&mut conn)?;

        Ok(vendors
            .into_iter()
            .map(Vendor::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl VendorWriter for DieselRepository {
    fn create_vendor(&self, new_vendor: &NewVendor) -> RepositoryResult<Vendor> {
        let mut conn = self.conn()?;
        let vendor = diesel::insert_into(vendors::table)
            .values(DbNewVendor::from(new_vendor))
            .get_result::<DbVendor>(&mut conn)?;

        Ok(vendor.try_into()?)
    }

    fn update_vendor(
        &self,
        id: VendorId,
        organization_id: OrganizationId,
        updates: &UpdateVendor,
    ) -> RepositoryResult<Vendor> {
        let mut conn = self.conn()?;
        let vendor = diesel::update(
            vendors::table
                .filter(vendors::id.eq(id.get()))
                .filter(vendors::organization_id.eq(organization_id.get())),
        )
        .set(DbUpdateVendor::from(updates))
        .get_result::<DbVendor>(&mut conn)?;

        Ok(vendor.try_into()?)
    }

    fn delete_vendor(&self, id: VendorId, organization_id: OrganizationId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            diesel::delete(
                chemical_prices::table
                    .filter(chemical_prices::organization_id.eq(organization_id.get()))
                    .filter(chemical_prices::vendor_id.eq(id.get())),
            )
            .execute(conn)?;

            let deleted = diesel::delete(
                vendors::table
                    .filter(vendors::id.eq(id.get()))
                    .filter(vendors::organization_id.eq(organization_id.get())),
            )
            .execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }
}
