use diesel::prelude::*;

use crate::domain::technician::{NewTechnician, Technician, UpdateTechnician};
use crate::domain::types::{OrganizationId, TechnicianId, UserId};
use crate::models::technician::{
    NewTechnician as DbNewTechnician, Technician as DbTechnician,
    UpdateTechnician as DbUpdateTechnician,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, TechnicianReader, TechnicianWriter};
use crate::schema::{technicians, work_orders};

impl TechnicianReader for DieselRepository {
    fn get_technician_by_id(
        &self,
        id: TechnicianId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Technician>> {
        let mut conn = self.conn()?;
        let technician = technicians::table
            .filter(technicians::id.eq(id.get()))
            .filter(technicians::organization_id.eq(organization_id.get()))
            .first::<DbTechnician>(&mut conn)
            .optional()?;

        Ok(technician.map(Technician::try_from).transpose()?)
    }

    fn get_technician_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Technician>> {
        let mut conn = self.conn()?;
        let technician = technicians::table
            .filter(technicians::user_id.eq(user_id.get()))
            .first::<DbTechnician>(&mut conn)
            .optional()?;

        Ok(technician.map(Technician::try_from).transpose()?)
    }

    fn list_technicians(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<Technician>> {
        let mut conn = self.conn()?;
        let technicians = technicians::table
            .filter(technicians::organization_id.eq(organization_id.get()))
            .order((technicians::is_active.desc(), technicians::name.asc()))
            .load::<DbTechnician>(&mut conn)?;

        Ok(technicians
            .into_iter()
            .map(Technician::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl TechnicianWriter for DieselRepository {
    fn create_technician(&self, new_technician: &NewTechnician) -> RepositoryResult<Technician> {
        let mut conn = self.conn()?;
        let technician = diesel::insert_into(technicians::table)
            .values(DbNewTechnician::from(new_technician))
            .get_result::<DbTechnician>(&mut conn)?;

        Ok(technician.try_into()?)
    }

    fn update_technician(
        &self,
        id: TechnicianId,
        organization_id: OrganizationId,
        updates: &UpdateTechnician,
    ) -> RepositoryResult<Technician> {
        let mut conn = self.conn()?;
        let technician = diesel::update(
            technicians::table
                .filter(technicians::id.eq(id.get()))
                .filter(technicians::organization_id.eq(organization_id.get())),
        )
        .set(DbUpdateTechnician::from(updates))
        .get_result::<DbTechnician>(&mut conn)?;

        Ok(technician.try_into()?)
    }

    fn delete_technician(
        &self,
        id: TechnicianId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            diesel::update(
                work_orders::table
                    .filter(work_orders::organization_id.eq(organization_id.get()))
                    .filter(work_orders::technician_id.eq(id.get())),
            )
            .set(work_orders::technician_id.eq(None::<i32>))
            .execute(conn)?;

            let deleted = diesel::delete(
                technicians::table
                    .filter(technicians::id.eq(id.get()))
                    .filter(technicians::organization_id.eq(organization_id.get())),
            )
            .execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }
}
