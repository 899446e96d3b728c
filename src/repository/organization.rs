use diesel::prelude::*;

use crate::domain::organization::{Organization, Registration};
use crate::domain::types::{OrganizationId, UserRole};
use crate::domain::user::{NewUser, User};
use crate::models::organization::{
    NewOrganization as DbNewOrganization, Organization as DbOrganization,
};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, OrganizationReader, OrganizationWriter};
use crate::schema::{organizations, users};

impl OrganizationReader for DieselRepository {
    fn get_organization_by_id(
        &self,
        id: OrganizationId,
    ) -> RepositoryResult<Option<Organization>> {
        let mut conn = self.conn()?;
        let organization = organizations::table
            .find(id.get())
            .first::<DbOrganization>(&mut conn)
            .optional()?;

        Ok(organization.map(Organization::try_from).transpose()?)
    }
}

impl OrganizationWriter for DieselRepository {
    fn register_organization(
        &self,
        registration: &Registration,
    ) -> RepositoryResult<(Organization, User)> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let organization: Organization = diesel::insert_into(organizations::table)
                .values(DbNewOrganization::from(&registration.organization))
                .get_result::<DbOrganization>(conn)?
                .try_into()?;

            let admin = NewUser::new(
                organization.id,
                registration.email.clone(),
                registration.name.clone(),
                Some(registration.password_hash.clone()),
                UserRole::Admin,
            );
            let user: User = diesel::insert_into(users::table)
                .values(DbNewUser::from(&admin))
                .get_result::<DbUser>(conn)?
                .try_into()?;

            Ok((organization, user))
        })
    }
}
