use chrono::Utc;
use diesel::prelude::*;

use crate::domain::types::{EmailAddress, OrganizationId, UserId};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::models::user::{NewUser as DbNewUser, UpdateUser as DbUpdateUser, User as DbUser};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserReader, UserWriter};
use crate::schema::users;

impl UserReader for DieselRepository {
    fn get_user_by_id(
        &self,
        id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::id.eq(id.get()))
            .filter(users::organization_id.eq(organization_id.get()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(User::try_from).transpose()?)
    }

    fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::email.eq(email.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(User::try_from).transpose()?)
    }

    fn get_user_by_google_sub(&self, google_sub: &str) -> RepositoryResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::google_sub.eq(google_sub))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(User::try_from).transpose()?)
    }

    fn list_users(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<User>> {
        let mut conn = self.conn()?;
        let users = users::table
            .filter(users::organization_id.eq(organization_id.get()))
            .order(users::name.asc())
            .load::<DbUser>(&mut conn)?;

        Ok(users
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let mut conn = self.conn()?;
        let user = diesel::insert_into(users::table)
            .values(DbNewUser::from(new_user))
            .get_result::<DbUser>(&mut conn)?;

        Ok(user.try_into()?)
    }

    fn update_user(
        &self,
        id: UserId,
        organization_id: OrganizationId,
        updates: &UpdateUser,
    ) -> RepositoryResult<User> {
        let mut conn = self.conn()?;
        let changes = DbUpdateUser::from_domain(updates, Utc::now().naive_utc());
        let user = diesel::update(
            users::table
                .filter(users::id.eq(id.get()))
                .filter(users::organization_id.eq(organization_id.get())),
        )
        .set(&changes)
        .get_result::<DbUser>(&mut conn)?;

        Ok(user.try_into()?)
    }

    fn update_user_password(&self, id: UserId, password_hash: &str) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(users::table.find(id.get()))
            .set((
                users::password_hash.eq(Some(password_hash)),
                users::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn activate_user(&self, id: UserId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::update(users::table.find(id.get()))
            .set((
                users::is_active.eq(true),
                users::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn link_google_account(&self, id: UserId, google_sub: &str) -> RepositoryResult<User> {
        let mut conn = self.conn()?;
        let user = diesel::update(users::table.find(id.get()))
            .set((
                users::google_sub.eq(Some(google_sub)),
                users::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbUser>(&mut conn)?;

        Ok(user.try_into()?)
    }
}
