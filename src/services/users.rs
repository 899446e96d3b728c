use crate::domain::auth::{AuthenticatedUser, SERVICE_ADMIN_ROLE};
use crate::domain::types::{UserId, UserRole};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::forms::users::{CreateUserForm, UpdateUserForm};
use crate::password::hash_password;
use crate::repository::{UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, organization_of};

pub fn list_users<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<User>>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;
    Ok(repo.list_users(organization_of(user)?)?)
}

pub fn create_user<R>(repo: &R, user: &AuthenticatedUser, form: CreateUserForm) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let payload = form.into_payload(organization_of(user)?)?;
    if repo.get_user_by_email(&payload.email)?.is_some() {
        return Err(ServiceError::Conflict(
            "email is already registered".to_string(),
        ));
    }

    let password_hash = payload
        .password
        .as_ref()
        .map(hash_password)
        .transpose()
        .map_err(|err| ServiceError::Internal(err.to_string()))?;

    let new_user = NewUser::new(
        payload.organization_id,
        payload.email,
        payload.name,
        password_hash,
        payload.role,
    );

    repo.create_user(&new_user)
        .map_err(|err| {
            log::error!("Failed to create user: {err}");
            err.into()
        })
}

/// Updates another user. Admins cannot demote or deactivate themselves.
pub fn update_user<R>(
    repo: &R,
    user: &AuthenticatedUser,
    user_id: i32,
    form: UpdateUserForm,
) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let user_id = UserId::new(user_id)?;
    let updates = UpdateUser::try_from(form)?;

    if user_id == user.user_id()? && (updates.role != UserRole::Admin || !updates.is_active) {
        return Err(ServiceError::Conflict(
            "admins cannot demote or deactivate themselves".to_string(),
        ));
    }

    repo.update_user(user_id, organization_of(user)?, &updates)
        .map_err(|err| {
            log::error!("Failed to update user {user_id}: {err}");
            err.into()
        })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{EmailAddress, PersonName};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn stored(id: i32, role: UserRole) -> User {
        User {
            id: UserId::new(id).unwrap(),
            organization_id: org(),
            email: EmailAddress::new(format!("user{id}@pools.test")).unwrap(),
            name: PersonName::new(format!("User {id}")).unwrap(),
            password_hash: None,
            google_sub: None,
            role,
            is_active: true,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    #[test]
    fn only_admins_manage_users() {
        let mut repo = MockRepository::new();
        repo.expect_list_users().times(0);

        assert!(matches!(
            list_users(&repo, &office()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn create_user_in_callers_organization() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_create_user()
            .withf(|new_user| {
                new_user.organization_id == org()
                    && new_user.role == UserRole::Technician
                    && new_user.password_hash.is_some()
            })
            .times(1)
            .returning(|_| Ok(stored(5, UserRole::Technician)));

        let form = CreateUserForm {
            email: "tech@pools.test".to_string(),
            name: "Sam".to_string(),
            role: UserRole::Technician,
            password: Some("skimmer-basket".to_string()),
        };

        let created = create_user(&repo, &admin(), form).expect("user created");
        assert_eq!(created.id.get(), 5);
    }

    #[test]
    fn admin_cannot_demote_themselves() {
        let mut repo = MockRepository::new();
        repo.expect_update_user().times(0);

        let form = UpdateUserForm {
            name: "Admin".to_string(),
            role: UserRole::Office,
            is_active: true,
        };

        assert!(matches!(
            update_user(&repo, &admin(), 1, form),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn admin_can_deactivate_others() {
        let mut repo = MockRepository::new();
        repo.expect_update_user()
            .withf(|id, organization_id, updates| {
                id.get() == 2 && *organization_id == org() && !updates.is_active
            })
            .times(1)
            .returning(|_, _, _| {
                let mut user = stored(2, UserRole::Office);
                user.is_active = false;
                Ok(user)
            });

        let form = UpdateUserForm {
            name: "Office".to_string(),
            role: UserRole::Office,
            is_active: false,
        };

        let updated = update_user(&repo, &admin(), 2, form).expect("updated");
        assert!(!updated.is_active);
    }
}
