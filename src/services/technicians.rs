use crate::domain::auth::{AuthenticatedUser, SERVICE_ACCESS_ROLE, SERVICE_OFFICE_ROLE};
use crate::domain::technician::Technician;
use crate::domain::types::{OrganizationId, TechnicianId, UserId};
use crate::forms::technicians::{TechnicianForm, TechnicianPayload};
use crate::repository::{TechnicianReader, TechnicianWriter, UserReader};
use crate::services::{ServiceError, ServiceResult, ensure_role, organization_of};

pub fn list_technicians<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Technician>>
where
    R: TechnicianReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    Ok(repo.list_technicians(organization_of(user)?)?)
}

pub fn get_technician<R>(
    repo: &R,
    user: &AuthenticatedUser,
    technician_id: i32,
) -> ServiceResult<Technician>
where
    R: TechnicianReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;
    repo.get_technician_by_id(TechnicianId::new(technician_id)?, organization_of(user)?)?
        .ok_or(ServiceError::NotFound)
}

/// A linked user must belong to the organization and not be linked to
/// another technician.
fn check_linked_user<R>(
    repo: &R,
    user_id: Option<UserId>,
    organization_id: OrganizationId,
    technician_id: Option<TechnicianId>,
) -> ServiceResult<()>
where
    R: TechnicianReader + UserReader + ?Sized,
{
    let Some(user_id) = user_id else {
        return Ok(());
    };

    if repo.get_user_by_id(user_id, organization_id)?.is_none() {
        return Err(ServiceError::Form(format!(
            "user {user_id} does not belong to the organization"
        )));
    }

    match repo.get_technician_by_user(user_id)? {
        Some(existing) if Some(existing.id) != technician_id => Err(ServiceError::Conflict(
            format!("user {user_id} is already linked to technician {}", existing.id),
        )),
        _ => Ok(()),
    }
}

pub fn create_technician<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: TechnicianForm,
) -> ServiceResult<Technician>
where
    R: TechnicianReader + TechnicianWriter + UserReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let payload = TechnicianPayload::try_from(form)?;
    check_linked_user(repo, payload.user_id, organization_id, None)?;

    repo.create_technician(&payload.into_new_technician(organization_id))
        .map_err(|err| {
            log::error!("Failed to create technician: {err}");
            err.into()
        })
}

pub fn update_technician<R>(
    repo: &R,
    user: &AuthenticatedUser,
    technician_id: i32,
    form: TechnicianForm,
) -> ServiceResult<Technician>
where
    R: TechnicianReader + TechnicianWriter + UserReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let technician_id = TechnicianId::new(technician_id)?;
    let payload = TechnicianPayload::try_from(form)?;
    check_linked_user(repo, payload.user_id, organization_id, Some(technician_id))?;

    repo.update_technician(technician_id, organization_id, &payload.into_update())
        .map_err(|err| {
            log::error!("Failed to update technician {technician_id}: {err}");
            err.into()
        })
}

/// Assigned work orders become unassigned.
pub fn delete_technician<R>(
    repo: &R,
    user: &AuthenticatedUser,
    technician_id: i32,
) -> ServiceResult<()>
where
    R: TechnicianWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let technician_id = TechnicianId::new(technician_id)?;
    repo.delete_technician(technician_id, organization_of(user)?)
        .map_err(|err| {
            log::error!("Failed to delete technician {technician_id}: {err}");
            err.into()
        })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{EmailAddress, PersonName, UserRole};
    use crate::domain::user::User;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn form(user_id: Option<i32>) -> TechnicianForm {
        TechnicianForm {
            user_id,
            name: "Sam Ortiz".to_string(),
            email: None,
            phone: None,
            hourly_rate: 3500,
            is_active: true,
        }
    }

    fn tech_account() -> User {
        User {
            id: UserId::new(3).unwrap(),
            organization_id: org(),
            email: EmailAddress::new("sam@pools.test").unwrap(),
            name: PersonName::new("Sam").unwrap(),
            password_hash: None,
            google_sub: None,
            role: UserRole::Technician,
            is_active: true,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    #[test]
    fn technicians_cannot_manage_technicians() {
        let mut repo = MockRepository::new();
        repo.expect_create_technician().times(0);

        assert!(matches!(
            create_technician(&repo, &technician_user(), form(None)),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn linked_user_must_be_in_the_organization() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .withf(|id, organization_id| id.get() == 77 && *organization_id == org())
            .returning(|_, _| Ok(None));
        repo.expect_create_technician().times(0);

        assert!(matches!(
            create_technician(&repo, &office(), form(Some(77))),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn user_cannot_be_linked_twice() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_, _| Ok(Some(tech_account())));
        repo.expect_get_technician_by_user()
            .returning(|_| Ok(Some(linked_technician(9))));
        repo.expect_create_technician().times(0);

        assert!(matches!(
            create_technician(&repo, &office(), form(Some(3))),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn relinking_the_same_technician_is_allowed() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_, _| Ok(Some(tech_account())));
        repo.expect_get_technician_by_user()
            .returning(|_| Ok(Some(linked_technician(9))));
        repo.expect_update_technician()
            .withf(|id, _, updates| id.get() == 9 && updates.user_id.map(|u| u.get()) == Some(3))
            .times(1)
            .returning(|_, _, _| Ok(linked_technician(9)));

        update_technician(&repo, &office(), 9, form(Some(3))).expect("updated");
    }
}
