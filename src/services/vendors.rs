use crate::domain::auth::{AuthenticatedUser, SERVICE_OFFICE_ROLE};
use crate::domain::types::VendorId;
use crate::domain::vendor::{UpdateVendor, Vendor};
use crate::forms::vendors::VendorForm;
use crate::repository::{VendorReader, VendorWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, organization_of};

pub fn list_vendors<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Vendor>>
where
    R: VendorReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;
    Ok(repo.list_vendors(organization_of(user)?)?)
}

pub fn get_vendor<R>(repo: &R, user: &AuthenticatedUser, vendor_id: i32) -> ServiceResult<Vendor>
where
    R: VendorReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;
    repo.get_vendor_by_id(VendorId::new(vendor_id)?, organization_of(user)?)?
        .ok_or(ServiceError::NotFound)
}

/// Vendor names are unique within an organization.
pub fn create_vendor<R>(repo: &R, user: &AuthenticatedUser, form: VendorForm) -> ServiceResult<Vendor>
where
    R: VendorWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let new_vendor = form.into_new_vendor(organization_of(user)?)?;
    repo.create_vendor(&new_vendor).map_err(|err| {
        log::error!("Failed to create vendor: {err}");
        err.into()
    })
}

pub fn update_vendor<R>(
    repo: &R,
    user: &AuthenticatedUser,
    vendor_id: i32,
    form: VendorForm,
) -> ServiceResult<Vendor>
where
    R: VendorWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let vendor_id = VendorId::new(vendor_id)?;
    let updates = UpdateVendor::try_from(form)?;
    repo.update_vendor(vendor_id, organization_of(user)?, &updates)
        .map_err(|err| {
            log::error!("Failed to update vendor {vendor_id}: {err}");
            err.into()
        })
}

/// Removes the vendor together with its chemical prices.
pub fn delete_vendor<R>(repo: &R, user: &AuthenticatedUser, vendor_id: i32) -> ServiceResult<()>
where
    R: VendorWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let vendor_id = VendorId::new(vendor_id)?;
    repo.delete_vendor(vendor_id, organization_of(user)?)
        .map_err(|err| {
            log::error!("Failed to delete vendor {vendor_id}: {err}");
            err.into()
        })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn form(name: &str) -> VendorForm {
        VendorForm {
            name: name.to_string(),
            ..VendorForm::default()
        }
    }

    #[test]
    fn duplicate_names_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_create_vendor()
            .withf(|new_vendor| new_vendor.organization_id == org())
            .returning(|_| {
                Err(RepositoryError::ConstraintViolation(
                    "UNIQUE constraint failed: vendors.organization_id, vendors.name".to_string(),
                ))
            });

        assert!(matches!(
            create_vendor(&repo, &office(), form("PoolCorp")),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn technicians_cannot_list_vendors() {
        let mut repo = MockRepository::new();
        repo.expect_list_vendors().times(0);

        assert!(matches!(
            list_vendors(&repo, &technician_user()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn missing_vendor_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_update_vendor()
            .returning(|_, _, _| Err(RepositoryError::NotFound));

        assert!(matches!(
            update_vendor(&repo, &office(), 12, form("PoolCorp")),
            Err(ServiceError::NotFound)
        ));
    }
}
