use crate::domain::auth::{AuthenticatedUser, SERVICE_OFFICE_ROLE};
use crate::domain::dashboard::DashboardStats;
use crate::repository::DashboardReader;
use crate::services::{ServiceResult, ensure_role, organization_of, today};

pub fn dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<DashboardStats>
where
    R: DashboardReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    repo.dashboard_stats(organization_of(user)?, today())
        .map_err(|err| {
            log::error!("Failed to load dashboard: {err}");
            err.into()
        })
}
