//! Database repair operations run by operators through `pool-admin`.
//!
//! These bypass role checks: whoever can run the binary can reach the
//! database directly anyway.

use crate::domain::client::{EmailCleanupPlan, plan_email_merges};
use crate::domain::types::{EmailAddress, OrganizationId, Password};
use crate::domain::user::User;
use crate::password::hash_password;
use crate::repository::{ClientReader, ClientWriter, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Normalizes stored client emails and merges clients sharing an email
/// within an organization. With `dry_run` only the plan is computed.
pub fn dedupe_emails<R>(
    repo: &R,
    organization_id: Option<OrganizationId>,
    dry_run: bool,
) -> ServiceResult<EmailCleanupPlan>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    let records = repo.list_client_email_records(organization_id)?;
    let plan = plan_email_merges(&records);

    for id in &plan.invalid {
        log::warn!("Client {id} has an unparseable email, leaving it as is");
    }
    if dry_run || plan.is_empty() {
        return Ok(plan);
    }

    let mut removed = 0;
    for merge in &plan.merges {
        removed += repo.merge_clients(merge).map_err(|err| {
            log::error!("Failed to merge clients into {}: {err}", merge.keep);
            err
        })?;
    }
    for (id, email) in &plan.normalize {
        repo.update_client_email(*id, email).map_err(|err| {
            log::error!("Failed to normalize email of client {id}: {err}");
            err
        })?;
    }

    log::info!(
        "Merged {removed} duplicate clients and normalized {} emails",
        plan.normalize.len()
    );
    Ok(plan)
}

/// Sets a new password for the user with `email` and reactivates them.
pub fn reset_password<R>(repo: &R, email: &str, password: &str) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let email = EmailAddress::new(email)?;
    let password = Password::new(password)?;

    let user = repo
        .get_user_by_email(&email)?
        .ok_or(ServiceError::NotFound)?;
    let password_hash =
        hash_password(&password).map_err(|err| ServiceError::Internal(err.to_string()))?;

    repo.update_user_password(user.id, &password_hash)?;
    if !user.is_active {
        repo.activate_user(user.id)?;
        log::info!("Reactivated user {}", user.email);
    }
    log::info!("Password reset for user {}", user.email);

    Ok(User {
        password_hash: Some(password_hash),
        is_active: true,
        ..user
    })
}
