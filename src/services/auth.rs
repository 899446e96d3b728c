//! Registration, password sign-in and Google sign-in.

use crate::domain::auth::{AuthenticatedUser, OAuthProfile, SERVICE_ACCESS_ROLE};
use crate::domain::organization::Registration;
use crate::domain::types::{EmailAddress, Password};
use crate::domain::user::User;
use crate::forms::FormError;
use crate::forms::auth::{ChangePasswordForm, LoginForm, RegisterForm, RegisterPayload};
use crate::password::{hash_password, verify_password};
use crate::repository::{OrganizationWriter, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, organization_of};

fn hash(password: &Password) -> ServiceResult<String> {
    hash_password(password).map_err(|err| {
        log::error!("{err}");
        ServiceError::Internal(err.to_string())
    })
}

/// Creates an organization with its first admin.
pub fn register<R>(repo: &R, form: RegisterForm) -> ServiceResult<User>
where
    R: OrganizationWriter + UserReader + ?Sized,
{
    let payload = RegisterPayload::try_from(form)?;

    if repo.get_user_by_email(&payload.email)?.is_some() {
        return Err(ServiceError::Conflict(
            "email is already registered".to_string(),
        ));
    }

    let registration = Registration {
        organization: payload.organization,
        email: payload.email,
        name: payload.name,
        password_hash: hash(&payload.password)?,
    };

    let (organization, user) = repo.register_organization(&registration).map_err(|err| {
        log::error!("Failed to register organization: {err}");
        err
    })?;
    log::info!(
        "Registered organization {} with admin {}",
        organization.id,
        user.email
    );

    Ok(user)
}

/// Checks email and password. Every failure looks the same to the caller.
pub fn login<R>(repo: &R, form: LoginForm) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    let email = EmailAddress::new(form.email).map_err(|_| ServiceError::InvalidCredentials)?;
    let user = repo
        .get_user_by_email(&email)?
        .ok_or(ServiceError::InvalidCredentials)?;

    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&form.password, hash));

    if !verified || !user.is_active {
        return Err(ServiceError::InvalidCredentials);
    }

    Ok(user)
}

/// Changes the caller's password. Accounts without a password may set one
/// without supplying the current password.
pub fn change_password<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ChangePasswordForm,
) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let user_id = user.user_id()?;
    let stored = repo
        .get_user_by_id(user_id, organization_of(user)?)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(current_hash) = stored.password_hash.as_deref()
        && !verify_password(&form.current_password, current_hash)
    {
        return Err(ServiceError::InvalidCredentials);
    }

    let new_password = Password::new(form.new_password).map_err(FormError::from)?;
    repo.update_user_password(user_id, &hash(&new_password)?)
        .map_err(|err| {
            log::error!("Failed to update password: {err}");
            err
        })?;

    Ok(())
}

/// Re-reads the session's user so that deactivation and role changes apply
/// to tokens issued before them. Returns the claims rebuilt from the stored
/// user, keeping the token's expiry.
pub fn refresh_session<R>(repo: &R, claims: &AuthenticatedUser) -> ServiceResult<AuthenticatedUser>
where
    R: UserReader + ?Sized,
{
    let user_id = claims.user_id()?;
    let organization_id = organization_of(claims)?;

    match repo.get_user_by_id(user_id, organization_id)? {
        Some(user) if user.is_active => Ok(AuthenticatedUser::from_user(&user, claims.exp)),
        Some(_) => {
            log::warn!("Rejected session of deactivated user {user_id}");
            Err(ServiceError::InvalidCredentials)
        }
        None => {
            log::warn!("Rejected session of unknown user {user_id}");
            Err(ServiceError::InvalidCredentials)
        }
    }
}

/// Signs in the user a Google account belongs to.
///
/// A known `google_sub` wins; otherwise a verified email of an existing user
/// links the Google account to that user. Nobody signs up through Google.
pub fn complete_oauth_sign_in<R>(repo: &R, profile: &OAuthProfile) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    if let Some(user) = repo.get_user_by_google_sub(&profile.subject)? {
        return if user.is_active {
            Ok(user)
        } else {
            Err(ServiceError::InvalidCredentials)
        };
    }

    if !profile.email_verified {
        log::warn!("Rejected Google sign-in with unverified email {}", profile.email);
        return Err(ServiceError::InvalidCredentials);
    }

    let email =
        EmailAddress::new(profile.email.as_str()).map_err(|_| ServiceError::InvalidCredentials)?;
    let user = match repo.get_user_by_email(&email)? {
        Some(user) if user.is_active && user.google_sub.is_none() => user,
        _ => {
            log::warn!("Rejected Google sign-in for unknown user {email}");
            return Err(ServiceError::InvalidCredentials);
        }
    };

    let linked = repo
        .link_google_account(user.id, &profile.subject)
        .map_err(|err| {
            log::error!("Failed to link Google account: {err}");
            err
        })?;
    log::info!("Linked Google account to user {}", linked.id);

    Ok(linked)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::organization::Organization;
    use crate::domain::types::{OrganizationId, OrganizationName, PersonName, UserId, UserRole};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn stored_user(password: Option<&str>, is_active: bool) -> User {
        User {
            id: UserId::new(2).unwrap(),
            organization_id: org(),
            email: EmailAddress::new("office@pools.test").unwrap(),
            name: PersonName::new("Office").unwrap(),
            password_hash: password
                .map(|p| hash_password(&Password::new(p).unwrap()).unwrap()),
            google_sub: None,
            role: UserRole::Office,
            is_active,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    fn login_form(password: &str) -> LoginForm {
        LoginForm {
            email: " Office@Pools.test ".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn register_rejects_taken_email() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|_| Ok(Some(stored_user(None, true))));
        repo.expect_register_organization().times(0);

        let form = RegisterForm {
            organization_name: "Blue Water".to_string(),
            name: "Dana".to_string(),
            email: "office@pools.test".to_string(),
            password: "correct horse".to_string(),
        };

        assert!(matches!(register(&repo, form), Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn register_hashes_the_password() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_register_organization()
            .withf(|registration| {
                registration.password_hash.starts_with("$argon2")
                    && verify_password("correct horse", &registration.password_hash)
            })
            .times(1)
            .returning(|registration| {
                let organization = Organization {
                    id: OrganizationId::new(7).unwrap(),
                    name: OrganizationName::new("Blue Water").unwrap(),
                    created_at: stamp(),
                };
                let mut user = stored_user(None, true);
                user.email = registration.email.clone();
                user.role = UserRole::Admin;
                Ok((organization, user))
            });

        let form = RegisterForm {
            organization_name: "Blue Water".to_string(),
            name: "Dana".to_string(),
            email: "dana@bluewater.test".to_string(),
            password: "correct horse".to_string(),
        };

        let user = register(&repo, form).expect("registered");
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn login_accepts_the_right_password() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .withf(|email| email.as_str() == "office@pools.test")
            .returning(|_| Ok(Some(stored_user(Some("pool-secret"), true))));

        let user = login(&repo, login_form("pool-secret")).expect("logged in");
        assert_eq!(user.id.get(), 2);
    }

    #[test]
    fn login_failures_are_indistinguishable() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|_| Ok(Some(stored_user(Some("pool-secret"), true))));
        assert!(matches!(
            login(&repo, login_form("wrong-secret")),
            Err(ServiceError::InvalidCredentials)
        ));

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|_| Ok(Some(stored_user(Some("pool-secret"), false))));
        assert!(matches!(
            login(&repo, login_form("pool-secret")),
            Err(ServiceError::InvalidCredentials)
        ));

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|_| Ok(Some(stored_user(None, true))));
        assert!(matches!(
            login(&repo, login_form("")),
            Err(ServiceError::InvalidCredentials)
        ));

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        assert!(matches!(
            login(&repo, login_form("pool-secret")),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn change_password_checks_the_current_one() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_, _| Ok(Some(stored_user(Some("pool-secret"), true))));
        repo.expect_update_user_password().times(0);

        let form = ChangePasswordForm {
            current_password: "guess".to_string(),
            new_password: "new-pool-secret".to_string(),
        };

        assert!(matches!(
            change_password(&repo, &office(), form),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn oauth_accounts_may_set_a_first_password() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_, _| Ok(Some(stored_user(None, true))));
        repo.expect_update_user_password()
            .withf(|id, hash| id.get() == 2 && verify_password("new-pool-secret", hash))
            .times(1)
            .returning(|_, _| Ok(()));

        let form = ChangePasswordForm {
            current_password: String::new(),
            new_password: "new-pool-secret".to_string(),
        };

        change_password(&repo, &office(), form).expect("password set");
    }

    #[test]
    fn short_new_password_is_a_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_, _| Ok(Some(stored_user(None, true))));

        let form = ChangePasswordForm {
            current_password: String::new(),
            new_password: "short".to_string(),
        };

        assert!(matches!(
            change_password(&repo, &office(), form),
            Err(ServiceError::Form(_))
        ));
    }

    fn profile(verified: bool) -> OAuthProfile {
        OAuthProfile {
            subject: "google-123".to_string(),
            email: "Office@Pools.test".to_string(),
            email_verified: verified,
            name: Some("Office".to_string()),
        }
    }

    #[test]
    fn oauth_links_verified_email_of_existing_user() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_google_sub().returning(|_| Ok(None));
        repo.expect_get_user_by_email()
            .returning(|_| Ok(Some(stored_user(None, true))));
        repo.expect_link_google_account()
            .withf(|id, sub| id.get() == 2 && sub == "google-123")
            .times(1)
            .returning(|_, sub| {
                let mut user = stored_user(None, true);
                user.google_sub = Some(sub.to_string());
                Ok(user)
            });

        let user = complete_oauth_sign_in(&repo, &profile(true)).expect("signed in");
        assert_eq!(user.google_sub.as_deref(), Some("google-123"));
    }

    #[test]
    fn oauth_rejects_unverified_and_unknown_accounts() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_google_sub().returning(|_| Ok(None));
        repo.expect_get_user_by_email().times(0);
        assert!(matches!(
            complete_oauth_sign_in(&repo, &profile(false)),
            Err(ServiceError::InvalidCredentials)
        ));

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_google_sub().returning(|_| Ok(None));
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_link_google_account().times(0);
        assert!(matches!(
            complete_oauth_sign_in(&repo, &profile(true)),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn oauth_prefers_known_subject() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_google_sub()
            .returning(|_| Ok(Some(stored_user(None, true))));
        repo.expect_get_user_by_email().times(0);

        complete_oauth_sign_in(&repo, &profile(false)).expect("known subject signs in");
    }

    #[test]
    fn repository_failures_propagate() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|_| Err(RepositoryError::ConnectionError("down".to_string())));

        assert!(matches!(
            login(&repo, login_form("pool-secret")),
            Err(ServiceError::Repository(_))
        ));
    }

    fn session_claims() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "2".to_string(),
            email: "office@pools.test".to_string(),
            name: "Office".to_string(),
            organization_id: org().get(),
            roles: vec![
                SERVICE_ACCESS_ROLE.to_string(),
                crate::domain::auth::SERVICE_ADMIN_ROLE.to_string(),
            ],
            exp: 4_102_444_800,
        }
    }

    #[test]
    fn refresh_session_applies_the_stored_role() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .withf(|id, organization_id| id.get() == 2 && *organization_id == org())
            .returning(|_, _| Ok(Some(stored_user(None, true))));

        let refreshed = refresh_session(&repo, &session_claims()).expect("active user");
        assert!(!refreshed.has_role(crate::domain::auth::SERVICE_ADMIN_ROLE));
        assert!(refreshed.has_role(crate::domain::auth::SERVICE_OFFICE_ROLE));
        assert_eq!(refreshed.exp, 4_102_444_800);
    }

    #[test]
    fn refresh_session_rejects_deactivated_and_removed_users() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_, _| Ok(Some(stored_user(None, false))));
        assert!(matches!(
            refresh_session(&repo, &session_claims()),
            Err(ServiceError::InvalidCredentials)
        ));

        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(|_, _| Ok(None));
        assert!(matches!(
            refresh_session(&repo, &session_claims()),
            Err(ServiceError::InvalidCredentials)
        ));
    }
}
