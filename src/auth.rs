//! Session tokens and the `AuthenticatedUser` extractor.
//!
//! The identity cookie holds an HS256 JWT with the user's claims; handlers
//! take `AuthenticatedUser` as an argument and get a 401 when the cookie is
//! missing, expired or signed with another secret. The claims are refreshed
//! from the stored user on every request, so deactivated users lose access
//! and role changes apply immediately.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::json;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::user::User;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::auth::refresh_session;

pub use jsonwebtoken::errors::Error as TokenError;

pub fn encode_token(claims: &AuthenticatedUser, secret: &str) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies the signature and expiry of `token`.
pub fn decode_token(token: &str, secret: &str) -> Result<AuthenticatedUser, TokenError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Claims for `user` valid for the configured session lifetime, and their
/// signed token.
pub fn issue_token(
    user: &User,
    config: &ServerConfig,
) -> Result<(AuthenticatedUser, String), TokenError> {
    let expires_at = Utc::now() + Duration::hours(config.session_ttl_hours.max(1));
    let claims = AuthenticatedUser::from_user(user, expires_at.timestamp().max(0) as usize);
    let token = encode_token(&claims, &config.secret)?;
    Ok((claims, token))
}

fn unauthorized(message: &'static str) -> actix_web::Error {
    InternalError::from_response(
        message,
        HttpResponse::Unauthorized().json(json!({ "error": message })),
    )
    .into()
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
        log::error!("Server configuration is not registered");
        return Err(unauthorized("not signed in"));
    };

    let token = req
        .get_identity()
        .and_then(|identity| identity.id())
        .map_err(|_| unauthorized("not signed in"))?;

    let claims = decode_token(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        unauthorized("session expired")
    })?;

    let Some(repo) = req.app_data::<web::Data<DieselRepository>>() else {
        log::error!("Repository is not registered");
        return Err(unauthorized("not signed in"));
    };
    refresh_session(repo.get_ref(), &claims).map_err(|err| match err {
        ServiceError::InvalidCredentials => unauthorized("session revoked"),
        other => {
            log::error!("Failed to check session: {other}");
            unauthorized("not signed in")
        }
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
