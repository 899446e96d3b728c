use actix_identity::Identity;
use actix_session::Session;
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use uuid::Uuid;

use crate::auth::issue_token;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::user::User;
use crate::dto::auth::{OAuthCallbackQuery, SessionUser};
use crate::forms::auth::{ChangePasswordForm, LoginForm, RegisterForm};
use crate::models::config::ServerConfig;
use crate::oauth::{GoogleOAuth, OAUTH_STATE_KEY};
use crate::repository::DieselRepository;
use crate::routes::{error_body, error_response, no_content};
use crate::services::auth as auth_service;

/// Issues a session token for `user` and attaches it to the identity cookie.
fn start_session(
    req: &HttpRequest,
    user: &User,
    config: &ServerConfig,
) -> Result<SessionUser, HttpResponse> {
    let (claims, token) = issue_token(user, config).map_err(|err| {
        log::error!("Failed to sign session token: {err}");
        HttpResponse::InternalServerError().json(error_body("internal server error"))
    })?;
    Identity::login(&req.extensions(), token).map_err(|err| {
        log::error!("Failed to attach identity: {err}");
        HttpResponse::InternalServerError().json(error_body("internal server error"))
    })?;
    Ok(SessionUser::from(&claims))
}

#[post("/auth/register")]
pub async fn register(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<RegisterForm>,
) -> impl Responder {
    match auth_service::register(repo.get_ref(), form) {
        Ok(user) => match start_session(&req, &user, &server_config) {
            Ok(session) => HttpResponse::Created().json(session),
            Err(response) => response,
        },
        Err(err) => error_response(err),
    }
}

#[post("/auth/login")]
pub async fn login(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<LoginForm>,
) -> impl Responder {
    match auth_service::login(repo.get_ref(), form) {
        Ok(user) => match start_session(&req, &user, &server_config) {
            Ok(session) => HttpResponse::Ok().json(session),
            Err(response) => response,
        },
        Err(err) => error_response(err),
    }
}

#[post("/auth/logout")]
pub async fn logout(identity: Option<Identity>) -> impl Responder {
    if let Some(identity) = identity {
        identity.logout();
    }
    HttpResponse::NoContent().finish()
}

#[get("/auth/me")]
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(SessionUser::from(&user))
}

#[post("/auth/password")]
pub async fn change_password(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ChangePasswordForm>,
) -> impl Responder {
    no_content(auth_service::change_password(repo.get_ref(), &user, form))
}

#[get("/auth/google")]
pub async fn google_start(
    session: Session,
    oauth: Option<web::Data<GoogleOAuth>>,
) -> impl Responder {
    let Some(oauth) = oauth else {
        return HttpResponse::NotFound().json(error_body("google sign-in is not configured"));
    };

    let state = Uuid::new_v4().simple().to_string();
    if let Err(err) = session.insert(OAUTH_STATE_KEY, &state) {
        log::error!("Failed to store oauth state: {err}");
        return HttpResponse::InternalServerError().json(error_body("internal server error"));
    }

    match oauth.authorization_url(&state) {
        Ok(url) => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, url))
            .finish(),
        Err(err) => {
            log::error!("Failed to build consent url: {err}");
            HttpResponse::InternalServerError().json(error_body("internal server error"))
        }
    }
}

#[get("/auth/google/callback")]
pub async fn google_callback(
    req: HttpRequest,
    session: Session,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    oauth: Option<web::Data<GoogleOAuth>>,
    query: web::Query<OAuthCallbackQuery>,
) -> impl Responder {
    let Some(oauth) = oauth else {
        return HttpResponse::NotFound().json(error_body("google sign-in is not configured"));
    };
    let query = query.into_inner();

    let expected = session.get::<String>(OAUTH_STATE_KEY).ok().flatten();
    session.remove(OAUTH_STATE_KEY);

    if let Some(error) = query.error {
        log::warn!("Google sign-in was declined: {error}");
        return HttpResponse::Unauthorized().json(error_body("google sign-in was declined"));
    }
    let state_matches = matches!(
        (&expected, &query.state),
        (Some(expected), Some(received)) if expected == received
    );
    let Some(code) = query.code.filter(|_| state_matches) else {
        return HttpResponse::Unauthorized().json(error_body("invalid oauth state"));
    };

    let profile = match oauth.profile_for_code(&code).await {
        Ok(profile) => profile,
        Err(err) => {
            log::error!("Failed to fetch google profile: {err}");
            return HttpResponse::BadGateway().json(error_body("google sign-in failed"));
        }
    };

    match auth_service::complete_oauth_sign_in(repo.get_ref(), &profile) {
        Ok(user) => match start_session(&req, &user, &server_config) {
            Ok(_) => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, server_config.frontend_url.clone()))
                .finish(),
            Err(response) => response,
        },
        Err(err) => error_response(err),
    }
}
