#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, config::PersistentSession, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::{Key, time::Duration};
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::oauth::GoogleOAuth;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "data")]
mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "server")]
pub mod oauth;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod password;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Cookie keys are derived from the secret and need at least 64 bytes.
pub const MIN_SECRET_LEN: usize = 64;

/// Reads `config/default.yaml`, the `config/{APP_ENV}` overrides (defaults
/// to `local`) and `APP_*` environment variables.
#[cfg(feature = "server")]
pub fn load_server_config() -> Result<ServerConfig, config::ConfigError> {
    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    config::Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build()?
        .try_deserialize::<ServerConfig>()
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    if server_config.secret.len() < MIN_SECRET_LEN {
        return Err(std::io::Error::other(format!(
            "secret must be at least {MIN_SECRET_LEN} bytes long"
        )));
    }

    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    let oauth = match GoogleOAuth::from_config(&server_config) {
        Ok(oauth) => Some(web::Data::new(oauth)),
        Err(err) => {
            log::info!("Google sign-in disabled: {err}");
            None
        }
    };

    let secret_key = Key::from(server_config.secret.as_bytes());
    let session_ttl = Duration::hours(server_config.session_ttl_hours.max(1));
    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Cors::permissive())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(server_config.cookie_secure)
                    .session_lifecycle(PersistentSession::default().session_ttl(session_ttl))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()));
        if let Some(oauth) = &oauth {
            app = app.app_data(oauth.clone());
        }
        app
    })
    .bind(bind_address)?
    .run()
    .await
}
