use std::env;

use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::{Config, ConfigError, Environment, File};
use pushkind_common::db::establish_connection_pool;
use pushkind_common::models::config::CommonServerConfig;

use pushkind_barter::matching::MatchEngine;
use pushkind_barter::models::config::ServerConfig;
use pushkind_barter::repository::DieselRepository;
use pushkind_barter::routes::api;

/// Layers `config/default.yaml`, an optional `config/{APP_ENV}.yaml` and
/// `APP_*` environment variables (`APP_MATCHING__THRESHOLD` for nested keys).
fn load_config() -> Result<ServerConfig, ConfigError> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server_config = load_config().map_err(|e| {
        log::error!("Failed to load configuration: {e}");
        std::io::Error::other(e.to_string())
    })?;

    let engine = MatchEngine::new(server_config.matching).map_err(|e| {
        log::error!("Invalid matching configuration: {e}");
        std::io::Error::other(e.to_string())
    })?;

    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        log::error!("Failed to establish database connection: {e}");
        std::io::Error::other(e.to_string())
    })?;

    let secret_key = Key::try_from(server_config.secret.as_bytes()).map_err(|e| {
        log::error!("Session secret must be at least 64 bytes: {e}");
        std::io::Error::other(e.to_string())
    })?;

    let common_config = web::Data::new(CommonServerConfig {
        auth_service_url: server_config.auth_service_url.clone(),
        secret: server_config.secret.clone(),
    });
    let repo = web::Data::new(DieselRepository::new(pool));
    let engine = web::Data::new(engine);

    log::info!(
        "Starting server at {}:{} (match threshold {})",
        server_config.address,
        server_config.port,
        engine.config().threshold
    );

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(Logger::default())
            .app_data(common_config.clone())
            .app_data(repo.clone())
            .app_data(engine.clone())
            .service(web::scope("/api/v1").configure(api::configure))
    })
    .bind((server_config.address.as_str(), server_config.port))?
    .run()
    .await
}
