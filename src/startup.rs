use actix_web::dev::Server;
use actix_web::{error, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthGate, PasswordHasher, SessionManager, TokenKeys};
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::routes::{auth_scope, events_scope, health_check, not_found, participants_scope};
use crate::security::SecurityHeaders;
use crate::store::Repositories;

/// Body size cap for JSON requests
const JSON_LIMIT_BYTES: usize = 64 * 1024;

pub fn run(
    listener: TcpListener,
    repositories: Repositories,
    settings: &Settings,
) -> Result<Server, std::io::Error> {
    let tokens = Arc::new(TokenKeys::new(&settings.jwt));
    let gate = AuthGate::new(tokens.clone(), repositories.users.clone());
    let sessions = web::Data::new(SessionManager::new(
        repositories.users.clone(),
        tokens,
        PasswordHasher::new(settings.application.password_hash_cost),
        settings.application.environment,
    ));
    let repositories = web::Data::new(repositories);

    tracing::info!(
        environment = settings.application.environment.as_str(),
        "Configuring HTTP server"
    );

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(SecurityHeaders::middleware())
            .wrap(LoggerMiddleware)

            // Extractor errors use the same JSON envelope as handler errors
            .app_data(json_config())
            .app_data(path_config())

            // Shared state
            .app_data(sessions.clone())
            .app_data(repositories.clone())

            .route("/health_check", web::get().to(health_check))
            .service(auth_scope(&gate))
            .service(events_scope(&gate))
            .service(participants_scope(&gate))
            .default_service(web::route().to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            let message = match &err {
                error::JsonPayloadError::ContentType => {
                    "Content type must be application/json.".to_string()
                }
                error::JsonPayloadError::OverflowKnownLength { .. }
                | error::JsonPayloadError::Overflow { .. } => "Request body is too large.".to_string(),
                other => format!("Invalid request body: {}", other),
            };
            AppError::Validation(ValidationError::Malformed(message)).into()
        })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err, _req| {
        AppError::Validation(ValidationError::InvalidFormat("ID")).into()
    })
}
