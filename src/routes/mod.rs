mod auth;
mod events;
mod health_check;
mod participants;

use actix_web::{web, HttpResponse, Scope};

use crate::auth::AuthGate;
use crate::middleware::JwtMiddleware;
use crate::response::ApiResponse;

pub use auth::{login, logout, refresh, register};
pub use events::{
    create_event, delete_event, get_event, get_event_by_short_name, list_events, update_event,
};
pub use health_check::health_check;
pub use participants::{
    add_participant, delete_participant, get_participant, get_public_event,
    list_participant_contacts, list_participant_names, list_participants, replace_participants,
    update_participant,
};

/// `/api/auth`: everything public except logout
pub fn auth_scope(gate: &AuthGate) -> Scope {
    web::scope("/api/auth")
        .route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/refresh", web::post().to(refresh))
        .service(
            web::resource("/logout")
                .wrap(JwtMiddleware::new(gate.clone()))
                .route(web::post().to(logout)),
        )
}

/// `/api/events`: only the short-name lookup is public
pub fn events_scope(gate: &AuthGate) -> Scope {
    web::scope("/api/events")
        .service(
            web::resource(["", "/"])
                .wrap(JwtMiddleware::new(gate.clone()))
                .route(web::post().to(create_event))
                .route(web::get().to(list_events)),
        )
        .route("/short/{short_name}", web::get().to(get_event_by_short_name))
        .service(
            web::resource("/{id}")
                .wrap(JwtMiddleware::new(gate.clone()))
                .route(web::get().to(get_event))
                .route(web::put().to(update_event))
                .route(web::delete().to(delete_event)),
        )
}

/// `/api/participants`: fixed-prefix routes are registered before `/{id}`
pub fn participants_scope(gate: &AuthGate) -> Scope {
    web::scope("/api/participants")
        .route("/public/event/{id}", web::get().to(get_public_event))
        .service(
            web::resource(["", "/"])
                .wrap(JwtMiddleware::new(gate.clone()))
                .route(web::post().to(add_participant)),
        )
        .route("/bulk", web::post().to(replace_participants))
        .route("/bulk/{short_name}", web::get().to(list_participant_names))
        .route("/short/{short_name}", web::get().to(list_participant_contacts))
        .service(
            web::resource("/single/{id}")
                .wrap(JwtMiddleware::new(gate.clone()))
                .route(web::get().to(get_participant)),
        )
        .service(
            web::resource("/{id}")
                .wrap(JwtMiddleware::new(gate.clone()))
                .route(web::get().to(list_participants))
                .route(web::put().to(update_participant))
                .route(web::delete().to(delete_participant)),
        )
}

/// Fallback for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::failure("Route not found"))
}
