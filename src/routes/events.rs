/// Event Routes
///
/// CRUD over events. Short names are normalized before every write and
/// lookup, and must stay unique.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditEvent};
use crate::auth::AuthenticatedUser;
use crate::domain::{normalize_short_name, EventKind, NewEvent};
use crate::error::{AppError, DatabaseError, ValidationError};
use crate::response::ApiResponse;
use crate::store::Repositories;
use crate::validators::{is_valid_name, optional, required, ValidationReport};

const EVENT_NOT_FOUND: &str = "Event not found";

/// Create/update request for an event
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub name: Option<String>,
    pub short_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub logo_url: Option<String>,
    pub background_url: Option<String>,
}

struct ValidEvent {
    name: String,
    short_name: String,
    kind: EventKind,
    logo_url: Option<String>,
    background_url: Option<String>,
}

impl EventRequest {
    fn validate(&self) -> Result<ValidEvent, ValidationError> {
        let mut report = ValidationReport::new();
        let short_name = report.check(
            required("Short name", self.short_name.as_deref()).map(normalize_short_name),
        );
        let name = report.check(
            required("Event name", self.name.as_deref())
                .and_then(|name| is_valid_name("Event name", name)),
        );
        let kind = report.check(
            required("Event type", self.kind.as_deref()).and_then(|kind| {
                kind.parse::<EventKind>()
                    .map_err(|_| ValidationError::NotAllowed("event type", EventKind::ALLOWED))
            }),
        );

        match (name, short_name, kind) {
            (Some(name), Some(short_name), Some(kind)) => Ok(ValidEvent {
                name,
                short_name,
                kind,
                logo_url: optional(self.logo_url.as_deref()),
                background_url: optional(self.background_url.as_deref()),
            }),
            _ => Err(report.into_error()),
        }
    }
}

fn short_name_taken(short_name: &str) -> AppError {
    AppError::Conflict(format!(
        "Short name \"{}\" is already taken. Please choose a different one.",
        short_name
    ))
}

async fn ensure_short_name_free(repositories: &Repositories, short_name: &str) -> Result<(), AppError> {
    if repositories.events.find_by_short_name(short_name).await?.is_some() {
        return Err(short_name_taken(short_name));
    }
    Ok(())
}

/// POST /api/events
pub async fn create_event(
    form: web::Json<EventRequest>,
    user: web::ReqData<AuthenticatedUser>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let valid = form.validate()?;
    ensure_short_name_free(&repositories, &valid.short_name).await?;

    let short_name = valid.short_name.clone();
    let event = repositories
        .events
        .create(NewEvent {
            name: valid.name,
            short_name: valid.short_name,
            kind: valid.kind,
            logo_url: valid.logo_url,
            background_url: valid.background_url,
            created_by: user.id,
        })
        .await
        .map_err(|e| match e {
            DatabaseError::UniqueConstraintViolation(_) => short_name_taken(&short_name),
            other => other.into(),
        })?;

    AuditEvent::success(AuditAction::CreateEvent, "event", "Event created")
        .with_resource_id(event.id)
        .with_user_id(user.id)
        .emit();

    Ok(HttpResponse::Created().json(ApiResponse::success("Event created successfully", event)))
}

/// GET /api/events
///
/// Events created by the caller.
pub async fn list_events(
    user: web::ReqData<AuthenticatedUser>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let events = repositories.events.list_by_creator(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Events retrieved successfully", events)))
}

pub async fn get_event(
    path: web::Path<Uuid>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let event = repositories
        .events
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Event retrieved successfully", event)))
}

/// GET /api/events/short/{shortName} (public)
pub async fn get_event_by_short_name(
    path: web::Path<String>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let short_name = normalize_short_name(&path.into_inner());
    let event = repositories
        .events
        .find_by_short_name(&short_name)
        .await?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Event retrieved successfully", event)))
}

/// PUT /api/events/{id}
///
/// Same validation as creation. Uniqueness is only re-checked when the
/// normalized short name changes; image URLs are kept unless supplied.
pub async fn update_event(
    path: web::Path<Uuid>,
    form: web::Json<EventRequest>,
    user: web::ReqData<AuthenticatedUser>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let valid = form.validate()?;
    let mut event = repositories
        .events
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))?;

    if valid.short_name != event.short_name {
        ensure_short_name_free(&repositories, &valid.short_name).await?;
        event.short_name = valid.short_name;
    }
    event.name = valid.name;
    event.kind = valid.kind;
    if valid.logo_url.is_some() {
        event.logo_url = valid.logo_url;
    }
    if valid.background_url.is_some() {
        event.background_url = valid.background_url;
    }

    let short_name = event.short_name.clone();
    let event = repositories
        .events
        .update(event)
        .await
        .map_err(|e| match e {
            DatabaseError::UniqueConstraintViolation(_) => short_name_taken(&short_name),
            other => other.into(),
        })?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))?;

    AuditEvent::success(AuditAction::UpdateEvent, "event", "Event updated")
        .with_resource_id(event.id)
        .with_user_id(user.id)
        .emit();

    Ok(HttpResponse::Ok().json(ApiResponse::success("Event updated successfully", event)))
}

/// DELETE /api/events/{id}
///
/// Participants of the event are removed with it.
pub async fn delete_event(
    path: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !repositories.events.delete(id).await? {
        return Err(AppError::NotFound(EVENT_NOT_FOUND.to_string()));
    }

    AuditEvent::success(AuditAction::DeleteEvent, "event", "Event deleted")
        .with_resource_id(id)
        .with_user_id(user.id)
        .emit();

    Ok(HttpResponse::Ok().json(ApiResponse::done("Event deleted successfully")))
}
