/// Participant Routes
///
/// Organiser-side CRUD (authenticated) plus the public endpoints used by the
/// event pages: event details, bulk name upload and the short-name listings.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditEvent};
use crate::auth::AuthenticatedUser;
use crate::domain::{
    normalize_short_name, Event, NewParticipant, ParticipantChanges, ParticipantContact,
    ParticipantName,
};
use crate::error::{AppError, ValidationError};
use crate::response::ApiResponse;
use crate::store::Repositories;
use crate::validators::{is_valid_name, optional, required, ValidationReport};

const EVENT_NOT_FOUND: &str = "Event not found";
const PARTICIPANT_NOT_FOUND: &str = "Participant not found";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddParticipantRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub event_id: Option<String>,
}

impl AddParticipantRequest {
    fn validate(&self) -> Result<NewParticipant, ValidationError> {
        let mut report = ValidationReport::new();
        let name = report.check(
            required("Participant name", self.name.as_deref())
                .and_then(|name| is_valid_name("Participant name", name)),
        );
        let phone = report.check(required("Phone number", self.phone.as_deref()).map(str::to_string));
        let company = report.check(
            required("Company name", self.company.as_deref())
                .and_then(|company| is_valid_name("Company name", company)),
        );
        let event_id = report.check(required("Event ID", self.event_id.as_deref()).and_then(|id| {
            Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat("event ID"))
        }));

        match (name, phone, company, event_id) {
            (Some(name), Some(phone), Some(company), Some(event_id)) => Ok(NewParticipant {
                name,
                phone: Some(phone),
                company: Some(company),
                event_id,
            }),
            _ => Err(report.into_error()),
        }
    }
}

/// Bulk replacement body: `participants` is a list of names
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkParticipantsRequest {
    pub short_name: Option<String>,
    pub participants: Option<serde_json::Value>,
}

impl BulkParticipantsRequest {
    /// Trimmed, non-empty names
    fn names(&self) -> Result<Vec<String>, ValidationError> {
        let names: Vec<String> = self
            .participants
            .as_ref()
            .and_then(|value| value.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if names.is_empty() {
            return Err(ValidationError::Malformed(
                "Participants array is required.".to_string(),
            ));
        }
        Ok(names)
    }
}

/// Partial update; blank fields keep their current value
#[derive(Deserialize)]
pub struct UpdateParticipantRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl From<&UpdateParticipantRequest> for ParticipantChanges {
    fn from(req: &UpdateParticipantRequest) -> Self {
        Self {
            name: optional(req.name.as_deref()),
            phone: optional(req.phone.as_deref()),
            company: optional(req.company.as_deref()),
        }
    }
}

async fn event_by_short_name(repositories: &Repositories, raw: &str) -> Result<Event, AppError> {
    repositories
        .events
        .find_by_short_name(&normalize_short_name(raw))
        .await?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))
}

/// GET /api/participants/public/event/{id} (public)
pub async fn get_public_event(
    path: web::Path<Uuid>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let event = repositories
        .events
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Event details retrieved", event)))
}

/// POST /api/participants
pub async fn add_participant(
    form: web::Json<AddParticipantRequest>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let new_participant = form.validate()?;

    if repositories
        .events
        .find_by_id(new_participant.event_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(EVENT_NOT_FOUND.to_string()));
    }

    let participant = repositories.participants.create(new_participant).await?;
    tracing::info!(
        participant_id = %participant.id,
        event_id = %participant.event_id,
        "Participant added"
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Participant added successfully",
        participant,
    )))
}

/// POST /api/participants/bulk (public)
///
/// Replaces every participant of the event with the submitted names.
pub async fn replace_participants(
    form: web::Json<BulkParticipantsRequest>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let names = form.names()?;
    let short_name = required("Short name", form.short_name.as_deref())?;
    let event = event_by_short_name(&repositories, short_name).await?;

    let inserted = repositories
        .participants
        .replace_for_event(event.id, names)
        .await?;

    AuditEvent::success(
        AuditAction::ReplaceParticipants,
        "event",
        format!("{} participants stored", inserted.len()),
    )
    .with_resource_id(event.id)
    .emit();

    Ok(HttpResponse::Created().json(ApiResponse::done("Participants updated successfully")))
}

/// GET /api/participants/bulk/{shortName} (public)
pub async fn list_participant_names(
    path: web::Path<String>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let event = event_by_short_name(&repositories, &path).await?;
    let names: Vec<ParticipantName> = repositories
        .participants
        .list_by_event(event.id)
        .await?
        .into_iter()
        .map(ParticipantName::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Participants retrieved successfully",
        names,
    )))
}

/// GET /api/participants/short/{shortName} (public)
pub async fn list_participant_contacts(
    path: web::Path<String>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let event = event_by_short_name(&repositories, &path).await?;
    let contacts: Vec<ParticipantContact> = repositories
        .participants
        .list_by_event(event.id)
        .await?
        .into_iter()
        .map(ParticipantContact::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Participants retrieved successfully",
        contacts,
    )))
}

/// GET /api/participants/{eventId}
pub async fn list_participants(
    path: web::Path<Uuid>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let participants = repositories
        .participants
        .list_by_event(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Participants retrieved successfully",
        participants,
    )))
}

/// GET /api/participants/single/{id}
pub async fn get_participant(
    path: web::Path<Uuid>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let participant = repositories
        .participants
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(PARTICIPANT_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Participant retrieved successfully",
        participant,
    )))
}

/// PUT /api/participants/{id}
pub async fn update_participant(
    path: web::Path<Uuid>,
    form: web::Json<UpdateParticipantRequest>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let participant = repositories
        .participants
        .update(path.into_inner(), ParticipantChanges::from(&*form))
        .await?
        .ok_or_else(|| AppError::NotFound(PARTICIPANT_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Participant updated successfully",
        participant,
    )))
}

/// DELETE /api/participants/{id}
pub async fn delete_participant(
    path: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
    repositories: web::Data<Repositories>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !repositories.participants.delete(id).await? {
        return Err(AppError::NotFound(PARTICIPANT_NOT_FOUND.to_string()));
    }

    AuditEvent::success(AuditAction::DeleteParticipant, "participant", "Participant deleted")
        .with_resource_id(id)
        .with_user_id(user.id)
        .emit();

    Ok(HttpResponse::Ok().json(ApiResponse::done("Participant deleted successfully")))
}
