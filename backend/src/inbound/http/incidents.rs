//! Incident API handlers.
//!
//! ```text
//! GET /api/v1/incidents                      list visible incidents
//! POST /api/v1/incidents                     create (multipart, `files` field)
//! GET /api/v1/incidents/{id}                 detail
//! PATCH /api/v1/incidents/{id}               partial field update (JSON)
//! DELETE /api/v1/incidents/{id}              delete incident and attachments
//! PATCH /api/v1/incidents/{id}/files         append files (multipart)
//! DELETE /api/v1/incidents/{id}/files        remove one attachment (JSON)
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::CreateIncidentRequest;
use crate::domain::{Error, Incident, IncidentPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::upload::parse_upload_form;

/// Body of `DELETE /api/v1/incidents/{id}/files`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct RemoveFileBody {
    /// Opaque identifier of the attachment to remove.
    pub public_id: String,
}

/// Incidents visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/incidents",
    responses(
        (status = 200, description = "Visible incidents", body = [Incident]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "listIncidents"
)]
#[get("/incidents")]
pub async fn list_incidents(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Incident>>> {
    let caller = state.require_caller(&session).await?;
    let incidents = state.incidents_query.list(&caller).await?;
    Ok(web::Json(incidents))
}

/// File a new incident. Multipart: text fields `title`, `description`,
/// optional `priority`, plus up to ten parts under `files`.
#[utoipa::path(
    post,
    path = "/api/v1/incidents",
    responses(
        (status = 201, description = "Incident created", body = Incident),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Upload or internal failure", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "createIncident"
)]
#[post("/incidents")]
pub async fn create_incident(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let caller = state.require_caller(&session).await?;
    let form = parse_upload_form(payload).await?;
    let request = CreateIncidentRequest {
        title: form.text("title").unwrap_or_default().to_owned(),
        description: form.text("description").unwrap_or_default().to_owned(),
        priority: form.text("priority").map(ToOwned::to_owned),
    };
    let incident = state
        .incidents_command
        .create(&caller, request, form.files)
        .await?;
    Ok(HttpResponse::Created().json(incident))
}

/// One incident, office-scoped for non-admins.
#[utoipa::path(
    get,
    path = "/api/v1/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident identifier")),
    responses(
        (status = 200, description = "Incident", body = Incident),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "incidentDetail"
)]
#[get("/incidents/{id}")]
pub async fn incident_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Incident>> {
    let caller = state.require_caller(&session).await?;
    let incident = state.incidents_query.get(&caller, &path.into_inner()).await?;
    Ok(web::Json(incident))
}

/// Apply a partial field update. The `user` role may not touch `status`,
/// and status changes must follow the lifecycle.
#[utoipa::path(
    patch,
    path = "/api/v1/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident identifier")),
    request_body = IncidentPatch,
    responses(
        (status = 200, description = "Updated incident", body = Incident),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "updateIncident"
)]
#[patch("/incidents/{id}")]
pub async fn update_incident(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<IncidentPatch>,
) -> ApiResult<web::Json<Incident>> {
    let caller = state.require_caller(&session).await?;
    let incident = state
        .incidents_command
        .update(&caller, &path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(incident))
}

/// Delete an incident after removing its attachments from the store.
#[utoipa::path(
    delete,
    path = "/api/v1/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident identifier")),
    responses(
        (status = 204, description = "Incident deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Store or internal failure", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "deleteIncident"
)]
#[delete("/incidents/{id}")]
pub async fn delete_incident(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let caller = state.require_caller(&session).await?;
    state
        .incidents_command
        .delete(&caller, &path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Append uploaded files to an incident. Multipart, `files` field.
#[utoipa::path(
    patch,
    path = "/api/v1/incidents/{id}/files",
    params(("id" = Uuid, Path, description = "Incident identifier")),
    responses(
        (status = 200, description = "Updated incident", body = Incident),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Upload or internal failure", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "addIncidentFiles"
)]
#[patch("/incidents/{id}/files")]
pub async fn add_incident_files(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> ApiResult<web::Json<Incident>> {
    let caller = state.require_caller(&session).await?;
    let form = parse_upload_form(payload).await?;
    let incident = state
        .incidents_command
        .add_files(&caller, &path.into_inner(), form.files)
        .await?;
    Ok(web::Json(incident))
}

/// Remove one attachment, store-side first.
#[utoipa::path(
    delete,
    path = "/api/v1/incidents/{id}/files",
    params(("id" = Uuid, Path, description = "Incident identifier")),
    request_body = RemoveFileBody,
    responses(
        (status = 200, description = "Updated incident", body = Incident),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Store or internal failure", body = Error)
    ),
    tags = ["incidents"],
    operation_id = "removeIncidentFile"
)]
#[delete("/incidents/{id}/files")]
pub async fn remove_incident_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<RemoveFileBody>,
) -> ApiResult<web::Json<Incident>> {
    let caller = state.require_caller(&session).await?;
    let incident = state
        .incidents_command
        .remove_file(&caller, &path.into_inner(), &payload.public_id)
        .await?;
    Ok(web::Json(incident))
}
