//! User account API handlers.
//!
//! ```text
//! POST /api/v1/users                     register
//! GET /api/v1/users                      list accounts (admin)
//! GET /api/v1/users/me                   own profile
//! PATCH /api/v1/users/change-password    rotate own password
//! DELETE /api/v1/users/{id}              delete account (admin)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{ChangePasswordRequest, RegisterRequest};
use crate::domain::{Error, UserId, UserSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration request body for `POST /api/v1/users`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct RegisterBody {
    /// Display name.
    pub name: String,
    /// Email address; must be unique.
    pub email: String,
    /// Raw password.
    pub password: String,
    /// Account role (`user`, `admin`, or `tecnico`).
    pub role: String,
    /// Account office.
    pub office: String,
}

/// Password change request body.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    /// Password currently on the account.
    #[serde(alias = "current_password")]
    pub current_password: String,
    /// Replacement password.
    #[serde(alias = "new_password")]
    pub new_password: String,
}

/// Register a new user account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = UserSummary),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let summary = state
        .users_command
        .register(RegisterRequest {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
            office: body.office,
        })
        .await?;
    Ok(HttpResponse::Created().json(summary))
}

/// List every account. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Accounts", body = [UserSummary]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserSummary>>> {
    let caller = state.require_caller(&session).await?;
    let users = state.users_query.list_users(&caller).await?;
    Ok(web::Json(users))
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = UserSummary),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserSummary>> {
    let user_id = session.require_user_id()?;
    let profile = state.users_query.profile(&user_id).await?;
    Ok(web::Json(profile))
}

/// Rotate the caller's password after verifying the current one.
#[utoipa::path(
    patch,
    path = "/api/v1/users/change-password",
    request_body = ChangePasswordBody,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[patch("/users/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChangePasswordBody>,
) -> ApiResult<HttpResponse> {
    let caller = state.require_caller(&session).await?;
    let body = payload.into_inner();
    state
        .users_command
        .change_password(
            &caller,
            ChangePasswordRequest {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete an account. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "Account identifier")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let caller = state.require_caller(&session).await?;
    let id = UserId::from_uuid(path.into_inner());
    state.users_command.delete_user(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
