//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], which generates the OpenAPI specification for the
//! REST API: every endpoint from the inbound layer, the domain schemas they
//! exchange, and the session-cookie security scheme. Swagger UI serves the
//! document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Attachment, Error, ErrorCode, Incident, IncidentPatch, Office, Priority, Role, Status,
    UserSummary,
};
use crate::inbound::http::incidents::RemoveFileBody;
use crate::inbound::http::sessions::LoginRequest;
use crate::inbound::http::users::{ChangePasswordBody, RegisterBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/sessions.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Helpdesk backend API",
        description = "Session-authenticated incident ticketing with file attachments."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::sessions::login,
        crate::inbound::http::sessions::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::incidents::list_incidents,
        crate::inbound::http::incidents::create_incident,
        crate::inbound::http::incidents::incident_detail,
        crate::inbound::http::incidents::update_incident,
        crate::inbound::http::incidents::delete_incident,
        crate::inbound::http::incidents::add_incident_files,
        crate::inbound::http::incidents::remove_incident_file,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Incident,
        IncidentPatch,
        Attachment,
        Status,
        Priority,
        Office,
        Role,
        UserSummary,
        LoginRequest,
        RegisterBody,
        ChangePasswordBody,
        RemoveFileBody,
    )),
    tags(
        (name = "sessions", description = "Login and logout"),
        (name = "users", description = "Account management"),
        (name = "incidents", description = "Incident tickets and attachments"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn document_includes_every_incident_path() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/incidents"));
        assert!(paths.contains_key("/api/v1/incidents/{id}"));
        assert!(paths.contains_key("/api/v1/incidents/{id}/files"));
        assert!(paths.contains_key("/api/v1/sessions"));
        assert!(paths.contains_key("/api/v1/users/change-password"));
    }

    #[test]
    fn document_serialises_to_json() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("serialise document");
        assert!(json.contains("SessionCookie"));
    }
}
