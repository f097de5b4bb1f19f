//! Session API handlers: login and logout.
//!
//! ```text
//! POST /api/v1/sessions {"email":"ana@x.example","password":"secret"}
//! DELETE /api/v1/sessions
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/sessions`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::InvalidEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "errors": { field: err.to_string() } }))
}

/// Authenticate a user and establish a session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["sessions"],
    operation_id = "login",
    security([])
)]
#[post("/sessions")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&body.email, &body.password)
        .map_err(|err| map_login_validation_error(&err))?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Created().finish())
}

/// Drop the caller's session.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["sessions"],
    operation_id = "logout"
)]
#[delete("/sessions")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::inbound::http::test_utils::{TestState, test_session_middleware};
    use actix_web::{App, http::StatusCode, test as actix_test};
    use serde_json::Value;

    fn app_with(
        state: TestState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state.into_data())
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").service(login).service(logout))
    }

    #[actix_web::test]
    async fn login_success_sets_session_cookie() {
        let user_id = UserId::random();
        let mut state = TestState::default();
        state
            .login
            .expect_authenticate()
            .withf(|creds| creds.email().as_ref() == "ana@x.example")
            .times(1)
            .returning(move |_| Ok(user_id));

        let app = actix_test::init_service(app_with(state)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/sessions")
                .set_json(&LoginRequest {
                    email: "ana@x.example".to_owned(),
                    password: "secret".to_owned(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        assert!(
            res.response()
                .cookies()
                .any(|cookie| cookie.name() == "session")
        );
    }

    #[actix_web::test]
    async fn login_rejects_wrong_credentials_with_unauthorised_status() {
        let mut state = TestState::default();
        state
            .login
            .expect_authenticate()
            .times(1)
            .returning(|_| Err(crate::domain::Error::unauthorized("invalid credentials")));

        let app = actix_test::init_service(app_with(state)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/sessions")
                .set_json(&LoginRequest {
                    email: "ana@x.example".to_owned(),
                    password: "wrong".to_owned(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(body["message"], "invalid credentials");
    }

    #[actix_web::test]
    async fn login_rejects_malformed_email() {
        let app = actix_test::init_service(app_with(TestState::default())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/sessions")
                .set_json(&LoginRequest {
                    email: "not-an-email".to_owned(),
                    password: "secret".to_owned(),
                })
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], serde_json::json!("invalid_request"));
        assert!(body["details"]["errors"]["email"].is_string());
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let app = actix_test::init_service(app_with(TestState::default())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/sessions")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
