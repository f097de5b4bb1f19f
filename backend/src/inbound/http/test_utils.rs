//! Test helpers for inbound HTTP components.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};
use std::sync::Arc;

use crate::domain::ports::{
    MockIncidentCommand, MockIncidentQuery, MockLoginService, MockUserCommand, MockUserQuery,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mock bundle matching [`HttpState`]; set expectations on the mocks a test
/// exercises and convert with [`TestState::into_data`]. Untouched mocks
/// panic on use, which is the assertion we want.
pub struct TestState {
    /// Login port mock.
    pub login: MockLoginService,
    /// User query port mock.
    pub users_query: MockUserQuery,
    /// User command port mock.
    pub users_command: MockUserCommand,
    /// Incident query port mock.
    pub incidents_query: MockIncidentQuery,
    /// Incident command port mock.
    pub incidents_command: MockIncidentCommand,
}

impl Default for TestState {
    fn default() -> Self {
        Self {
            login: MockLoginService::new(),
            users_query: MockUserQuery::new(),
            users_command: MockUserCommand::new(),
            incidents_query: MockIncidentQuery::new(),
            incidents_command: MockIncidentCommand::new(),
        }
    }
}

impl TestState {
    /// Wrap the mocks as handler state.
    pub fn into_data(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(self.login),
            Arc::new(self.users_query),
            Arc::new(self.users_command),
            Arc::new(self.incidents_query),
            Arc::new(self.incidents_command),
        ))
    }
}

/// Backdoor route that seeds a session with the given user id, so handler
/// tests can obtain a cookie without driving the login flow.
pub fn seed_session_service() -> actix_web::Resource {
    web::resource("/__test/sessions/{user_id}").route(web::post().to(
        |session: SessionContext, path: web::Path<String>| async move {
            let id = UserId::new(path.into_inner())
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            session.persist_user(&id)?;
            Ok::<_, Error>(HttpResponse::Ok().finish())
        },
    ))
}

/// Log in through the seed route and return the session cookie.
pub async fn login_as<S, B>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(&format!("/__test/sessions/{user_id}"))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "seed login failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
