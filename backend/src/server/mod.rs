//! Server construction and middleware wiring.

mod config;

pub use config::{ServerConfig, ServerSettings, resolve_session_key};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::{IncidentService, UserService};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::incidents::{
    add_incident_files, create_incident, delete_incident, incident_detail, list_incidents,
    remove_incident_file, update_incident,
};
use backend::inbound::http::sessions::{login, logout};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{
    change_password, current_user, delete_user, list_users, register,
};
use backend::outbound::persistence::{DieselIncidentRepository, DieselUserRepository};
use backend::outbound::security::Argon2PasswordHasher;

/// Wire the domain services over their outbound adapters.
fn build_http_state(config: &ServerConfig) -> HttpState {
    let user_service = Arc::new(UserService::new(
        Arc::new(DieselUserRepository::new(config.pool.clone())),
        Arc::new(Argon2PasswordHasher),
    ));
    let incident_service = Arc::new(IncidentService::new(
        Arc::new(DieselIncidentRepository::new(config.pool.clone())),
        config.store.clone(),
    ));
    HttpState::new(
        user_service.clone(),
        user_service.clone(),
        user_service,
        incident_service.clone(),
        incident_service,
    )
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(register)
        .service(list_users)
        .service(current_user)
        .service(change_password)
        .service(delete_user)
        .service(list_incidents)
        .service(create_incident)
        .service(incident_detail)
        .service(update_incident)
        .service(delete_incident)
        .service(add_incident_files)
        .service(remove_incident_file);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        pool: _,
        store: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
