//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::CallerIdentity;
use crate::domain::ports::{IncidentCommand, IncidentQuery, LoginService, UserCommand, UserQuery};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authentication use-case behind `POST /sessions`.
    pub login: Arc<dyn LoginService>,
    /// User read use-cases.
    pub users_query: Arc<dyn UserQuery>,
    /// User mutation use-cases.
    pub users_command: Arc<dyn UserCommand>,
    /// Incident read use-cases.
    pub incidents_query: Arc<dyn IncidentQuery>,
    /// Incident mutation use-cases.
    pub incidents_command: Arc<dyn IncidentCommand>,
}

impl HttpState {
    /// Bundle the driving ports handlers depend on.
    pub fn new(
        login: Arc<dyn LoginService>,
        users_query: Arc<dyn UserQuery>,
        users_command: Arc<dyn UserCommand>,
        incidents_query: Arc<dyn IncidentQuery>,
        incidents_command: Arc<dyn IncidentCommand>,
    ) -> Self {
        Self {
            login,
            users_query,
            users_command,
            incidents_query,
            incidents_command,
        }
    }

    /// Resolve the caller identity behind the current session, failing with
    /// `401 Unauthorized` when the session is absent or stale.
    pub async fn require_caller(&self, session: &SessionContext) -> ApiResult<CallerIdentity> {
        let user_id = session.require_user_id()?;
        self.users_query.identity(&user_id).await
    }
}
