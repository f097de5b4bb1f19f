//! HTTP server configuration: layered settings and the runtime config.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use backend::domain::ports::AttachmentStore;
use backend::outbound::persistence::DbPool;

const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Settings layered from CLI flags, `HELPDESK_*` environment variables, and
/// configuration file via OrthoConfig. No secret has a baked-in default:
/// the session key comes from a file and the store key from the
/// environment.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HELPDESK")]
pub struct ServerSettings {
    /// Socket address to bind.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    pub bind_addr: String,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Allow an ephemeral, process-local session key (dev only).
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Set the `Secure` flag on the session cookie.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Base URL of the attachment store API.
    pub store_url: Option<String>,
    /// Bearer token for the attachment store, if required.
    pub store_api_key: Option<String>,
    /// Folder prefix for stored objects.
    #[ortho_config(default = "helpdesk-uploads".to_owned())]
    pub store_folder: String,
    /// Per-request timeout for store calls, in seconds.
    #[ortho_config(default = 30)]
    pub store_timeout_seconds: u64,
}

impl ServerSettings {
    /// Path of the session key file, falling back to the default location.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Timeout for attachment store calls.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_seconds.max(1))
    }
}

/// Resolve the session signing key from the configured key file.
///
/// Debug builds (and deployments that explicitly opt in) fall back to an
/// ephemeral key so local development works without provisioning secrets;
/// release builds refuse to start without key material.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the key file is unreadable or too short
/// and no ephemeral fallback applies.
pub fn resolve_session_key(settings: &ServerSettings) -> std::io::Result<Key> {
    let key_path = settings.session_key_file();
    match std::fs::read(&key_path) {
        Ok(bytes) if bytes.len() >= 32 => Ok(Key::derive_from(&bytes)),
        Ok(_) => Err(std::io::Error::other(format!(
            "session key at {} must be at least 32 bytes",
            key_path.display()
        ))),
        Err(err) => {
            if cfg!(debug_assertions) || settings.session_allow_ephemeral {
                warn!(path = %key_path.display(), error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {err}",
                    key_path.display()
                )))
            }
        }
    }
}

/// Runtime configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) pool: DbPool,
    pub(crate) store: Arc<dyn AttachmentStore>,
}

impl ServerConfig {
    /// Assemble the runtime configuration.
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        pool: DbPool,
        store: Arc<dyn AttachmentStore>,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            pool,
            store,
        }
    }
}
