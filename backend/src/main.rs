//! Backend entry-point: loads configuration and wires the REST server.

mod server;

use std::sync::Arc;

use actix_web::cookie::SameSite;
use actix_web::web;
use ortho_config::OrthoConfig;
use reqwest::Url;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::outbound::storage::{AttachmentStoreConfig, HttpAttachmentStore};

use server::{ServerConfig, ServerSettings, create_server, resolve_session_key};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(std::io::Error::other)?;

    let key = resolve_session_key(&settings)?;
    let bind_addr = settings
        .bind_addr
        .parse()
        .map_err(|err| std::io::Error::other(format!("invalid bind address: {err}")))?;

    let database_url = settings
        .database_url
        .clone()
        .ok_or_else(|| std::io::Error::other("HELPDESK_DATABASE_URL must be set"))?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(std::io::Error::other)?;

    let store_url = settings
        .store_url
        .clone()
        .ok_or_else(|| std::io::Error::other("HELPDESK_STORE_URL must be set"))?;
    let store_url = Url::parse(&store_url)
        .map_err(|err| std::io::Error::other(format!("invalid store URL: {err}")))?;
    let store_config = AttachmentStoreConfig::new(store_url, settings.store_api_key.clone())
        .with_folder(settings.store_folder.clone())
        .with_timeout(settings.store_timeout());
    let store = Arc::new(HttpAttachmentStore::new(store_config).map_err(std::io::Error::other)?);

    let config = ServerConfig::new(
        key,
        settings.cookie_secure,
        SameSite::Lax,
        bind_addr,
        pool,
        store,
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
