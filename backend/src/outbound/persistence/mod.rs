//! PostgreSQL persistence adapters built on Diesel and `diesel-async`.

mod diesel_incident_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_incident_repository::DieselIncidentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
