//! Coaching service: configuration, startup and the HTTP API

pub mod api;
pub mod config;
pub mod startup;

pub use api::{create_router, ApiSettings, AppState};
pub use config::ServerConfig;
