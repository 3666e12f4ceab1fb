/// Application configuration loaded from `maintenance-gate.toml` and the environment
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use app::{AppConfig, load_app_configuration};
