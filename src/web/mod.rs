//! Web host - the axum server the gate protects.
//!
//! Serves the site's static content, the admin settings page and a health
//! probe. The gate middleware wraps everything except the health probe.

/// Settings page handlers
pub mod admin;
/// The gate as an axum middleware
pub mod middleware;
/// Caller role resolution
pub mod role;
/// Page templates
pub mod templates;

use crate::{config::AppConfig, errors::Error};
use axum::{
    Router,
    http::StatusCode,
    middleware as axum_mw,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use role::{RoleResolver, TokenRoleResolver};
use sea_orm::DatabaseConnection;
use std::{path::Path, sync::Arc};
use templates::Templates;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

/// Path of the admin settings page
pub const SETTINGS_PATH: &str = "/admin/maintenance";
/// Path of the health probe, reachable during maintenance
pub const HEALTH_PATH: &str = "/healthz";

/// Source of "now" for the gate
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Shared data available to the middleware and every handler.
#[derive(Clone)]
pub struct AppState {
    /// Option store connection
    pub db: DatabaseConnection,
    /// Classifies callers as administrator or visitor
    pub roles: Arc<dyn RoleResolver>,
    /// Compiled page templates
    pub templates: Arc<Templates>,
    /// Current time, injectable for tests
    pub clock: Clock,
    /// Public base URL of the site
    pub home_url: String,
}

impl AppState {
    /// Builds the state the binary runs with: token-based roles and the system clock.
    pub fn from_config(db: DatabaseConnection, config: &AppConfig) -> crate::errors::Result<Self> {
        Ok(Self {
            db,
            roles: Arc::new(TokenRoleResolver::new(config.admin_tokens.iter().cloned())),
            templates: Arc::new(Templates::new()?),
            clock: Arc::new(Utc::now),
            home_url: config.home_url.clone(),
        })
    }

    /// Replaces the clock, e.g. with a fixed instant.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The URL that skips the gate, as shown on the settings page.
    #[must_use]
    pub fn emergency_login_url(&self) -> String {
        format!(
            "{}/?{}={}",
            self.home_url.trim_end_matches('/'),
            crate::core::gate::BYPASS_PARAM,
            crate::core::gate::BYPASS_VALUE
        )
    }
}

/// Errors surfaced by the admin handlers
#[derive(Debug)]
pub enum WebError {
    /// Caller is not an administrator
    Forbidden,
    /// Anything else went wrong
    Internal(Error),
}

impl From<Error> for WebError {
    fn from(value: Error) -> Self {
        Self::Internal(value)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, "Sorry, you are not allowed to access this page.")
                    .into_response()
            }
            Self::Internal(e) => {
                error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Builds the full router: gated site and admin page plus the health probe.
pub fn build_router(state: AppState, site_root: &Path) -> Router {
    let gated = Router::new()
        .route(
            SETTINGS_PATH,
            get(admin::show_settings).post(admin::save_settings),
        )
        .fallback_service(ServeDir::new(site_root))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::maintenance_gate,
        ));

    Router::new()
        .route(HEALTH_PATH, get(health))
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config.bind_addr` and serves until the process is stopped.
pub async fn serve(config: &AppConfig, db: DatabaseConnection) -> crate::errors::Result<()> {
    let state = AppState::from_config(db, config)?;
    let app = build_router(state, &config.site_root);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "Serving {} on {} (settings at {})",
        config.site_root.display(),
        config.bind_addr,
        SETTINGS_PATH
    );

    axum::serve(listener, app).await?;
    Ok(())
}
