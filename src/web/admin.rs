//! Admin settings page handlers.
//!
//! `GET` renders the form bound to the stored settings, `POST` persists the
//! submitted fields and redirects back. Both require an administrator.

use crate::{
    core::settings::{self, MaintenanceSettings, SettingsForm},
    web::{AppState, SETTINGS_PATH, WebError},
};
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::info;

/// Query string of the settings page
#[derive(Debug, Default, Deserialize)]
pub struct SettingsPageQuery {
    /// Set after a successful save to show a notice
    #[serde(default)]
    pub updated: Option<String>,
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), WebError> {
    if state.roles.resolve(headers).is_administrator() {
        Ok(())
    } else {
        Err(WebError::Forbidden)
    }
}

/// Renders the maintenance settings form.
pub async fn show_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SettingsPageQuery>,
) -> Result<Html<String>, WebError> {
    require_admin(&state, &headers)?;

    let current = settings::load_settings(&state.db).await?;
    let updated = query.updated.as_deref().is_some_and(settings::parse_bool);

    let html = state.templates.render_settings_page(
        SETTINGS_PATH,
        &current,
        &state.emergency_login_url(),
        updated,
    )?;
    Ok(Html(html))
}

/// Persists a submitted settings form.
pub async fn save_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, WebError> {
    require_admin(&state, &headers)?;

    let submitted = MaintenanceSettings::from(form);
    settings::save_settings(&state.db, &submitted).await?;
    info!("Maintenance settings updated from admin page");

    Ok(Redirect::to(&format!("{SETTINGS_PATH}?updated=true")))
}
