//! Axum middleware that runs the access gate in front of every route.

use crate::{
    core::gate::{BlockResponse, GateDecision, GateRequest, decide},
    core::settings::load_settings,
    web::AppState,
};
use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::{HeaderName, HeaderValue, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, trace, warn};

/// Extracts the gate's view of the request from its query string.
///
/// A query string that cannot be decoded never requests a bypass.
#[must_use]
pub fn gate_request_from_uri(uri: &Uri) -> GateRequest {
    Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map(|Query(pairs)| GateRequest::from_query_pairs(pairs))
        .unwrap_or_default()
}

/// Loads the settings, runs the gate and either forwards the request or
/// answers with the block page.
///
/// A failing option store lets the request through; the gate never turns
/// its own errors into a failed request.
pub async fn maintenance_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let gate_request = gate_request_from_uri(request.uri());
    let caller = state.roles.resolve(request.headers());

    let settings = match load_settings(&state.db).await {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load maintenance settings, allowing request: {}", e);
            return next.run(request).await;
        }
    };

    match decide(&gate_request, caller, &settings, (state.clock)()) {
        GateDecision::Allow(reason) => {
            trace!(?reason, path = %request.uri().path(), "Gate allowed request");
            next.run(request).await
        }
        GateDecision::Block(block) => {
            trace!(path = %request.uri().path(), "Gate blocked request");
            block_response(&state, &block)
        }
    }
}

/// Turns a block decision into the terminal HTTP response.
fn block_response(state: &AppState, block: &BlockResponse) -> Response {
    let status = StatusCode::from_u16(block.status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);

    let body = state
        .templates
        .render_blocked_page(&block.body)
        .unwrap_or_else(|e| {
            warn!("Failed to render block page, sending bare message: {}", e);
            block.body.clone()
        });

    let mut response = (status, Body::from(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    for (name, value) in &block.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Skipping invalid block response header {}: {}", name, value),
        }
    }

    response
}
