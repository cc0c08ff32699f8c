use axum::{
    body::{self, Body},
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ddns_core::{Error, QueryParams, UpdateCall};
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::{ApiError, text_response};
use crate::state::AppState;

/// Path suffix that identifies an update call
const UPDATE_SUFFIX: &str = "/update";

/// Upper bound on the request body read; its content is never used
const MAX_BODY_BYTES: usize = 64 * 1024;

pub async fn no_content() -> Response {
    text_response(StatusCode::NO_CONTENT, "")
}

/// Rejects plain-HTTP requests on every path when `require_https` is set
pub async fn require_https(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.config.require_https && !is_https(request.headers()) {
        return ApiError::from(Error::insecure_transport()).into_response();
    }
    next.run(request).await
}

pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    if !request.uri().path().ends_with(UPDATE_SUFFIX) {
        return text_response(StatusCode::NOT_FOUND, "Not Found.");
    }

    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed.");
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
        return response;
    }

    match update(&state, request).await {
        Ok(()) => text_response(StatusCode::OK, state.bridge.config().success_body.clone()),
        Err(e) => ApiError::from(e)
            .with_param_missing_status(state.bridge.config().missing_params_status)
            .into_response(),
    }
}

async fn update(state: &AppState, request: Request) -> ddns_core::Result<()> {
    let (parts, body) = request.into_parts();

    let authorization = parts
        .headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| Error::invalid_authorization()))
        .transpose()?;

    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client_ip = client_ip(&state.config, &parts.headers, peer);
    let params = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
        Ok(Query(pairs)) => QueryParams::from_pairs(pairs),
        Err(e) => {
            debug!("Unreadable query string: {}", e);
            QueryParams::default()
        }
    };

    log_body_size(body).await;

    let summary = state
        .bridge
        .handle(UpdateCall {
            authorization,
            params: &params,
            client_ip,
        })
        .await?;

    debug!(
        "{} {}: {} updated, {} unchanged",
        parts.method,
        parts.uri.path(),
        summary.updated_count(),
        summary.unchanged_count()
    );
    Ok(())
}

/// `X-Forwarded-Proto` as set by the fronting proxy
fn is_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// Connecting client address: the configured header first, then the TCP
/// peer when trusted
fn client_ip(config: &HttpConfig, headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
    let from_header = headers
        .get(config.client_ip_header.as_str())
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    match from_header {
        Some(ip) => Some(ip),
        None if config.trust_peer_address => peer,
        None => None,
    }
}

async fn log_body_size(body: Body) {
    match body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => debug!("Request body: {} bytes (ignored)", bytes.len()),
        Err(e) => debug!("Request body not read: {}", e),
    }
}
