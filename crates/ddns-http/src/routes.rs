use crate::handlers;
use crate::state::AppState;
use axum::{Router, middleware, routing::any};

/// Build the bridge router
///
/// Update calls are matched by path suffix in the fallback, so both
/// `/update` and `/nic/update` (or any prefix) reach the bridge. The
/// HTTPS requirement wraps every route, the fallback included.
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/favicon.ico", any(handlers::no_content))
        .route("/robots.txt", any(handlers::no_content))
        .fallback(handlers::dispatch)
        .layer(middleware::from_fn_with_state(state.clone(), handlers::require_https))
        .with_state(state)
}
