//! HTTP surface of the DDNS bridge
//!
//! Accepts legacy DDNS update calls (`GET /update`, `GET /nic/update`, ...),
//! hands them to [`ddns_core::Bridge`] and maps the outcome to a plain-text
//! response.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::HttpConfig;
pub use errors::ApiError;
pub use routes::create_routes;
pub use state::AppState;
