use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use ddns_core::Error;
use tracing::{error, warn};

/// `Content-Type` of every response
pub const TEXT_PLAIN: &str = "text/plain;charset=UTF-8";

/// Plain-text, never-cached response
pub fn text_response(status: StatusCode, body: impl Into<String>) -> Response {
    let mut response = (status, body.into()).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// A bridge error on its way to the DDNS client
pub struct ApiError {
    pub error: Error,
    /// Status used for [`Error::ParamMissing`] (400 or 422)
    pub param_missing_status: StatusCode,
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self {
            error,
            param_missing_status: StatusCode::BAD_REQUEST,
        }
    }
}

impl ApiError {
    pub fn with_param_missing_status(mut self, status: u16) -> Self {
        self.param_missing_status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
        self
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            Error::AuthMissing(_) | Error::TokenRejected(_) => StatusCode::UNAUTHORIZED,

            Error::ParamMissing(_) => self.param_missing_status,

            Error::InvalidAuthorization(_)
            | Error::InvalidAddress(_)
            | Error::InsecureTransport(_) => StatusCode::BAD_REQUEST,

            Error::NoZone(_) | Error::NoRecord(_) => StatusCode::NOT_FOUND,

            Error::AmbiguousZone(_) | Error::AmbiguousRecord(_) => StatusCode::CONFLICT,

            Error::Upstream(_) => StatusCode::BAD_GATEWAY,

            Error::ClientIpUnavailable(_) | Error::Config(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed ({}): {}", status.as_u16(), self.error);
        } else {
            warn!("Rejected request ({}): {}", status.as_u16(), self.error);
        }

        text_response(status, self.error.to_string())
    }
}
