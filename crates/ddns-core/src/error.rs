//! Error types for the DDNS bridge
//!
//! Every variant carries the exact human-readable reason that is returned to
//! the DDNS client, so `Display` doubles as the response body.

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Neither Basic-Auth nor a `token` parameter was presented
    #[error("{0}")]
    AuthMissing(String),

    /// Malformed Authorization header (encoding, missing colon, control characters)
    #[error("{0}")]
    InvalidAuthorization(String),

    /// Credential was rejected by upstream token verification
    #[error("{0}")]
    TokenRejected(String),

    /// Hostname(s) or address(es) missing after normalization
    #[error("{0}")]
    ParamMissing(String),

    /// An address that does not parse as IPv4 or IPv6
    #[error("{0}")]
    InvalidAddress(String),

    /// Request did not arrive over HTTPS while HTTPS is required
    #[error("{0}")]
    InsecureTransport(String),

    /// `ip=auto` was requested but the transport gave no client address
    #[error("{0}")]
    ClientIpUnavailable(String),

    /// No zone matched
    #[error("{0}")]
    NoZone(String),

    /// More than one zone matched
    #[error("{0}")]
    AmbiguousZone(String),

    /// No record matched; records are never created by the bridge
    #[error("{0}")]
    NoRecord(String),

    /// More than one record matched
    #[error("{0}")]
    AmbiguousRecord(String),

    /// The DNS management API failed or was unreachable
    #[error("{0}")]
    Upstream(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything not anticipated above
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// No credential presented at all
    pub fn auth_missing() -> Self {
        Self::AuthMissing("API token missing.".to_string())
    }

    /// Authorization header could not be parsed
    pub fn invalid_authorization() -> Self {
        Self::InvalidAuthorization("Invalid authorization value.".to_string())
    }

    /// Create a token rejection error
    pub fn token_rejected(msg: impl Into<String>) -> Self {
        Self::TokenRejected(msg.into())
    }

    /// Hostname(s) or address(es) absent
    pub fn param_missing() -> Self {
        Self::ParamMissing("You must specify both hostname(s) and IP address(es)".to_string())
    }

    /// Create an invalid address error
    pub fn invalid_address(address: &str) -> Self {
        Self::InvalidAddress(format!("Invalid IP address '{address}'."))
    }

    /// Plain HTTP where HTTPS is required
    pub fn insecure_transport() -> Self {
        Self::InsecureTransport("Please use a HTTPS connection.".to_string())
    }

    /// `ip=auto` without a transport-provided address
    pub fn client_ip_unavailable() -> Self {
        Self::ClientIpUnavailable("Client IP address could not be determined.".to_string())
    }

    /// Create a "no zone" error
    ///
    /// `scope` describes what was searched, e.g. `zone 'example.com'`.
    pub fn no_zone(scope: &str) -> Self {
        Self::NoZone(format!("No zone found for {scope}."))
    }

    /// Create an "ambiguous zone" error
    pub fn ambiguous_zone(scope: &str, count: usize) -> Self {
        Self::AmbiguousZone(format!(
            "Found more than one zone ({count}) for {scope}. \
             The API token must be scoped to a single zone."
        ))
    }

    /// Create a "no record" error
    pub fn no_record(name: &str, record_type: &str) -> Self {
        Self::NoRecord(format!(
            "No {record_type} record found for '{name}'. It must be created manually."
        ))
    }

    /// Create an "ambiguous record" error
    pub fn ambiguous_record(name: &str, record_type: &str, count: usize) -> Self {
        Self::AmbiguousRecord(format!(
            "Found more than one {record_type} record ({count}) for '{name}'. \
             Ambiguous record set."
        ))
    }

    /// Create an upstream API error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
