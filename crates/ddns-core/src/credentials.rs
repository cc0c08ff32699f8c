//! Credential extraction
//!
//! A DDNS client authenticates either with HTTP Basic-Auth (identity and
//! secret) or with a `token` query parameter (secret only).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

use crate::error::{Error, Result};
use crate::params::QueryParams;

/// Identity/secret pair presented by a DDNS client
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account or base-domain name; empty for token-only flows
    pub identity: String,
    /// API token
    /// ⚠️ NEVER log this value
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from parts
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// Extract credentials from the Authorization header value and query
    ///
    /// The Basic-Auth password wins; when it is empty (or no header was sent)
    /// the `token` parameter is used with an empty identity.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAuthorization`] if the header is present but malformed
    /// - [`Error::AuthMissing`] if no secret could be found at all
    pub fn extract(authorization: Option<&str>, params: &QueryParams) -> Result<Self> {
        let (identity, password) = match authorization {
            Some(value) => parse_basic_auth(value)?,
            None => (String::new(), String::new()),
        };

        if !password.is_empty() {
            return Ok(Self::new(identity, password));
        }

        match params.get("token") {
            Some(token) => Ok(Self::new(identity, token)),
            None => Err(Error::auth_missing()),
        }
    }
}

/// Decode a `Basic <base64(identity:secret)>` header value
///
/// The decoded value must contain a colon and must not contain control
/// characters (`%x00-1F / %x7F`, RFC 5234 CTL).
fn parse_basic_auth(value: &str) -> Result<(String, String)> {
    let (scheme, encoded) = value
        .trim()
        .split_once(' ')
        .ok_or_else(Error::invalid_authorization)?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(Error::invalid_authorization());
    }

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| Error::invalid_authorization())?;
    let decoded = String::from_utf8(bytes).map_err(|_| Error::invalid_authorization())?;

    if decoded.chars().any(|c| c.is_ascii_control()) {
        return Err(Error::invalid_authorization());
    }

    let (identity, secret) = decoded
        .split_once(':')
        .ok_or_else(Error::invalid_authorization)?;

    Ok((identity.to_string(), secret.to_string()))
}
