//! Transport configuration

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

/// Header Cloudflare's edge sets to the connecting client address
pub const DEFAULT_CLIENT_IP_HEADER: &str = "CF-Connecting-IP";

/// HTTP surface configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Reject requests whose `X-Forwarded-Proto` is not `https`
    #[serde(default)]
    pub require_https: bool,

    /// Header carrying the connecting client address
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,

    /// Use the TCP peer address when the header is absent
    #[serde(default)]
    pub trust_peer_address: bool,
}

fn default_client_ip_header() -> String {
    DEFAULT_CLIENT_IP_HEADER.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            require_https: false,
            client_ip_header: default_client_ip_header(),
            trust_peer_address: false,
        }
    }
}

impl HttpConfig {
    pub fn with_require_https(mut self, require_https: bool) -> Self {
        self.require_https = require_https;
        self
    }

    pub fn with_client_ip_header(mut self, header: impl Into<String>) -> Self {
        self.client_ip_header = header.into();
        self
    }

    pub fn with_trust_peer_address(mut self, trust: bool) -> Self {
        self.trust_peer_address = trust;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ddns_core::Result<()> {
        if HeaderName::from_bytes(self.client_ip_header.as_bytes()).is_err() {
            return Err(ddns_core::Error::config(format!(
                "Invalid client IP header name: '{}'",
                self.client_ip_header
            )));
        }
        Ok(())
    }
}
