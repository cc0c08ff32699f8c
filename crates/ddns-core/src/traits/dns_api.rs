// # DNS Management API Capability
//
// Defines the interface the bridge consumes from the zone/record-oriented
// DNS management API. The bridge never implements the API itself; it only
// looks zones and records up and writes a new `content` back.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
// - Tests: counting in-memory doubles
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{Credentials, DnsApiFactory};
//
// let api = factory.connect(&credentials)?;
// let zones = api.list_zones(Some("example.com")).await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::credentials::Credentials;

/// A zone owned by the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Opaque zone identifier
    pub id: String,
    /// Registrable domain of the zone
    pub name: String,
}

/// Address record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Pick the record type for an address string.
    ///
    /// This is a heuristic: anything containing a `.` is treated as IPv4.
    /// It does not validate the address.
    pub fn for_address(address: &str) -> Self {
        if address.contains('.') {
            RecordType::A
        } else {
            RecordType::Aaaa
        }
    }

    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An address record owned by the upstream API
///
/// The bridge only ever changes `content`; every other field is written
/// back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Opaque record identifier
    pub id: String,
    /// Zone the record belongs to
    #[serde(default)]
    pub zone_id: String,
    /// Fully qualified record name
    pub name: String,
    /// A or AAAA
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// The address
    pub content: String,
    /// Whether traffic is routed through the provider's edge
    #[serde(default)]
    pub proxied: bool,
    /// Free-form comment
    #[serde(default)]
    pub comment: Option<String>,
    /// Time-to-live (1 means "automatic" on some providers)
    pub ttl: u32,
    /// Fields the bridge does not interpret (tags, settings, ...),
    /// resubmitted exactly as read
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DnsRecord {
    /// Copy of this record with only the address replaced
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}

/// Status reported by token verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// Token may be used
    Active,
    /// Token exists but is disabled
    Disabled,
    /// Token has expired
    Expired,
    /// Any other provider-specific status
    Other(String),
}

impl TokenStatus {
    /// Parse a provider status string
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "active" => TokenStatus::Active,
            "disabled" => TokenStatus::Disabled,
            "expired" => TokenStatus::Expired,
            _ => TokenStatus::Other(status.to_string()),
        }
    }

    /// Whether the token may be used
    pub fn is_active(&self) -> bool {
        matches!(self, TokenStatus::Active)
    }
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStatus::Active => f.write_str("active"),
            TokenStatus::Disabled => f.write_str("disabled"),
            TokenStatus::Expired => f.write_str("expired"),
            TokenStatus::Other(s) => f.write_str(s),
        }
    }
}

/// Result of applying an address to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record content was replaced
    Updated {
        /// The record as returned by the API after the write
        record: DnsRecord,
        /// The previous address
        previous_content: String,
    },
    /// Record already held the address (no write issued)
    Unchanged {
        /// The record as read
        record: DnsRecord,
    },
}

/// Client for the DNS management API, bound to one credential
///
/// # Trust Level: Untrusted
///
/// Implementations perform API calls only. They do not retry, do not cache
/// between calls and do not decide whether an update is needed; all of that
/// is owned by the resolver and executor in this crate.
///
/// Any non-success response or transport failure must surface as
/// [`crate::Error::Upstream`] (or a more specific variant where the status
/// is unambiguous, e.g. a rejected token).
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// Check whether the bound token is usable
    async fn verify_token(&self) -> Result<TokenStatus, crate::Error>;

    /// List zones visible to the credential
    ///
    /// - `name`: restrict to zones with exactly this name, or `None` for all
    async fn list_zones(&self, name: Option<&str>) -> Result<Vec<Zone>, crate::Error>;

    /// List records in a zone by name and type
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Write a record back, replacing all of its fields
    ///
    /// The caller passes the full record so that `proxied`, `comment`, `ttl`,
    /// `type`, `name` and every field in `extra` are resubmitted unchanged.
    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the API name (for logging/debugging)
    fn api_name(&self) -> &'static str;
}

/// Helper trait for binding an API client to a request's credentials
pub trait DnsApiFactory: Send + Sync {
    /// Create a client that authenticates with `credentials`
    fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DnsApi>, crate::Error>;
}
