//! Cloudflare API v4 wire types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use ddns_core::traits::{DnsRecord, RecordType, Zone};

/// Envelope wrapping every Cloudflare v4 response
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<CloudflareError>,
}

#[derive(Debug, Deserialize)]
pub struct CloudflareError {
    pub code: i64,
    pub message: String,
}

/// Join the envelope's error messages into one line
pub fn error_messages(errors: &[CloudflareError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.message, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
}

impl From<CloudflareZone> for Zone {
    fn from(zone: CloudflareZone) -> Self {
        Zone {
            id: zone.id,
            name: zone.name,
        }
    }
}

/// Result of `GET /user/tokens/verify`
#[derive(Debug, Deserialize)]
pub struct CloudflareTokenStatus {
    pub status: String,
}

/// PUT body for a full record overwrite
///
/// Every mutable field is sent back as read so only `content` changes,
/// including fields the bridge does not model (tags, settings, ...).
#[derive(Debug, Serialize)]
pub struct CloudflareRecordUpdate<'a> {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: &'a str,
    pub content: &'a str,
    pub proxied: bool,
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<&'a str>,
    #[serde(flatten)]
    pub extra: &'a Map<String, Value>,
}

impl<'a> From<&'a DnsRecord> for CloudflareRecordUpdate<'a> {
    fn from(record: &'a DnsRecord) -> Self {
        Self {
            record_type: record.record_type,
            name: &record.name,
            content: &record.content,
            proxied: record.proxied,
            ttl: record.ttl,
            comment: record.comment.as_deref(),
            extra: &record.extra,
        }
    }
}
