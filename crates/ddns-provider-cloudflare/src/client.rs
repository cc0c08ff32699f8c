//! Cloudflare API v4 client bound to one request's API token

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use ddns_core::traits::{DnsApi, DnsRecord, RecordType, TokenStatus, Zone};
use ddns_core::{Error, Result};

use crate::types::{
    CloudflareRecordUpdate, CloudflareResponse, CloudflareTokenStatus, CloudflareZone,
    error_messages,
};

/// Cloudflare DNS management API client
///
/// Created per request by [`crate::CloudflareFactory`]. Holds the caller's
/// API token for the lifetime of that request only.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the client will:
/// - Perform all GET requests (token, zone and record lookups)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareClient {
    client: reqwest::Client,
    base_url: String,
    /// ⚠️ NEVER log this value
    api_token: String,
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareClient {
    pub(crate) fn new(
        client: reqwest::Client,
        base_url: String,
        api_token: String,
        dry_run: bool,
    ) -> Self {
        Self {
            client,
            base_url,
            api_token,
            dry_run,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an authenticated request and unwrap the v4 envelope
    ///
    /// # Parameters
    ///
    /// - `request`: the request to send (auth is added here)
    /// - `action`: short description used in error messages ("Zone lookup")
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
        let (status, body) = self.execute(request, action).await?;
        unwrap_envelope(action, status, &body)
    }

    /// Send an authenticated request, returning its status and raw body
    async fn execute(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<(StatusCode, String)> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("{action} failed: HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::upstream(format!("{action} failed: unreadable response: {e}")))?;

        debug!("{}: HTTP {} ({} bytes)", action, status, body.len());
        Ok((status, body))
    }
}

fn unwrap_envelope<T: DeserializeOwned>(action: &str, status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        let detail = serde_json::from_str::<CloudflareResponse<serde_json::Value>>(body)
            .map(|envelope| error_messages(&envelope.errors))
            .unwrap_or_else(|_| body.to_string());
        return Err(status_error(action, status, &detail));
    }

    let envelope: CloudflareResponse<T> = serde_json::from_str(body)
        .map_err(|e| Error::upstream(format!("{action} failed: invalid response format: {e}")))?;

    if !envelope.success {
        return Err(Error::upstream(format!(
            "{action} failed: {}",
            error_messages(&envelope.errors)
        )));
    }

    envelope
        .result
        .ok_or_else(|| Error::upstream(format!("{action} failed: response has no result")))
}

/// Whether the verify endpoint refused the token itself
///
/// Cloudflare answers an invalid or revoked token with 401/403, or with a
/// `success: false` envelope.
fn token_refused(status: StatusCode, body: &str) -> bool {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => true,
        s if s.is_success() => {
            serde_json::from_str::<CloudflareResponse<serde_json::Value>>(body)
                .is_ok_and(|envelope| !envelope.success)
        }
        _ => false,
    }
}

/// Map a non-success HTTP status to an upstream error
fn status_error(action: &str, status: StatusCode, detail: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::upstream(format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {status}"
        )),
        404 => Error::upstream(format!("{action} failed: not found. Status: {status}")),
        429 => Error::upstream(format!(
            "Rate limit exceeded. Please retry later. Status: {status}"
        )),
        500..=599 => Error::upstream(format!(
            "Cloudflare server error: {status} - {detail}"
        )),
        _ => Error::upstream(format!("{action} failed: {status} - {detail}")),
    }
}

#[async_trait]
impl DnsApi for CloudflareClient {
    /// ```http
    /// GET /user/tokens/verify
    /// ```
    ///
    /// A refused token is [`Error::TokenRejected`]; any other failure is
    /// an upstream error.
    async fn verify_token(&self) -> Result<TokenStatus> {
        const ACTION: &str = "Token verification";

        let request = self.client.get(self.url("/user/tokens/verify"));
        let (status, body) = self.execute(request, ACTION).await?;

        if token_refused(status, &body) {
            debug!("{}: token refused (HTTP {})", ACTION, status);
            return Err(Error::token_rejected("API token is invalid or revoked."));
        }

        let token: CloudflareTokenStatus = unwrap_envelope(ACTION, status, &body)?;
        Ok(TokenStatus::parse(&token.status))
    }

    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn list_zones(&self, name: Option<&str>) -> Result<Vec<Zone>> {
        let mut request = self.client.get(self.url("/zones"));
        if let Some(name) = name {
            request = request.query(&[("name", name)]);
        }

        let zones: Vec<CloudflareZone> = self.send(request, "Zone lookup").await?;
        Ok(zones.into_iter().map(Zone::from).collect())
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com&type=A
    /// ```
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>> {
        let request = self
            .client
            .get(self.url(&format!("/zones/{zone_id}/dns_records")))
            .query(&[("name", name), ("type", record_type.as_str())]);

        let mut records: Vec<DnsRecord> = self.send(request, "Record lookup").await?;
        for record in &mut records {
            if record.zone_id.is_empty() {
                record.zone_id = zone_id.to_string();
            }
        }
        Ok(records)
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// ```
    ///
    /// Skipped in dry-run mode; the record is returned as if written.
    async fn update_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        let url = self.url(&format!("/zones/{zone_id}/dns_records/{}", record.id));
        let payload = CloudflareRecordUpdate::from(record);

        if self.dry_run {
            info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload).unwrap_or_default()
            );
            return Ok(record.clone());
        }

        let request = self.client.put(&url).json(&payload);
        let mut updated: DnsRecord = self.send(request, "Record update").await?;
        if updated.zone_id.is_empty() {
            updated.zone_id = zone_id.to_string();
        }

        info!(
            "DNS record updated successfully: {} -> {}",
            updated.name, updated.content
        );
        Ok(updated)
    }

    fn api_name(&self) -> &'static str {
        "cloudflare"
    }
}
