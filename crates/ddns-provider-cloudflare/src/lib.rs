// # Cloudflare DNS Management API
//
// Implements the bridge's `DnsApi` capability over the Cloudflare v4 REST API.
//
// ## Behavior
//
// - One API client per request, bound to the token the DDNS client presented
// - HTTP timeout configured (30 seconds by default)
// - Specific error messages for HTTP status codes (401/403, 404, 429, 5xx)
// - Dry-run mode: lookups run, the PUT is logged and skipped
// - No retries, no caching beyond the request
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - A connect attempt with an empty token fails fast
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Verify Token: GET `/user/tokens/verify`
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

mod client;
mod types;

pub use client::CloudflareClient;

use ddns_core::traits::{DnsApi, DnsApiFactory};
use ddns_core::{ApiRegistry, Credentials, Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Factory binding Cloudflare clients to request credentials
///
/// The underlying HTTP connection pool is built once and shared by every
/// client it hands out.
#[derive(Debug, Clone)]
pub struct CloudflareFactory {
    client: reqwest::Client,
    base_url: String,
    dry_run: bool,
}

impl CloudflareFactory {
    /// Create a new factory
    ///
    /// # Parameters
    ///
    /// - `base_url`: API root, e.g. [`CLOUDFLARE_API_BASE`]
    /// - `timeout`: per-request HTTP timeout
    /// - `dry_run`: if true, perform GET requests but skip PUT updates
    pub fn new(base_url: impl Into<String>, timeout: Duration, dry_run: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::config("Cloudflare API base URL cannot be empty"));
        }

        if dry_run {
            tracing::warn!("Cloudflare API running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            client,
            base_url,
            dry_run,
        })
    }

    /// Factory for the public Cloudflare API in live mode
    pub fn live() -> Result<Self> {
        Self::new(CLOUDFLARE_API_BASE, DEFAULT_HTTP_TIMEOUT, false)
    }

    /// Whether clients from this factory skip writes
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl DnsApiFactory for CloudflareFactory {
    fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DnsApi>> {
        if credentials.secret.is_empty() {
            return Err(Error::auth_missing());
        }

        Ok(Box::new(CloudflareClient::new(
            self.client.clone(),
            self.base_url.clone(),
            credentials.secret.clone(),
            self.dry_run,
        )))
    }
}

/// Register the Cloudflare API with a registry
///
/// # Example
///
/// ```rust,ignore
/// use ddns_core::ApiRegistry;
///
/// let registry = ApiRegistry::new();
/// ddns_provider_cloudflare::register(&registry, CloudflareFactory::live()?);
/// ```
pub fn register(registry: &ApiRegistry, factory: CloudflareFactory) {
    registry.register_api("cloudflare", Arc::new(factory));
}
