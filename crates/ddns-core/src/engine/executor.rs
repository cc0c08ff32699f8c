//! Update executor
//!
//! Applies every address of a request to every hostname. Addresses are
//! processed one pass at a time, in order; within a pass the hostnames are
//! updated concurrently and share the request's [`ZoneCache`].
//!
//! There is no cross-hostname transaction: a hostname that fails does not
//! undo updates already applied to its siblings.

use futures::future::join_all;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::cache::ZoneCache;
use crate::config::BridgeConfig;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::request::UpdateRequest;
use crate::resolver::ZoneResolver;
use crate::traits::{DnsApi, DnsApiFactory, RecordType, UpdateResult};

/// Outcome for one (hostname, address) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameUpdate {
    /// Hostname that was updated
    pub hostname: String,
    /// Address that was applied
    pub address: String,
    /// What happened to the record
    pub result: UpdateResult,
}

/// Outcome of a whole request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// One entry per (address, hostname) pair, in pass order
    pub updates: Vec<HostnameUpdate>,
}

impl UpdateSummary {
    /// Number of records whose content was replaced
    pub fn updated_count(&self) -> usize {
        self.updates
            .iter()
            .filter(|u| matches!(u.result, UpdateResult::Updated { .. }))
            .count()
    }

    /// Number of records that already held the address
    pub fn unchanged_count(&self) -> usize {
        self.updates.len() - self.updated_count()
    }
}

/// Applies a normalized request through the DNS management API
pub struct UpdateExecutor {
    factory: Arc<dyn DnsApiFactory>,
    config: BridgeConfig,
}

impl UpdateExecutor {
    /// Create a new executor
    ///
    /// # Parameters
    ///
    /// - `factory`: binds an API client to each request's credentials
    /// - `config`: bridge configuration (validated here)
    pub fn new(factory: Arc<dyn DnsApiFactory>, config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { factory, config })
    }

    /// The configuration this executor runs with
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Apply `request` using `credentials`
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateSummary)`: every pair succeeded (updated or unchanged)
    /// - `Err(Error)`: the first failure, in address then hostname order
    pub async fn execute(
        &self,
        request: &UpdateRequest,
        credentials: &Credentials,
    ) -> Result<UpdateSummary> {
        let api = self.factory.connect(credentials)?;

        if self.config.verify_token {
            self.verify_token(api.as_ref()).await?;
        }

        let cache = ZoneCache::new();
        let resolver = ZoneResolver::new(api.as_ref(), self.config.zone_policy, credentials);
        let mut summary = UpdateSummary::default();

        for address in &request.addresses {
            let record_type = RecordType::for_address(address);
            debug!(
                "Update pass: {} ({}) for {} hostname(s)",
                address,
                record_type,
                request.hostnames.len()
            );

            let pass = request.hostnames.iter().map(|hostname| {
                update_hostname(api.as_ref(), &resolver, &cache, hostname, address, record_type)
            });
            let outcomes = join_all(pass).await;

            let mut first_error = None;
            for (hostname, outcome) in request.hostnames.iter().zip(outcomes) {
                match outcome {
                    Ok(result) => summary.updates.push(HostnameUpdate {
                        hostname: hostname.clone(),
                        address: address.clone(),
                        result,
                    }),
                    Err(e) => {
                        warn!("Failed to update {} -> {}: {}", hostname, address, e);
                        first_error.get_or_insert(e);
                    }
                }
            }

            if let Some(e) = first_error {
                return Err(e);
            }
        }

        info!(
            "Request complete: {} updated, {} unchanged",
            summary.updated_count(),
            summary.unchanged_count()
        );
        Ok(summary)
    }

    /// Fail fast when the token is not active
    async fn verify_token(&self, api: &dyn DnsApi) -> Result<()> {
        let status = api.verify_token().await?;
        if !status.is_active() {
            warn!("Rejected request: API token status is {}", status);
            return Err(Error::token_rejected(format!(
                "API token is not active (status: {status})."
            )));
        }
        debug!("API token verified");
        Ok(())
    }
}

/// Resolve and update a single hostname
async fn update_hostname(
    api: &dyn DnsApi,
    resolver: &ZoneResolver<'_>,
    cache: &ZoneCache,
    hostname: &str,
    address: &str,
    record_type: RecordType,
) -> Result<UpdateResult> {
    let (zone, record) = resolver.resolve(hostname, record_type, cache).await?;

    if same_address(&record.content, address) {
        info!("DNS record already has correct IP: {} -> {}", hostname, address);
        return Ok(UpdateResult::Unchanged { record });
    }

    let previous_content = record.content.clone();
    let desired = record.with_content(address);

    info!(
        "Updating DNS record: {} -> {} (was: {}) via {}",
        hostname,
        address,
        previous_content,
        api.api_name()
    );

    let record = api.update_record(&zone.id, &desired).await.map_err(|e| {
        error!("Record update failed for {}: {}", hostname, e);
        e
    })?;

    Ok(UpdateResult::Updated {
        record,
        previous_content,
    })
}

/// Compare addresses by value so "2001:db8::1" equals "2001:0db8:0:0::1"
fn same_address(current: &str, desired: &str) -> bool {
    match (current.parse::<IpAddr>(), desired.parse::<IpAddr>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => current == desired,
    }
}
