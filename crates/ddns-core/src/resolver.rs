//! Zone and record resolution
//!
//! Given a hostname, finds exactly one zone and exactly one address record
//! of the requested type. Anything other than exactly one is an error whose
//! message names what was searched, since "no zone", "multiple zones",
//! "no record" and "multiple records" each need a different operator fix.

use tracing::debug;

use crate::cache::ZoneCache;
use crate::config::ZonePolicy;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::traits::{DnsApi, DnsRecord, RecordType, Zone};

/// Cache key used for the single zone of a credential-scoped token
const CREDENTIAL_SCOPE_KEY: &str = "*";

/// Resolves hostnames to zones and records for one request
pub struct ZoneResolver<'a> {
    api: &'a dyn DnsApi,
    policy: ZonePolicy,
    credentials: &'a Credentials,
}

impl<'a> ZoneResolver<'a> {
    /// Create a resolver bound to one API client and credential
    pub fn new(api: &'a dyn DnsApi, policy: ZonePolicy, credentials: &'a Credentials) -> Self {
        Self {
            api,
            policy,
            credentials,
        }
    }

    /// Resolve both zone and record for `hostname`
    pub async fn resolve(
        &self,
        hostname: &str,
        record_type: RecordType,
        cache: &ZoneCache,
    ) -> Result<(Zone, DnsRecord)> {
        let zone = self.resolve_zone(hostname, cache).await?;
        let record = self.resolve_record(&zone, hostname, record_type).await?;
        Ok((zone, record))
    }

    /// Resolve the zone for `hostname`, memoized in `cache`
    pub async fn resolve_zone(&self, hostname: &str, cache: &ZoneCache) -> Result<Zone> {
        match self.policy {
            ZonePolicy::CredentialScoped => {
                cache
                    .get_or_lookup(CREDENTIAL_SCOPE_KEY, || self.lookup_scoped_zone())
                    .await
            }
            ZonePolicy::SuffixMatched => {
                let domain = registrable_domain(hostname, &self.credentials.identity);
                cache
                    .get_or_lookup(&domain, || self.lookup_named_zone(&domain))
                    .await
            }
        }
    }

    /// Find the single record of `record_type` named `hostname` in `zone`
    pub async fn resolve_record(
        &self,
        zone: &Zone,
        hostname: &str,
        record_type: RecordType,
    ) -> Result<DnsRecord> {
        debug!(
            "Looking up record: {} (type: {}) in zone {}",
            hostname, record_type, zone.name
        );

        let wanted = trim_root(hostname);
        let mut matches: Vec<DnsRecord> = self
            .api
            .list_records(&zone.id, hostname, record_type)
            .await?
            .into_iter()
            .filter(|record| {
                record.record_type == record_type
                    && trim_root(&record.name).eq_ignore_ascii_case(wanted)
            })
            .collect();

        match matches.len() {
            0 => Err(Error::no_record(hostname, record_type.as_str())),
            1 => {
                let mut record = matches.remove(0);
                if record.zone_id.is_empty() {
                    record.zone_id = zone.id.clone();
                }
                debug!("Found record ID: {}", record.id);
                Ok(record)
            }
            n => Err(Error::ambiguous_record(hostname, record_type.as_str(), n)),
        }
    }

    /// The token must see exactly one zone
    async fn lookup_scoped_zone(&self) -> Result<Zone> {
        debug!("Listing zones visible to the API token");
        let zones = self.api.list_zones(None).await?;
        exactly_one_zone(zones, "this API token")
    }

    /// Look a zone up by name
    async fn lookup_named_zone(&self, domain: &str) -> Result<Zone> {
        debug!("Looking up zone ID for domain: {}", domain);
        let zones: Vec<Zone> = self
            .api
            .list_zones(Some(domain))
            .await?
            .into_iter()
            .filter(|zone| zone.name.eq_ignore_ascii_case(domain))
            .collect();
        exactly_one_zone(zones, &format!("zone '{domain}'"))
    }
}

fn exactly_one_zone(mut zones: Vec<Zone>, scope: &str) -> Result<Zone> {
    match zones.len() {
        0 => Err(Error::no_zone(scope)),
        1 => {
            let zone = zones.remove(0);
            debug!("Found zone ID: {} ({})", zone.id, zone.name);
            Ok(zone)
        }
        n => Err(Error::ambiguous_zone(scope, n)),
    }
}

/// Derive the lowercase zone name for `hostname`
///
/// When `base_domain` is non-empty and the hostname is that domain or one of
/// its subdomains, `base_domain` is the zone. Otherwise the last two labels
/// are used ("home.example.com" -> "example.com"). Multi-label public
/// suffixes such as "co.uk" need the base domain to be supplied.
pub fn registrable_domain(hostname: &str, base_domain: &str) -> String {
    let hostname = trim_root(hostname).to_ascii_lowercase();
    let base = trim_root(base_domain).to_ascii_lowercase();

    if !base.is_empty() && is_same_or_subdomain(&hostname, &base) {
        return base;
    }

    let labels: Vec<&str> = hostname.rsplitn(3, '.').collect();
    match labels.as_slice() {
        [tld, sld, ..] if !tld.is_empty() && !sld.is_empty() => format!("{sld}.{tld}"),
        _ => hostname.clone(),
    }
}

fn is_same_or_subdomain(hostname: &str, base: &str) -> bool {
    hostname == base || hostname.ends_with(&format!(".{base}"))
}

fn trim_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
