//! Test doubles and common utilities for pipeline contract tests
//!
//! [`MockDnsApi`] behaves like a small DNS management API: zones and records
//! live in memory, names match case-insensitively, every call is counted,
//! and failures can be injected per hostname. The HTTP crate's tests include this file as well.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ddns_core::credentials::Credentials;
use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsApi, DnsApiFactory, DnsRecord, RecordType, TokenStatus, Zone};

#[derive(Default)]
struct MockState {
    zones: Mutex<Vec<Zone>>,
    records: Mutex<Vec<DnsRecord>>,
    token_status: Mutex<Option<TokenStatus>>,
    failing_updates: Mutex<HashSet<String>>,
    connected_secrets: Mutex<Vec<String>>,
    update_log: Mutex<Vec<DnsRecord>>,
    verify_calls: AtomicUsize,
    list_zones_calls: AtomicUsize,
    list_records_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counting in-memory DNS API
///
/// Clones share state, so a test can keep one handle for assertions while
/// the bridge owns another (it is also its own [`DnsApiFactory`]).
#[derive(Clone, Default)]
pub struct MockDnsApi {
    state: Arc<MockState>,
}

impl MockDnsApi {
    /// Create an empty API (no zones, token active)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone
    pub fn with_zone(self, id: &str, name: &str) -> Self {
        lock(&self.state.zones).push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Add a record
    pub fn with_record(self, record: DnsRecord) -> Self {
        lock(&self.state.records).push(record);
        self
    }

    /// Make token verification report `status`
    pub fn with_token_status(self, status: TokenStatus) -> Self {
        *lock(&self.state.token_status) = Some(status);
        self
    }

    /// Make `update_record` fail for records named `hostname`
    pub fn failing_updates_for(self, hostname: &str) -> Self {
        lock(&self.state.failing_updates).insert(hostname.to_string());
        self
    }

    /// Current record with `id`
    pub fn record(&self, id: &str) -> Option<DnsRecord> {
        lock(&self.state.records).iter().find(|r| r.id == id).cloned()
    }

    /// Records passed to `update_record`, in call order
    pub fn update_log(&self) -> Vec<DnsRecord> {
        lock(&self.state.update_log).clone()
    }

    /// Secrets the factory was asked to connect with
    pub fn connected_secrets(&self) -> Vec<String> {
        lock(&self.state.connected_secrets).clone()
    }

    /// Get the number of times verify_token() was called
    pub fn verify_calls(&self) -> usize {
        self.state.verify_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times list_zones() was called
    pub fn list_zones_calls(&self) -> usize {
        self.state.list_zones_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times list_records() was called
    pub fn list_records_calls(&self) -> usize {
        self.state.list_records_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times update_record() was called
    pub fn update_calls(&self) -> usize {
        self.state.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsApi for MockDnsApi {
    async fn verify_token(&self) -> Result<TokenStatus> {
        self.state.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.state.token_status)
            .clone()
            .unwrap_or(TokenStatus::Active))
    }

    async fn list_zones(&self, name: Option<&str>) -> Result<Vec<Zone>> {
        self.state.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers interleave like real network calls would
        tokio::task::yield_now().await;

        Ok(lock(&self.state.zones)
            .iter()
            .filter(|zone| name.is_none_or(|n| zone.name.eq_ignore_ascii_case(n)))
            .cloned()
            .collect())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>> {
        self.state.list_records_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        Ok(lock(&self.state.records)
            .iter()
            .filter(|r| {
                r.zone_id == zone_id
                    && r.name.eq_ignore_ascii_case(name)
                    && r.record_type == record_type
            })
            .cloned()
            .collect())
    }

    async fn update_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        self.state.update_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.state.update_log).push(record.clone());

        if lock(&self.state.failing_updates).contains(&record.name) {
            return Err(Error::upstream(format!(
                "Failed to update DNS record '{}'",
                record.name
            )));
        }

        let mut records = lock(&self.state.records);
        let stored = records
            .iter_mut()
            .find(|r| r.id == record.id && r.zone_id == zone_id)
            .ok_or_else(|| Error::upstream(format!("Record {} does not exist", record.id)))?;
        *stored = record.clone();
        Ok(stored.clone())
    }

    fn api_name(&self) -> &'static str {
        "mock"
    }
}

impl DnsApiFactory for MockDnsApi {
    fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DnsApi>> {
        lock(&self.state.connected_secrets).push(credentials.secret.clone());
        Ok(Box::new(self.clone()))
    }
}

/// Build an address record for tests
///
/// Every non-address field holds a non-default value, so a write that
/// resets one of them shows up in assertions.
pub fn record(id: &str, zone_id: &str, name: &str, record_type: RecordType, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        zone_id: zone_id.to_string(),
        name: name.to_string(),
        record_type,
        content: content.to_string(),
        proxied: true,
        comment: Some("managed by ddns".to_string()),
        ttl: 300,
        extra: serde_json::Map::from_iter([(
            "tags".to_string(),
            serde_json::json!(["owner:home"]),
        )]),
    }
}

/// `Authorization` header value for Basic-Auth
pub fn basic_auth(user: &str, password: &str) -> String {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {encoded}")
}

/// API with one zone `example.com` holding an A and an AAAA record for
/// `home.example.com`
pub fn example_api() -> MockDnsApi {
    MockDnsApi::new()
        .with_zone("zone-1", "example.com")
        .with_record(record("rec-a", "zone-1", "home.example.com", RecordType::A, "198.51.100.7"))
        .with_record(record("rec-aaaa", "zone-1", "home.example.com", RecordType::Aaaa, "2001:db8::7"))
}
