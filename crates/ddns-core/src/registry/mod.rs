//! Plugin-based API registry
//!
//! DNS management APIs register a [`DnsApiFactory`] under a name so the
//! daemon can pick one from configuration without a hardcoded if-else chain.
//!
//! ## Registration
//!
//! ```rust,ignore
//! // In ddns-provider-cloudflare crate
//! pub fn register(registry: &ApiRegistry, factory: CloudflareFactory) {
//!     registry.register_api("cloudflare", Arc::new(factory));
//! }
//! ```

use crate::error::{Error, Result};
use crate::traits::DnsApiFactory;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of DNS management API factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ApiRegistry {
    apis: RwLock<HashMap<String, Arc<dyn DnsApiFactory>>>,
}

impl ApiRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an API factory under `name` (e.g. "cloudflare")
    pub fn register_api(&self, name: impl Into<String>, factory: Arc<dyn DnsApiFactory>) {
        let mut apis = self.apis.write().unwrap_or_else(PoisonError::into_inner);
        apis.insert(name.into(), factory);
    }

    /// Look up the factory registered under `name`
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if nothing is registered under that name
    pub fn factory(&self, name: &str) -> Result<Arc<dyn DnsApiFactory>> {
        let found = self
            .apis
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();

        found.ok_or_else(|| {
            Error::config(format!(
                "Unknown API type: {}. Registered: {}",
                name,
                self.list_apis().join(", ")
            ))
        })
    }

    /// List all registered API names, sorted
    pub fn list_apis(&self) -> Vec<String> {
        let apis = self.apis.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = apis.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
