//! Request-to-update pipeline
//!
//! The Bridge is responsible for:
//! - Extracting credentials (Basic-Auth or `token`)
//! - Normalizing the DDNS dialect parameters
//! - Handing the canonical request to the [`UpdateExecutor`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐
//! │ Credentials      │   │ UpdateRequest    │
//! │ (extract)        │   │ (normalize)      │
//! └──────────────────┘   └──────────────────┘
//!          │                      │
//!          └──────────┬───────────┘
//!                     ▼
//!            ┌──────────────────┐        ┌─────────────┐
//!            │ UpdateExecutor   │──────▶ │ ZoneCache   │ (per request)
//!            └──────────────────┘        └─────────────┘
//!                     │
//!                     ▼
//!            ┌──────────────────┐
//!            │ ZoneResolver     │──────▶ DnsApi
//!            └──────────────────┘
//! ```
//!
//! The bridge holds no state between requests.

pub mod executor;

pub use executor::{HostnameUpdate, UpdateExecutor, UpdateSummary};

use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

use crate::config::BridgeConfig;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::params::QueryParams;
use crate::request::UpdateRequest;
use crate::traits::DnsApiFactory;

/// Transport-independent view of one DDNS update call
#[derive(Debug, Clone, Copy)]
pub struct UpdateCall<'a> {
    /// Raw `Authorization` header value, if sent
    pub authorization: Option<&'a str>,
    /// Decoded query parameters
    pub params: &'a QueryParams,
    /// Connecting client address as reported by the transport
    pub client_ip: Option<IpAddr>,
}

/// Entry point of the request-to-update pipeline
pub struct Bridge {
    executor: UpdateExecutor,
}

impl Bridge {
    /// Create a new bridge
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if `config` does not validate
    pub fn new(factory: Arc<dyn DnsApiFactory>, config: BridgeConfig) -> Result<Self> {
        Ok(Self {
            executor: UpdateExecutor::new(factory, config)?,
        })
    }

    /// The configuration this bridge runs with
    pub fn config(&self) -> &BridgeConfig {
        self.executor.config()
    }

    /// Run one DDNS update call through the pipeline
    ///
    /// Credentials are checked before parameters, so a request lacking both
    /// reports the missing credential.
    pub async fn handle(&self, call: UpdateCall<'_>) -> Result<UpdateSummary> {
        let credentials = Credentials::extract(call.authorization, call.params)?;
        let request = UpdateRequest::normalize(call.params, call.client_ip)?;

        debug!(
            "Normalized request: hostnames={:?} addresses={:?} identity={:?}",
            request.hostnames, request.addresses, credentials.identity
        );

        self.executor.execute(&request, &credentials).await
    }
}
