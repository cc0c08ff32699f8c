// # ddns-core
//
// Core library for the DDNS protocol bridge.
//
// ## Architecture Overview
//
// Legacy DDNS clients (dyndns2, DuckDNS, ydns conventions) send an HTTP GET
// with a hostname and an address. This crate turns that call into
// authenticated operations against a zone/record-oriented DNS API:
//
// - **Credentials**: Basic-Auth or `token` parameter extraction
// - **UpdateRequest**: Multi-dialect parameter normalization
// - **ZoneResolver**: Exactly-one zone and record resolution
// - **UpdateExecutor**: Content update fan-out with a request-scoped zone cache
// - **Bridge**: The pipeline entry point tying the above together
// - **DnsApi**: Trait for the external DNS management API
//
// ## Design Principles
//
// 1. **Stateless**: Nothing survives a request; the zone cache is per request
// 2. **Never create**: Records must pre-exist, only `content` is rewritten
// 3. **Exactly one**: Zero or several matches are distinct, named errors
// 4. **No retries**: Upstream failures surface directly to the client

pub mod cache;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod params;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use cache::ZoneCache;
pub use config::{BridgeConfig, ZonePolicy};
pub use credentials::Credentials;
pub use engine::{Bridge, HostnameUpdate, UpdateCall, UpdateExecutor, UpdateSummary};
pub use error::{Error, Result};
pub use params::QueryParams;
pub use registry::ApiRegistry;
pub use request::UpdateRequest;
pub use resolver::ZoneResolver;
pub use traits::{DnsApi, DnsApiFactory, DnsRecord, RecordType, TokenStatus, UpdateResult, Zone};
