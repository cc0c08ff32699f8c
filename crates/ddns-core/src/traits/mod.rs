//! Core traits for the DDNS bridge
//!
//! This module defines the abstract interface of the external collaborator.
//!
//! - [`DnsApi`]: Zone/record-oriented DNS management API
//! - [`DnsApiFactory`]: Binds a [`DnsApi`] client to a request's credentials

pub mod dns_api;

pub use dns_api::{DnsApi, DnsApiFactory, DnsRecord, RecordType, TokenStatus, UpdateResult, Zone};
