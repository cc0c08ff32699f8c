//! Update request normalization
//!
//! Legacy DDNS clients name the same thing differently (dyndns2 sends
//! `hostname`/`myip`, DuckDNS sends `domains`/`ip`, others send `host`/`ips`).
//! Each logical field has an ordered list of candidate parameter names and
//! the first one present wins; no dialect is ever detected.

use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::params::QueryParams;

/// Candidate parameter names for the hostname list, in priority order
pub const HOSTNAME_PARAMS: &[&str] = &["hostname", "host", "domains"];

/// Candidate parameter names for the address list, in priority order
pub const ADDRESS_PARAMS: &[&str] = &["ip", "ips", "myip"];

/// Address placeholder replaced by the connecting client's address
pub const AUTO_ADDRESS: &str = "auto";

/// Canonical update request
///
/// Both lists are non-empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Hostnames to update, in request order
    pub hostnames: Vec<String>,
    /// Addresses to apply, in request order
    pub addresses: Vec<String>,
}

impl UpdateRequest {
    /// Normalize query parameters into an update request
    ///
    /// # Parameters
    ///
    /// - `params`: decoded query parameters
    /// - `client_ip`: connecting address as reported by the transport, if any
    ///
    /// # Errors
    ///
    /// - [`Error::ParamMissing`] if either list ends up empty
    /// - [`Error::ClientIpUnavailable`] if `auto` was sent and `client_ip` is `None`
    /// - [`Error::InvalidAddress`] if an address is not a valid IPv4/IPv6 literal
    pub fn normalize(params: &QueryParams, client_ip: Option<IpAddr>) -> Result<Self> {
        let hostnames = split_list(params.first_of(HOSTNAME_PARAMS).unwrap_or_default());

        let raw_addresses = match params.first_of(ADDRESS_PARAMS) {
            Some(value) => split_list(value),
            None => client_ip.iter().map(IpAddr::to_string).collect(),
        };

        if hostnames.is_empty() || raw_addresses.is_empty() {
            return Err(Error::param_missing());
        }

        let addresses = raw_addresses
            .into_iter()
            .map(|address| resolve_address(address, client_ip))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            hostnames,
            addresses,
        })
    }
}

/// Split a comma-separated parameter, dropping blank entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Substitute `auto` and validate the literal
fn resolve_address(address: String, client_ip: Option<IpAddr>) -> Result<String> {
    if address.eq_ignore_ascii_case(AUTO_ADDRESS) {
        return client_ip
            .map(|ip| ip.to_string())
            .ok_or_else(Error::client_ip_unavailable);
    }

    if address.parse::<IpAddr>().is_err() {
        return Err(Error::invalid_address(&address));
    }

    Ok(address)
}
