//! Configuration types for the DDNS bridge
//!
//! This module defines the deployment choices the pipeline depends on.

use serde::{Deserialize, Serialize};

/// Main bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// How a hostname is mapped to its zone
    #[serde(default)]
    pub zone_policy: ZonePolicy,

    /// Verify the token with the API before any zone work
    #[serde(default)]
    pub verify_token: bool,

    /// Response body on success ("good" for dyndns2, "OK" for DuckDNS)
    #[serde(default = "default_success_body")]
    pub success_body: String,

    /// HTTP status for missing hostname(s)/address(es) (400 or 422)
    #[serde(default = "default_missing_params_status")]
    pub missing_params_status: u16,
}

impl BridgeConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            zone_policy: ZonePolicy::default(),
            verify_token: false,
            success_body: default_success_body(),
            missing_params_status: default_missing_params_status(),
        }
    }

    /// Set the zone policy
    pub fn with_zone_policy(mut self, zone_policy: ZonePolicy) -> Self {
        self.zone_policy = zone_policy;
        self
    }

    /// Enable or disable token verification
    pub fn with_verify_token(mut self, verify_token: bool) -> Self {
        self.verify_token = verify_token;
        self
    }

    /// Set the success body
    pub fn with_success_body(mut self, success_body: impl Into<String>) -> Self {
        self.success_body = success_body.into();
        self
    }

    /// Set the status used for missing parameters
    pub fn with_missing_params_status(mut self, status: u16) -> Self {
        self.missing_params_status = status;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.success_body.trim().is_empty() {
            return Err(crate::Error::config("Success body cannot be empty"));
        }

        if !matches!(self.missing_params_status, 400 | 422) {
            return Err(crate::Error::config(format!(
                "Missing-parameter status must be 400 or 422, got {}",
                self.missing_params_status
            )));
        }

        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Zone selection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZonePolicy {
    /// The credential must see exactly one zone, which is used for every hostname
    CredentialScoped,

    /// The zone is looked up by the hostname's registrable domain
    /// (or by the Basic-Auth identity when the hostname ends with it)
    #[default]
    SuffixMatched,
}

impl ZonePolicy {
    /// Parse a policy name as used in environment configuration
    pub fn parse(name: &str) -> Result<Self, crate::Error> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "credential_scoped" | "scoped" => Ok(ZonePolicy::CredentialScoped),
            "suffix_matched" | "suffix" => Ok(ZonePolicy::SuffixMatched),
            other => Err(crate::Error::config(format!(
                "Unknown zone policy '{other}'. Valid: credential_scoped, suffix_matched"
            ))),
        }
    }
}

fn default_success_body() -> String {
    "good".to_string()
}

fn default_missing_params_status() -> u16 {
    400
}
