// # ddnsd - DDNS Bridge Daemon
//
// Thin integration layer: no DNS logic lives here. All request handling is
// in ddns-core (pipeline) and ddns-http (transport).
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Registering the DNS management API
// 4. Serving DDNS update calls until SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Listener
// - `DDNS_LISTEN_ADDR`: Socket address to bind (default 0.0.0.0:8080)
// - `DDNS_REQUIRE_HTTPS`: Reject requests not forwarded as HTTPS (default false)
// - `DDNS_CLIENT_IP_HEADER`: Header carrying the client address (default CF-Connecting-IP)
// - `DDNS_TRUST_PEER_ADDRESS`: Fall back to the TCP peer address (default false)
//
// ### Bridge
// - `DDNS_ZONE_POLICY`: suffix_matched (default) or credential_scoped
// - `DDNS_VERIFY_TOKEN`: Verify the API token before any lookup (default false)
// - `DDNS_SUCCESS_BODY`: Body returned on success (default "good")
// - `DDNS_MISSING_PARAMS_STATUS`: 400 (default) or 422
//
// ### DNS Management API
// - `DDNS_API_BASE`: API root (default https://api.cloudflare.com/client/v4)
// - `DDNS_HTTP_TIMEOUT_SECS`: Upstream request timeout (default 30)
// - `DDNS_MODE`: Set to `dry-run` to skip record writes
//
// ### Logging
// - `DDNS_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// API tokens are never configured here: every DDNS client presents its own.
//
// ## Example
//
// ```bash
// export DDNS_LISTEN_ADDR=127.0.0.1:8080
// export DDNS_REQUIRE_HTTPS=true
// export DDNS_CLIENT_IP_HEADER=X-Real-IP
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::{ApiRegistry, Bridge, BridgeConfig, ZonePolicy};
use ddns_http::{AppState, HttpConfig, create_routes};
use ddns_provider_cloudflare::{CLOUDFLARE_API_BASE, CloudflareFactory};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Name the DNS management API is registered under
const API_TYPE: &str = "cloudflare";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    listen_addr: SocketAddr,
    bridge: BridgeConfig,
    http: HttpConfig,
    api_base: String,
    http_timeout_secs: u64,
    dry_run: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (environment in production)
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = match var("DDNS_LISTEN_ADDR") {
            Some(addr) => addr
                .trim()
                .parse()
                .with_context(|| format!("DDNS_LISTEN_ADDR '{addr}' is not a socket address"))?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let mut bridge = BridgeConfig::default();
        if let Some(policy) = var("DDNS_ZONE_POLICY") {
            bridge.zone_policy = ZonePolicy::parse(&policy)?;
        }
        if let Some(verify) = var("DDNS_VERIFY_TOKEN") {
            bridge.verify_token = parse_bool("DDNS_VERIFY_TOKEN", &verify)?;
        }
        if let Some(body) = lookup("DDNS_SUCCESS_BODY") {
            bridge.success_body = body;
        }
        if let Some(status) = var("DDNS_MISSING_PARAMS_STATUS") {
            bridge.missing_params_status = status.trim().parse().with_context(|| {
                format!("DDNS_MISSING_PARAMS_STATUS '{status}' is not a status code")
            })?;
        }

        let mut http = HttpConfig::default();
        if let Some(require) = var("DDNS_REQUIRE_HTTPS") {
            http.require_https = parse_bool("DDNS_REQUIRE_HTTPS", &require)?;
        }
        if let Some(header) = var("DDNS_CLIENT_IP_HEADER") {
            http.client_ip_header = header.trim().to_string();
        }
        if let Some(trust) = var("DDNS_TRUST_PEER_ADDRESS") {
            http.trust_peer_address = parse_bool("DDNS_TRUST_PEER_ADDRESS", &trust)?;
        }

        let http_timeout_secs = match var("DDNS_HTTP_TIMEOUT_SECS") {
            Some(secs) => secs.trim().parse().with_context(|| {
                format!("DDNS_HTTP_TIMEOUT_SECS '{secs}' is not a number of seconds")
            })?,
            None => 30,
        };

        Ok(Self {
            listen_addr,
            bridge,
            http,
            api_base: var("DDNS_API_BASE").unwrap_or_else(|| CLOUDFLARE_API_BASE.to_string()),
            http_timeout_secs,
            dry_run: var("DDNS_MODE").is_some_and(|mode| mode.trim().eq_ignore_ascii_case("dry-run")),
            log_level: var("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.bridge.validate()?;
        self.http.validate()?;

        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            anyhow::bail!(
                "DDNS_API_BASE must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            );
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "DDNS_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{key} '{other}' is not a boolean (true/false)"),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let state = match build_state(&config) {
            Ok(state) => state,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(config.listen_addr, state).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire the API registry, bridge and HTTP state together
fn build_state(config: &Config) -> Result<AppState> {
    let registry = ApiRegistry::new();

    info!("Registering Cloudflare API at {}", config.api_base);
    let factory = CloudflareFactory::new(
        config.api_base.clone(),
        Duration::from_secs(config.http_timeout_secs),
        config.dry_run,
    )?;
    let dry_run = factory.is_dry_run();
    ddns_provider_cloudflare::register(&registry, factory);

    let bridge = Bridge::new(registry.factory(API_TYPE)?, config.bridge.clone())?;

    info!(
        "Bridge configured: zone policy {:?}, verify token {}, HTTPS required {}",
        config.bridge.zone_policy, config.bridge.verify_token, config.http.require_https
    );
    if dry_run {
        warn!("DRY-RUN mode: records will not be modified");
    }

    Ok(AppState::new(bridge, config.http.clone()))
}

/// Serve until a shutdown signal arrives; in-flight requests are drained
async fn run_daemon(listen_addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;

    info!("Listening on {}", listen_addr);

    let app = create_routes(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown signal error: {:#}", e),
        }
        info!("Shutting down daemon");
    })
    .await
    .context("HTTP server failed")?;

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
