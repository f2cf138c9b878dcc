use std::env;

use crate::chain::network::Network;
use crate::middleware::rate_limit::{DEFAULT_MAX_PER_DAY, DEFAULT_THRESHOLD_MS};
use crate::util::MILLIS_PER_DAY;
use crate::validation::EndpointMode;

/// The account that pays for and authorizes new accounts, read from
/// `<NETWORK>_ACCOUNT` as `creator;permission;signingPublicKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorAccount {
    pub account: String,
    pub permission: String,
    pub signing_key: String,
}

impl CreatorAccount {
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(';').map(|s| s.trim());
        let account = parts.next().filter(|s| !s.is_empty())?;
        let permission = parts.next().filter(|s| !s.is_empty())?;
        let signing_key = parts.next().unwrap_or_default();
        Some(Self {
            account: account.to_string(),
            permission: permission.to_string(),
            signing_key: signing_key.to_string(),
        })
    }
}

pub struct Config {
    pub port: u16,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    pub max_payload_bytes: usize,
    pub network: Network,
    pub endpoint: String,
    pub creator: Option<CreatorAccount>,
    pub signer_url: String,
    pub endpoint_mode: EndpointMode,
    pub rate_limit_threshold_ms: i64,
    pub rate_limit_max_per_day: u32,
    pub rpc_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let network = var("NETWORK")
            .and_then(|n| n.parse().ok())
            .unwrap_or(Network::Wax);

        Self {
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
            cors_origins: var("CORS_ORIGINS")
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect()),
            max_payload_bytes: var("MAX_PAYLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(65_536),
            network,
            endpoint: var(network.endpoint_var().as_str())
                .unwrap_or_else(|| network.default_endpoint().to_string()),
            creator: var(network.account_var().as_str()).and_then(|v| CreatorAccount::parse(&v)),
            signer_url: var("SIGNER_URL").unwrap_or_else(|| "http://127.0.0.1:8900".to_string()),
            endpoint_mode: var("ENDPOINT_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(EndpointMode::GeneratedName),
            rate_limit_threshold_ms: var("RATE_LIMIT_THRESHOLD_DAYS")
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|days| days.checked_mul(MILLIS_PER_DAY))
                .unwrap_or(DEFAULT_THRESHOLD_MS),
            rate_limit_max_per_day: var("RATE_LIMIT_MAX_PER_DAY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_PER_DAY),
            rpc_timeout_secs: var("RPC_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}
