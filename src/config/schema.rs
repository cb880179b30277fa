//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::blockchain::Chain;

/// User agent some explorers require before they answer.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Outbound HTTP settings shared by every connector.
    pub http: HttpConfig,

    /// Transaction lookup settings.
    pub lookup: LookupConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// Transaction lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LookupConfig {
    /// Chain used when the caller does not name one.
    pub chain: Chain,

    /// Etherscan API token (empty for anonymous, rate limited access).
    pub etherscan_api_token: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
