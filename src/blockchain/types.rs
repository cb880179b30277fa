//! Chain identifiers and lookup error definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Blockchain family a [`Chain`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockchainType {
    /// Local sandbox with no real ledger behind it.
    Mock,
    /// UTXO-model chains.
    Bitcoin,
    /// Account-model chains.
    Ethereum,
}

/// Chains a credential may be anchored on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Mockchain,
    BitcoinRegtest,
    BitcoinTestnet,
    #[default]
    BitcoinMainnet,
    EthereumMainnet,
    EthereumRopsten,
}

impl Chain {
    pub const ALL: [Chain; 6] = [
        Chain::Mockchain,
        Chain::BitcoinRegtest,
        Chain::BitcoinTestnet,
        Chain::BitcoinMainnet,
        Chain::EthereumMainnet,
        Chain::EthereumRopsten,
    ];

    /// Family used to pick a connector.
    pub fn blockchain_type(self) -> BlockchainType {
        match self {
            Chain::Mockchain => BlockchainType::Mock,
            Chain::BitcoinRegtest | Chain::BitcoinTestnet | Chain::BitcoinMainnet => {
                BlockchainType::Bitcoin
            }
            Chain::EthereumMainnet | Chain::EthereumRopsten => BlockchainType::Ethereum,
        }
    }

    /// Sandbox chains are never looked up over the network.
    pub fn is_sandbox(self) -> bool {
        matches!(self, Chain::Mockchain | Chain::BitcoinRegtest)
    }

    /// Canonical snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Chain::Mockchain => "mockchain",
            Chain::BitcoinRegtest => "bitcoin_regtest",
            Chain::BitcoinTestnet => "bitcoin_testnet",
            Chain::BitcoinMainnet => "bitcoin_mainnet",
            Chain::EthereumMainnet => "ethereum_mainnet",
            Chain::EthereumRopsten => "ethereum_ropsten",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown chain name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown chain '{0}'")]
pub struct UnknownChain(pub String);

impl FromStr for Chain {
    type Err = UnknownChain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::ALL
            .into_iter()
            .find(|chain| chain.as_str() == s)
            .ok_or_else(|| UnknownChain(s.to_string()))
    }
}

/// Errors that can occur while looking up an anchoring transaction.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Provider answered with a non-success status.
    #[error("remote unavailable: {url} returned status {status}")]
    RemoteUnavailable { url: String, status: u16 },

    /// Request never produced a usable response (connect, timeout, body decode).
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response parsed but lacks the proof-bearing output or a required field.
    #[error("malformed transaction: {reason}")]
    MalformedTransaction { reason: String, raw: Value },

    /// Transaction exists but has no confirming block yet.
    #[error("transaction {txid} is not yet confirmed")]
    UnconfirmedTransaction { txid: String },

    /// Attempt finished without a result.
    ///
    /// Only produced through [`crate::resilience::first_success`] for attempts that
    /// return `Ok(None)`; the built-in connectors always return a record or an error.
    #[error("{provider} returned an empty result")]
    EmptyResponse { provider: &'static str },

    /// Every connector in a fallback chain failed, in attempt order.
    #[error("error looking up transaction {txid}: all {} connectors failed", .failures.len())]
    InvalidTransaction {
        txid: String,
        failures: Vec<LookupError>,
    },

    /// Connector constructed for a chain it cannot serve.
    #[error("unsupported chain {chain} requested with {provider} connector")]
    UnsupportedChain {
        chain: Chain,
        provider: &'static str,
    },

    /// Fallback chain constructed without any connector.
    #[error("fallback lookup requires at least one connector")]
    NoConnectors,

    /// Base URL override cannot be used as an endpoint root.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl LookupError {
    /// Builds a [`LookupError::MalformedTransaction`] carrying the raw response.
    pub fn malformed(reason: impl Into<String>, raw: &Value) -> Self {
        LookupError::MalformedTransaction {
            reason: reason.into(),
            raw: raw.clone(),
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::RemoteUnavailable { .. } => "remote_unavailable",
            LookupError::Transport { .. } => "transport",
            LookupError::MalformedTransaction { .. } => "malformed",
            LookupError::UnconfirmedTransaction { .. } => "unconfirmed",
            LookupError::EmptyResponse { .. } => "empty",
            LookupError::InvalidTransaction { .. } => "invalid",
            LookupError::UnsupportedChain { .. } => "unsupported_chain",
            LookupError::NoConnectors => "no_connectors",
            LookupError::InvalidBaseUrl { .. } => "invalid_base_url",
        }
    }
}

/// Result type for transaction lookups.
pub type LookupResult<T> = Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_round_trips_through_name() {
        for chain in Chain::ALL {
            assert_eq!(chain.as_str().parse::<Chain>().unwrap(), chain);
        }
        assert!("dogecoin_mainnet".parse::<Chain>().is_err());
    }

    #[test]
    fn test_chain_families() {
        assert_eq!(Chain::Mockchain.blockchain_type(), BlockchainType::Mock);
        assert_eq!(Chain::BitcoinRegtest.blockchain_type(), BlockchainType::Bitcoin);
        assert_eq!(Chain::EthereumRopsten.blockchain_type(), BlockchainType::Ethereum);
        assert!(Chain::BitcoinRegtest.is_sandbox());
        assert!(!Chain::BitcoinTestnet.is_sandbox());
    }

    #[test]
    fn test_default_chain_is_bitcoin_mainnet() {
        assert_eq!(Chain::default(), Chain::BitcoinMainnet);
    }

    #[test]
    fn test_chain_serde_names() {
        let json = serde_json::to_string(&Chain::EthereumMainnet).unwrap();
        assert_eq!(json, "\"ethereum_mainnet\"");
    }

    #[test]
    fn test_error_display() {
        let err = LookupError::RemoteUnavailable {
            url: "https://blockchain.info/rawtx/ab".to_string(),
            status: 503,
        };
        assert!(err.to_string().contains("503"));

        let err = LookupError::InvalidTransaction {
            txid: "ab".to_string(),
            failures: vec![
                LookupError::EmptyResponse { provider: "blockchain.info" },
                LookupError::UnconfirmedTransaction { txid: "ab".to_string() },
            ],
        };
        assert!(err.to_string().contains("all 2 connectors failed"));
        assert_eq!(err.kind(), "invalid");
    }
}
