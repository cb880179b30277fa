//! Selection of a lookup strategy for a chain.
//!
//! # Selection Policy
//! ```text
//! mock family                → MockConnector
//! bitcoin family, regtest    → MockConnector
//! bitcoin family, otherwise  → FallbackConnector [blockchain.info, blockcypher]
//! ethereum family            → EtherscanConnector (single provider)
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use crate::blockchain::{BlockchainType, Chain, LookupResult};
use crate::config::LookupConfig;
use crate::connectors::http::HttpClient;
use crate::connectors::{EtherscanConnector, FallbackConnector, MockConnector, TransactionLookup};

/// Options key holding the Etherscan API token.
pub const ETHERSCAN_API_TOKEN: &str = "etherscan_api_token";

/// Runtime options recognized by the factory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LookupOptions {
    /// Forwarded to the Etherscan connector for ethereum chains.
    #[serde(default)]
    pub etherscan_api_token: Option<String>,
}

impl LookupOptions {
    /// Read recognized keys from a string map; other keys are ignored.
    pub fn from_map(options: &HashMap<String, String>) -> Self {
        Self {
            etherscan_api_token: options.get(ETHERSCAN_API_TOKEN).cloned(),
        }
    }

    pub fn from_config(config: &LookupConfig) -> Self {
        let token = config.etherscan_api_token.trim();
        Self {
            etherscan_api_token: (!token.is_empty()).then(|| token.to_string()),
        }
    }
}

/// Create the most appropriate lookup for `chain`.
///
/// Branches on the chain family first, then on the chain within the family.
pub fn create_transaction_lookup_connector(
    chain: Chain,
    options: &LookupOptions,
    http: &HttpClient,
) -> LookupResult<TransactionLookup> {
    let lookup: TransactionLookup = match chain.blockchain_type() {
        BlockchainType::Mock => MockConnector::new(chain)?.into(),
        BlockchainType::Bitcoin => match chain {
            Chain::BitcoinRegtest => MockConnector::new(chain)?.into(),
            _ => FallbackConnector::for_chain(chain, http)?.into(),
        },
        BlockchainType::Ethereum => {
            let token = options.etherscan_api_token.clone().unwrap_or_default();
            EtherscanConnector::new(chain, token, http.clone())?.into()
        }
    };

    tracing::debug!(chain = %chain, providers = ?lookup.providers(), "Transaction lookup created");
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::connectors::LookupTx;

    fn http() -> HttpClient {
        HttpClient::new(&HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_selection_policy() {
        let options = LookupOptions::default();
        let cases = [
            (Chain::Mockchain, vec!["mock"]),
            (Chain::BitcoinRegtest, vec!["mock"]),
            (Chain::BitcoinTestnet, vec!["blockchain.info", "blockcypher"]),
            (Chain::BitcoinMainnet, vec!["blockchain.info", "blockcypher"]),
            (Chain::EthereumMainnet, vec!["etherscan"]),
            (Chain::EthereumRopsten, vec!["etherscan"]),
        ];
        for (chain, expected) in cases {
            let lookup = create_transaction_lookup_connector(chain, &options, &http()).unwrap();
            assert_eq!(lookup.providers(), expected, "chain {chain}");
        }
    }

    #[test]
    fn test_ethereum_is_single_provider() {
        let options = LookupOptions::default();
        let lookup =
            create_transaction_lookup_connector(Chain::EthereumMainnet, &options, &http()).unwrap();
        assert!(matches!(lookup, TransactionLookup::Provider(_)));
    }

    #[tokio::test]
    async fn test_sandbox_lookup_skips_network() {
        let options = LookupOptions::default();
        let lookup =
            create_transaction_lookup_connector(Chain::Mockchain, &options, &http()).unwrap();
        let tx = lookup.lookup_tx("0000").await.unwrap();
        assert_eq!(tx.signing_key(), "mock");
    }

    #[test]
    fn test_options_from_map() {
        let mut map = HashMap::new();
        map.insert(ETHERSCAN_API_TOKEN.to_string(), "KEY".to_string());
        map.insert("unrelated".to_string(), "x".to_string());
        assert_eq!(
            LookupOptions::from_map(&map).etherscan_api_token.as_deref(),
            Some("KEY")
        );
        assert_eq!(LookupOptions::from_map(&HashMap::new()), LookupOptions::default());
    }

    #[test]
    fn test_options_deserialize_from_mapping() {
        let options: LookupOptions =
            serde_json::from_value(serde_json::json!({ "etherscan_api_token": "KEY", "other": 1 }))
                .unwrap();
        assert_eq!(options.etherscan_api_token.as_deref(), Some("KEY"));
    }

    #[test]
    fn test_options_from_config_ignores_blank_token() {
        let config = LookupConfig {
            etherscan_api_token: "  ".to_string(),
            ..LookupConfig::default()
        };
        assert_eq!(LookupOptions::from_config(&config).etherscan_api_token, None);
    }
}
