//! Etherscan lookups for account-model chains.
//!
//! # Responsibilities
//! - Fetch the transaction through the `proxy/eth_getTransactionByHash` action
//! - Refuse transactions without a block number (not yet confirmed)
//! - Resolve the block timestamp through `block/getblockreward`
//!
//! The two requests are issued one after the other; the second only once the
//! first succeeded.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::blockchain::{Chain, LookupError, LookupResult, TransactionData};
use crate::connectors::http::HttpClient;
use crate::connectors::{endpoint, parse_base_url, LookupTx};

pub const PROVIDER: &str = "etherscan";

const MAINNET_URL: &str = "https://api.etherscan.io";
const ROPSTEN_URL: &str = "https://ropsten.etherscan.io";

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    result: Option<RawTx>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTx {
    from: String,
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlockRewardResponse {
    result: Option<BlockReward>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockReward {
    time_stamp: String,
}

/// Transaction fields read from the first request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTx {
    pub from: String,
    pub input: String,
    /// `None` while the transaction sits in the mempool.
    pub block_number: Option<u64>,
}

/// Connector for the Etherscan API.
#[derive(Debug, Clone)]
pub struct EtherscanConnector {
    base: Url,
    api_key: String,
    http: HttpClient,
}

impl EtherscanConnector {
    /// Create a connector for the public endpoint of `chain`.
    ///
    /// Only ethereum mainnet and ropsten are served. An empty `api_key`
    /// uses Etherscan's anonymous quota.
    pub fn new(chain: Chain, api_key: impl Into<String>, http: HttpClient) -> LookupResult<Self> {
        let base = match chain {
            Chain::EthereumMainnet => MAINNET_URL,
            Chain::EthereumRopsten => ROPSTEN_URL,
            _ => {
                return Err(LookupError::UnsupportedChain {
                    chain,
                    provider: PROVIDER,
                })
            }
        };
        Self::with_base_url(base, api_key, http)
    }

    /// Create a connector against a custom endpoint root.
    pub fn with_base_url(
        base: &str,
        api_key: impl Into<String>,
        http: HttpClient,
    ) -> LookupResult<Self> {
        Ok(Self {
            base: parse_base_url(base)?,
            api_key: api_key.into(),
            http,
        })
    }

    fn api_url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = endpoint(&self.base, &["api"]);
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("apikey", &self.api_key);
        url
    }

    /// URL of the transaction request.
    pub fn tx_url(&self, txid: &str) -> Url {
        self.api_url(&[
            ("module", "proxy"),
            ("action", "eth_getTransactionByHash"),
            ("txhash", txid),
        ])
    }

    /// URL of the block timestamp request.
    pub fn timestamp_url(&self, block_number: u64) -> Url {
        let block = block_number.to_string();
        self.api_url(&[
            ("module", "block"),
            ("action", "getblockreward"),
            ("blockno", block.as_str()),
        ])
    }

    /// Read the fields of a `eth_getTransactionByHash` response.
    ///
    /// A missing or empty (`0x`) input is malformed.
    pub fn parse_tx(raw: &Value) -> LookupResult<PendingTx> {
        let response: ProxyResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LookupError::malformed(format!("unexpected response shape: {e}"), raw))?;
        let tx = response
            .result
            .ok_or_else(|| LookupError::malformed("transaction not found", raw))?;

        let input = tx.input.unwrap_or_default();
        if input.is_empty() || input == "0x" {
            tracing::error!(
                provider = PROVIDER,
                response = %raw,
                "Transaction response is missing input"
            );
            return Err(LookupError::malformed("transaction response is missing input", raw));
        }

        let block_number = match tx.block_number.as_deref() {
            None | Some("") => None,
            Some(hex) => Some(parse_hex_quantity(hex).ok_or_else(|| {
                LookupError::malformed(format!("invalid block number '{hex}'"), raw)
            })?),
        };

        Ok(PendingTx {
            from: tx.from,
            input,
            block_number,
        })
    }

    /// Read the unix timestamp of a `getblockreward` response.
    pub fn parse_block_timestamp(raw: &Value) -> LookupResult<i64> {
        let response: BlockRewardResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LookupError::malformed(format!("unexpected response shape: {e}"), raw))?;
        let reward = response
            .result
            .ok_or_else(|| LookupError::malformed("block not found", raw))?;

        reward.time_stamp.parse::<i64>().map_err(|_| {
            LookupError::malformed(format!("invalid block timestamp '{}'", reward.time_stamp), raw)
        })
    }
}

/// Parse an Ethereum JSON-RPC hex quantity (`0x1b4`).
fn parse_hex_quantity(hex: &str) -> Option<u64> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    u64::from_str_radix(digits, 16).ok()
}

#[async_trait]
impl LookupTx for EtherscanConnector {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup_tx(&self, txid: &str) -> LookupResult<TransactionData> {
        let raw = self.http.get_json(&self.tx_url(txid)).await?;
        let pending = Self::parse_tx(&raw)?;

        let Some(block_number) = pending.block_number else {
            tracing::error!(provider = PROVIDER, txid = %txid, "Transaction is not yet confirmed");
            return Err(LookupError::UnconfirmedTransaction {
                txid: txid.to_string(),
            });
        };

        let raw_block = self
            .http
            .get_json(&self.timestamp_url(block_number))
            .await?;
        let timestamp = Self::parse_block_timestamp(&raw_block)?;

        TransactionData::new(pending.from, pending.input, timestamp, HashSet::new())
            .map_err(|e| LookupError::malformed(e.to_string(), &raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use serde_json::json;

    fn http() -> HttpClient {
        HttpClient::new(&HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_confirmed_tx() {
        let raw = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "from": "0xissuer",
                "input": "0xc9ffd3c1e2",
                "blockNumber": "0x1b4"
            }
        });
        let pending = EtherscanConnector::parse_tx(&raw).unwrap();
        assert_eq!(pending.from, "0xissuer");
        assert_eq!(pending.input, "0xc9ffd3c1e2");
        assert_eq!(pending.block_number, Some(436));
    }

    #[test]
    fn test_parse_pending_tx() {
        let raw = json!({
            "result": { "from": "0xissuer", "input": "0xc9ff", "blockNumber": null }
        });
        assert_eq!(EtherscanConnector::parse_tx(&raw).unwrap().block_number, None);
    }

    #[test]
    fn test_empty_input_is_malformed() {
        for input in [json!("0x"), json!(""), Value::Null] {
            let raw = json!({
                "result": { "from": "0xissuer", "input": input, "blockNumber": "0x1" }
            });
            assert!(matches!(
                EtherscanConnector::parse_tx(&raw),
                Err(LookupError::MalformedTransaction { .. })
            ));
        }
    }

    #[test]
    fn test_unknown_tx_is_malformed() {
        let raw = json!({ "jsonrpc": "2.0", "id": 1, "result": null });
        assert!(EtherscanConnector::parse_tx(&raw).is_err());
    }

    #[test]
    fn test_parse_block_timestamp() {
        let raw = json!({
            "status": "1",
            "message": "OK",
            "result": { "blockNumber": "436", "timeStamp": "1438271100" }
        });
        assert_eq!(
            EtherscanConnector::parse_block_timestamp(&raw).unwrap(),
            1_438_271_100
        );

        let raw = json!({ "status": "0", "message": "NOTOK", "result": "Invalid API Key" });
        assert!(EtherscanConnector::parse_block_timestamp(&raw).is_err());
    }

    #[test]
    fn test_urls_carry_api_key() {
        let connector = EtherscanConnector::new(Chain::EthereumMainnet, "KEY", http()).unwrap();
        let url = connector.tx_url("0xabc");
        assert_eq!(url.path(), "/api");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("action".into(), "eth_getTransactionByHash".into())));
        assert!(pairs.contains(&("txhash".into(), "0xabc".into())));
        assert!(pairs.contains(&("apikey".into(), "KEY".into())));

        let url = connector.timestamp_url(436);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("blockno".into(), "436".into())));
    }

    #[test]
    fn test_rejects_utxo_chain() {
        let err = EtherscanConnector::new(Chain::BitcoinMainnet, "", http()).unwrap_err();
        assert!(matches!(
            err,
            LookupError::UnsupportedChain {
                chain: Chain::BitcoinMainnet,
                ..
            }
        ));
    }
}
