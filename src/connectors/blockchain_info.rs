//! blockchain.info raw transaction lookups (bitcoin mainnet and testnet).

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::blockchain::{Chain, LookupError, LookupResult, TransactionData};
use crate::connectors::http::HttpClient;
use crate::connectors::{endpoint, parse_base_url, LookupTx};

pub const PROVIDER: &str = "blockchain.info";

const MAINNET_URL: &str = "https://blockchain.info";
const TESTNET_URL: &str = "https://testnet.blockchain.info";

/// Hex chars of the OP_RETURN opcode and push length preceding the payload.
const SCRIPT_HEADER_LEN: usize = 4;

#[derive(Debug, Deserialize)]
struct RawTx {
    time: i64,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    out: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    prev_out: Option<PrevOut>,
}

#[derive(Debug, Deserialize)]
struct PrevOut {
    addr: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    value: Option<u64>,
    #[serde(default)]
    script: String,
    #[serde(default)]
    spent: bool,
    addr: Option<String>,
}

impl RawOutput {
    /// A missing value is treated as non-zero.
    fn is_zero_value(&self) -> bool {
        self.value == Some(0)
    }
}

/// Connector for the blockchain.info `rawtx` endpoint.
#[derive(Debug, Clone)]
pub struct BlockchainInfoConnector {
    base: Url,
    http: HttpClient,
}

impl BlockchainInfoConnector {
    /// Create a connector for the public endpoint of `chain`.
    ///
    /// Only bitcoin mainnet and testnet are served.
    pub fn new(chain: Chain, http: HttpClient) -> LookupResult<Self> {
        let base = match chain {
            Chain::BitcoinMainnet => MAINNET_URL,
            Chain::BitcoinTestnet => TESTNET_URL,
            _ => {
                return Err(LookupError::UnsupportedChain {
                    chain,
                    provider: PROVIDER,
                })
            }
        };
        Self::with_base_url(base, http)
    }

    /// Create a connector against a custom endpoint root.
    pub fn with_base_url(base: &str, http: HttpClient) -> LookupResult<Self> {
        Ok(Self {
            base: parse_base_url(base)?,
            http,
        })
    }

    /// URL queried for `txid`.
    pub fn tx_url(&self, txid: &str) -> Url {
        let mut url = endpoint(&self.base, &["rawtx", txid]);
        url.set_query(Some("cors=true"));
        url
    }

    /// Normalize a `rawtx` response.
    pub fn parse_tx(raw: &Value) -> LookupResult<TransactionData> {
        let tx: RawTx = serde_json::from_value(raw.clone())
            .map_err(|e| LookupError::malformed(format!("unexpected response shape: {e}"), raw))?;

        let signing_key = tx
            .inputs
            .first()
            .and_then(|input| input.prev_out.as_ref())
            .and_then(|prev| prev.addr.clone())
            .ok_or_else(|| LookupError::malformed("missing first input address", raw))?;

        let mut revoked = HashSet::new();
        let mut script = None;
        for output in tx.out {
            if output.is_zero_value() {
                script = Some(
                    output
                        .script
                        .get(SCRIPT_HEADER_LEN..)
                        .unwrap_or_default()
                        .to_string(),
                );
            } else if output.spent {
                if let Some(addr) = output.addr {
                    revoked.insert(addr);
                }
            }
        }

        let Some(script) = script else {
            tracing::error!(
                provider = PROVIDER,
                response = %raw,
                "Transaction response is missing op_return script"
            );
            return Err(LookupError::malformed(
                "transaction response is missing op_return script",
                raw,
            ));
        };

        TransactionData::new(signing_key, script, tx.time, revoked)
            .map_err(|e| LookupError::malformed(e.to_string(), raw))
    }
}

#[async_trait]
impl LookupTx for BlockchainInfoConnector {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup_tx(&self, txid: &str) -> LookupResult<TransactionData> {
        let raw = self.http.get_json(&self.tx_url(txid)).await?;
        Self::parse_tx(&raw)
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

    fn sample() -> Value {
        json!({
            "time": 1_499_000_000,
            "inputs": [{ "prev_out": { "addr": "1Issuer", "value": 20000 } }],
            "out": [
                { "value": 2750, "addr": "1Recipient", "spent": true, "script": "76a914" },
                { "value": 2750, "addr": "1Unspent", "spent": false, "script": "76a914" },
                { "value": 0, "script": "6a20c9ffd3c1e2" }
            ]
        })
    }

    #[test]
    fn test_parse_extracts_op_return() {
        let tx = BlockchainInfoConnector::parse_tx(&sample()).unwrap();
        assert_eq!(tx.signing_key(), "1Issuer");
        assert_eq!(tx.op_return(), "c9ffd3c1e2");
        assert_eq!(tx.date_time_utc(), 1_499_000_000);
        assert_eq!(tx.revoked_addresses().len(), 1);
        assert!(tx.revoked_addresses().contains("1Recipient"));
    }

    #[test]
    fn test_missing_value_is_not_zero() {
        let raw = json!({
            "time": 1,
            "inputs": [{ "prev_out": { "addr": "1Issuer" } }],
            "out": [{ "script": "6a20c9ffd3c1e2" }]
        });
        let err = BlockchainInfoConnector::parse_tx(&raw).unwrap_err();
        assert!(matches!(err, LookupError::MalformedTransaction { .. }));
    }

    #[test]
    fn test_no_zero_value_output_is_malformed() {
        let raw = json!({
            "time": 1,
            "inputs": [{ "prev_out": { "addr": "1Issuer" } }],
            "out": [{ "value": 10, "addr": "1Recipient", "script": "76a914" }]
        });
        match BlockchainInfoConnector::parse_tx(&raw).unwrap_err() {
            LookupError::MalformedTransaction { raw: carried, .. } => assert_eq!(carried, raw),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_script_is_malformed() {
        let raw = json!({
            "time": 1,
            "inputs": [{ "prev_out": { "addr": "1Issuer" } }],
            "out": [{ "value": 0, "script": "6a20" }]
        });
        assert!(BlockchainInfoConnector::parse_tx(&raw).is_err());
    }

    #[test]
    fn test_missing_input_address_is_malformed() {
        let raw = json!({ "time": 1, "inputs": [], "out": [{ "value": 0, "script": "6a20ab" }] });
        assert!(matches!(
            BlockchainInfoConnector::parse_tx(&raw),
            Err(LookupError::MalformedTransaction { .. })
        ));
    }

    #[test]
    fn test_chain_selection() {
        let connector = BlockchainInfoConnector::new(Chain::BitcoinTestnet, http()).unwrap();
        assert_eq!(
            connector.tx_url("abc").as_str(),
            "https://testnet.blockchain.info/rawtx/abc?cors=true"
        );

        let err = BlockchainInfoConnector::new(Chain::EthereumMainnet, http()).unwrap_err();
        assert!(matches!(err, LookupError::UnsupportedChain { .. }));
    }
}
