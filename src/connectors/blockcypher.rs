//! Blockcypher transaction lookups (bitcoin mainnet and testnet).

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::blockchain::{Chain, LookupError, LookupResult, TransactionData};
use crate::connectors::http::HttpClient;
use crate::connectors::{endpoint, parse_base_url, LookupTx};

pub const PROVIDER: &str = "blockcypher";

const MAINNET_URL: &str = "https://api.blockcypher.com/v1/btc/main";
const TESTNET_URL: &str = "https://api.blockcypher.com/v1/btc/test3";

#[derive(Debug, Deserialize)]
struct RawTx {
    received: DateTime<Utc>,
    confirmed: Option<DateTime<Utc>>,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    outputs: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    #[serde(default)]
    addresses: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    value: Option<f64>,
    data_hex: Option<String>,
    spent_by: Option<String>,
    #[serde(default)]
    addresses: Option<Vec<String>>,
}

impl RawOutput {
    /// A missing value is treated as non-zero.
    fn is_zero_value(&self) -> bool {
        self.value.unwrap_or(1.0) == 0.0
    }

    fn first_address(&self) -> Option<&String> {
        self.addresses.as_ref().and_then(|addrs| addrs.first())
    }
}

/// Connector for the Blockcypher `txs` endpoint.
#[derive(Debug, Clone)]
pub struct BlockcypherConnector {
    base: Url,
    http: HttpClient,
}

impl BlockcypherConnector {
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
        let mut url = endpoint(&self.base, &["txs", txid]);
        url.set_query(Some("limit=100"));
        url
    }

    /// Normalize a `txs` response.
    ///
    /// The confirmation time is used when present, the receipt time otherwise.
    pub fn parse_tx(raw: &Value) -> LookupResult<TransactionData> {
        let tx: RawTx = serde_json::from_value(raw.clone())
            .map_err(|e| LookupError::malformed(format!("unexpected response shape: {e}"), raw))?;

        let signing_key = tx
            .inputs
            .first()
            .and_then(|input| input.addresses.as_ref())
            .and_then(|addrs| addrs.first())
            .cloned()
            .ok_or_else(|| LookupError::malformed("missing first input address", raw))?;

        let mut revoked = HashSet::new();
        let mut script = None;
        for output in &tx.outputs {
            if output.is_zero_value() {
                script = Some(output.data_hex.clone().unwrap_or_default());
            } else if output.spent_by.as_deref().is_some_and(|s| !s.is_empty()) {
                if let Some(addr) = output.first_address() {
                    revoked.insert(addr.clone());
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

        let time = tx.confirmed.unwrap_or(tx.received).timestamp();
        TransactionData::new(signing_key, script, time, revoked)
            .map_err(|e| LookupError::malformed(e.to_string(), raw))
    }
}

#[async_trait]
impl LookupTx for BlockcypherConnector {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup_tx(&self, txid: &str) -> LookupResult<TransactionData> {
        let raw = self.http.get_json(&self.tx_url(txid)).await?;
        Self::parse_tx(&raw)
    }
}
