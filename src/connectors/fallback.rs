//! Ordered fallback across several providers.

use async_trait::async_trait;

use crate::blockchain::{Chain, LookupError, LookupResult, TransactionData};
use crate::connectors::http::HttpClient;
use crate::connectors::{BlockchainInfoConnector, BlockcypherConnector, LookupTx, ProviderConnector};
use crate::observability::metrics;
use crate::resilience::first_success;

pub const NAME: &str = "fallback";

/// Tries each connector once, in construction order, until one succeeds.
#[derive(Debug, Clone)]
pub struct FallbackConnector {
    connectors: Vec<ProviderConnector>,
}

impl FallbackConnector {
    /// Create a fallback chain; at least one connector is required.
    pub fn new(connectors: Vec<ProviderConnector>) -> LookupResult<Self> {
        if connectors.is_empty() {
            return Err(LookupError::NoConnectors);
        }
        Ok(Self { connectors })
    }

    /// blockchain.info first, Blockcypher second.
    pub fn for_chain(chain: Chain, http: &HttpClient) -> LookupResult<Self> {
        Self::new(vec![
            BlockchainInfoConnector::new(chain, http.clone())?.into(),
            BlockcypherConnector::new(chain, http.clone())?.into(),
        ])
    }

    /// Provider names in attempt order.
    pub fn providers(&self) -> Vec<&'static str> {
        self.connectors.iter().map(|c| c.name()).collect()
    }
}

#[async_trait]
impl LookupTx for FallbackConnector {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn lookup_tx(&self, txid: &str) -> LookupResult<TransactionData> {
        let result = first_success(
            &self.connectors,
            |connector| async move {
                match connector.lookup_tx(txid).await {
                    Ok(tx) => Ok(Some(tx)),
                    Err(e) => {
                        tracing::warn!(
                            provider = connector.name(),
                            txid = %txid,
                            error = %e,
                            "Error looking up transaction, trying more connectors"
                        );
                        Err(e)
                    }
                }
            },
            // Connectors never yield `Ok(None)`; required by the combinator contract.
            |connector| LookupError::EmptyResponse {
                provider: connector.name(),
            },
        )
        .await;

        result.map_err(|failures| {
            metrics::record_lookup_exhausted();
            tracing::error!(txid = %txid, attempts = failures.len(), "All connectors failed");
            LookupError::InvalidTransaction {
                txid: txid.to_string(),
                failures,
            }
        })
    }
}
