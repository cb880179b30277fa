//! Null connector for sandbox chains.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::blockchain::{Chain, LookupError, LookupResult, TransactionData};
use crate::connectors::LookupTx;

pub const PROVIDER: &str = "mock";

/// Placeholder embedded data ("mock" in hex).
pub const MOCK_OP_RETURN: &str = "6d6f636b";

/// Connector that answers every lookup without touching the network.
#[derive(Debug, Clone, Copy)]
pub struct MockConnector {
    chain: Chain,
}

impl MockConnector {
    /// Create a connector for a sandbox chain.
    pub fn new(chain: Chain) -> LookupResult<Self> {
        if !chain.is_sandbox() {
            return Err(LookupError::UnsupportedChain {
                chain,
                provider: PROVIDER,
            });
        }
        Ok(Self { chain })
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }
}

#[async_trait]
impl LookupTx for MockConnector {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup_tx(&self, txid: &str) -> LookupResult<TransactionData> {
        tracing::debug!(
            chain = %self.chain,
            txid = %txid,
            "Sandbox chain, skipping network lookup"
        );
        TransactionData::new(PROVIDER, MOCK_OP_RETURN, 0, HashSet::new())
            .map_err(|e| LookupError::malformed(e.to_string(), &Value::Null))
    }
}
