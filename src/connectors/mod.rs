//! Transaction lookup connectors.
//!
//! # Data Flow
//! ```text
//! factory::create_transaction_lookup_connector(chain, options)
//!     → TransactionLookup
//!         ├─ Provider(ProviderConnector)   single explorer or sandbox stub
//!         └─ Fallback(FallbackConnector)   ordered explorers, first success wins
//!     → lookup_tx(txid)
//!         → http.rs (GET + JSON decode, bounded wait)
//!         → provider parse_tx (provider schema → TransactionData)
//! ```
//!
//! # Design Decisions
//! - Closed set of connectors; dispatch is an enum match, not a trait object
//! - Supported chains are checked at construction, never at lookup time
//! - Connectors hold only read-only construction state

pub mod blockchain_info;
pub mod blockcypher;
pub mod etherscan;
pub mod factory;
pub mod fallback;
pub mod http;
pub mod mock;

use async_trait::async_trait;
use url::Url;

use crate::blockchain::{LookupError, LookupResult, TransactionData};
use crate::observability::metrics;

pub use blockchain_info::BlockchainInfoConnector;
pub use blockcypher::BlockcypherConnector;
pub use etherscan::EtherscanConnector;
pub use factory::{create_transaction_lookup_connector, LookupOptions};
pub use fallback::FallbackConnector;
pub use http::{FetchError, HttpClient};
pub use mock::MockConnector;

/// Anything able to turn a transaction id into a [`TransactionData`].
#[async_trait]
pub trait LookupTx: Send + Sync {
    /// Provider name used in logs, metrics and errors.
    fn name(&self) -> &'static str;

    /// Look up and normalize a transaction.
    async fn lookup_tx(&self, txid: &str) -> LookupResult<TransactionData>;
}

/// One concrete data source.
#[derive(Debug, Clone)]
pub enum ProviderConnector {
    BlockchainInfo(BlockchainInfoConnector),
    Blockcypher(BlockcypherConnector),
    Etherscan(EtherscanConnector),
    Mock(MockConnector),
}

#[async_trait]
impl LookupTx for ProviderConnector {
    fn name(&self) -> &'static str {
        match self {
            ProviderConnector::BlockchainInfo(c) => c.name(),
            ProviderConnector::Blockcypher(c) => c.name(),
            ProviderConnector::Etherscan(c) => c.name(),
            ProviderConnector::Mock(c) => c.name(),
        }
    }

    async fn lookup_tx(&self, txid: &str) -> LookupResult<TransactionData> {
        tracing::debug!(provider = self.name(), txid = %txid, "Looking up transaction");

        let result = match self {
            ProviderConnector::BlockchainInfo(c) => c.lookup_tx(txid).await,
            ProviderConnector::Blockcypher(c) => c.lookup_tx(txid).await,
            ProviderConnector::Etherscan(c) => c.lookup_tx(txid).await,
            ProviderConnector::Mock(c) => c.lookup_tx(txid).await,
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_lookup_attempt(self.name(), outcome);
        result
    }
}

impl From<BlockchainInfoConnector> for ProviderConnector {
    fn from(c: BlockchainInfoConnector) -> Self {
        ProviderConnector::BlockchainInfo(c)
    }
}

impl From<BlockcypherConnector> for ProviderConnector {
    fn from(c: BlockcypherConnector) -> Self {
        ProviderConnector::Blockcypher(c)
    }
}

impl From<EtherscanConnector> for ProviderConnector {
    fn from(c: EtherscanConnector) -> Self {
        ProviderConnector::Etherscan(c)
    }
}

impl From<MockConnector> for ProviderConnector {
    fn from(c: MockConnector) -> Self {
        ProviderConnector::Mock(c)
    }
}

/// Lookup strategy handed out by the factory.
#[derive(Debug, Clone)]
pub enum TransactionLookup {
    Provider(ProviderConnector),
    Fallback(FallbackConnector),
}

impl TransactionLookup {
    /// Provider names in the order they will be tried.
    pub fn providers(&self) -> Vec<&'static str> {
        match self {
            TransactionLookup::Provider(c) => vec![c.name()],
            TransactionLookup::Fallback(f) => f.providers(),
        }
    }
}

#[async_trait]
impl LookupTx for TransactionLookup {
    fn name(&self) -> &'static str {
        match self {
            TransactionLookup::Provider(c) => c.name(),
            TransactionLookup::Fallback(f) => f.name(),
        }
    }

    async fn lookup_tx(&self, txid: &str) -> LookupResult<TransactionData> {
        match self {
            TransactionLookup::Provider(c) => c.lookup_tx(txid).await,
            TransactionLookup::Fallback(f) => f.lookup_tx(txid).await,
        }
    }
}

impl From<ProviderConnector> for TransactionLookup {
    fn from(c: ProviderConnector) -> Self {
        TransactionLookup::Provider(c)
    }
}

impl From<EtherscanConnector> for TransactionLookup {
    fn from(c: EtherscanConnector) -> Self {
        TransactionLookup::Provider(c.into())
    }
}

impl From<MockConnector> for TransactionLookup {
    fn from(c: MockConnector) -> Self {
        TransactionLookup::Provider(c.into())
    }
}

impl From<FallbackConnector> for TransactionLookup {
    fn from(f: FallbackConnector) -> Self {
        TransactionLookup::Fallback(f)
    }
}

/// Parse a base URL override, rejecting ones that cannot hold a path.
pub(crate) fn parse_base_url(base: &str) -> LookupResult<Url> {
    let url = Url::parse(base).map_err(|e| LookupError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(LookupError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

/// Append path segments to a base URL, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
