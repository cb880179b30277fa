//! Blockchain transaction lookup and issuer resolution for certificate verification.

pub mod blockchain;
pub mod config;
pub mod connectors;
pub mod issuer;
pub mod observability;
pub mod resilience;

pub use blockchain::{Chain, LookupError, TransactionData};
pub use config::schema::ConnectorConfig;
pub use connectors::{
    create_transaction_lookup_connector, LookupOptions, LookupTx, TransactionLookup,
};
pub use issuer::{BlockcertVersion, IssuerInfo, IssuerResolver};
