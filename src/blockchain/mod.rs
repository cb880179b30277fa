//! Chain model shared by every connector.
//!
//! # Data Flow
//! ```text
//! Chain (declared by the credential)
//!     → connectors::factory (picks a lookup strategy)
//!     → provider response
//!     → TransactionData (canonical, immutable)
//! ```
//!
//! # Invariants
//! - A `TransactionData` always carries embedded proof data
//! - Lookup failures are classified, never stringly typed

pub mod transaction;
pub mod types;

pub use transaction::{EmptyEmbeddedData, TransactionData};
pub use types::{BlockchainType, Chain, LookupError, LookupResult, UnknownChain};
