//! Canonical transaction record produced by every connector.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// Record construction failed because no embedded data was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transaction carries no embedded data")]
pub struct EmptyEmbeddedData;

/// Normalized view of an anchoring transaction.
///
/// Embedded data is never empty: [`TransactionData::new`] refuses to build a
/// record without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionData {
    signing_key: String,
    op_return: String,
    date_time_utc: i64,
    revoked_addresses: HashSet<String>,
}

impl TransactionData {
    /// Create a record.
    ///
    /// # Arguments
    /// * `signing_key` - Address of the transaction's first input
    /// * `op_return` - Hex-encoded embedded proof data
    /// * `date_time_utc` - Unix timestamp in seconds
    /// * `revoked_addresses` - Non-zero-value outputs observed as spent
    pub fn new(
        signing_key: impl Into<String>,
        op_return: impl Into<String>,
        date_time_utc: i64,
        revoked_addresses: HashSet<String>,
    ) -> Result<Self, EmptyEmbeddedData> {
        let op_return = op_return.into();
        if op_return.is_empty() {
            return Err(EmptyEmbeddedData);
        }
        Ok(Self {
            signing_key: signing_key.into(),
            op_return,
            date_time_utc,
            revoked_addresses,
        })
    }

    /// Address that signed the transaction.
    pub fn signing_key(&self) -> &str {
        &self.signing_key
    }

    /// Hex-encoded embedded proof data.
    pub fn op_return(&self) -> &str {
        &self.op_return
    }

    /// Block (or receipt) time in unix seconds.
    pub fn date_time_utc(&self) -> i64 {
        self.date_time_utc
    }

    pub fn revoked_addresses(&self) -> &HashSet<String> {
        &self.revoked_addresses
    }
}
