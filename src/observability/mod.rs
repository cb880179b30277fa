//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! connectors / issuer resolver produce:
//!     → tracing events (structured fields: provider, txid, url, status)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber installed by the binary
//!     → any `metrics` recorder the embedding application installs
//! ```

pub mod logging;
pub mod metrics;
