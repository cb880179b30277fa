//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Lookup over several providers:
//!     → fallback.rs (ordered attempts, first success wins, failures aggregated)
//!
//! Per request:
//!     → connectors::http (bounded request timeout)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - No retries or backoff against the same provider
//! - Resiliency comes only from trying distinct providers in order

pub mod fallback;

pub use fallback::first_success;
