//! Metrics collection.
//!
//! # Metrics
//! - `cert_lookup_attempts_total` (counter): connector attempts by provider, outcome
//! - `cert_lookup_exhausted_total` (counter): fallback chains where every connector failed
//! - `issuer_resolutions_total` (counter): issuer profile resolutions by outcome
//! - `revocation_list_fetches_total` (counter): revocation list fetches by outcome
//!
//! No recorder is installed here; without one every call is a no-op.

/// Record one connector attempt.
pub fn record_lookup_attempt(provider: &'static str, outcome: &'static str) {
    metrics::counter!(
        "cert_lookup_attempts_total",
        "provider" => provider,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a fallback chain that ran out of connectors.
pub fn record_lookup_exhausted() {
    metrics::counter!("cert_lookup_exhausted_total").increment(1);
}

pub fn record_issuer_resolution(outcome: &'static str) {
    metrics::counter!("issuer_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_revocation_list_fetch(outcome: &'static str) {
    metrics::counter!("revocation_list_fetches_total", "outcome" => outcome).increment(1);
}
