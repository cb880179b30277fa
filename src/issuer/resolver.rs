//! Issuer profile resolution.
//!
//! # Responsibilities
//! - Fetch the issuer profile (fatal when unavailable)
//! - Fetch the certificate's revocation list for V2 documents (best effort)
//! - Normalize current, V2-alpha and V1 profile shapes into [`IssuerInfo`]
//!
//! # Profile Shapes
//! ```text
//! "@context" + "publicKey"  → keys from publicKey[].id
//! "@context" + "publicKeys" → keys from publicKeys[].publicKey (v2 alpha)
//! no "@context"             → issuerKeys[0].key (+ revocationKeys[0].key for V1 certs)
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::connectors::http::HttpClient;
use crate::issuer::types::{
    parse_key_timestamp, BlockcertVersion, IssuerError, IssuerInfo, IssuerKey, IssuerResult,
};
use crate::observability::metrics;

/// Prefix of key identifiers in issuer profiles.
pub const PUBKEY_PREFIX: &str = "ecdsa-koblitz-pubkey:";

#[derive(Debug, Deserialize)]
struct KeyEntry {
    id: Option<String>,
    #[serde(rename = "publicKey")]
    public_key: Option<String>,
    created: Option<String>,
    expires: Option<String>,
    revoked: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyKey {
    key: String,
}

/// Resolves issuer references into [`IssuerInfo`].
#[derive(Debug, Clone)]
pub struct IssuerResolver {
    http: HttpClient,
}

impl IssuerResolver {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Resolve the issuer of a certificate.
    ///
    /// # Arguments
    /// * `issuer_url` - Location of the issuer profile
    /// * `version` - Schema version of the certificate
    /// * `certificate_json` - The certificate document, read for `badge.issuer.revocationList`
    pub async fn resolve(
        &self,
        issuer_url: &str,
        version: BlockcertVersion,
        certificate_json: &Value,
    ) -> IssuerResult<IssuerInfo> {
        let result = self.resolve_inner(issuer_url, version, certificate_json).await;
        match &result {
            Ok(info) => {
                metrics::record_issuer_resolution("success");
                tracing::debug!(
                    issuer = %issuer_url,
                    keys = info.issuer_keys().len(),
                    revoked_assertions = info.revoked_assertions().len(),
                    "Issuer resolved"
                );
            }
            Err(e) => {
                metrics::record_issuer_resolution(e.kind());
                tracing::error!(issuer = %issuer_url, error = %e, "Issuer resolution failed");
            }
        }
        result
    }

    async fn resolve_inner(
        &self,
        issuer_url: &str,
        version: BlockcertVersion,
        certificate_json: &Value,
    ) -> IssuerResult<IssuerInfo> {
        let url = Url::parse(issuer_url).map_err(|e| IssuerError::InvalidIssuerUrl {
            url: issuer_url.to_string(),
            reason: e.to_string(),
        })?;
        let issuer_json = self
            .http
            .get_json(&url)
            .await
            .map_err(|source| IssuerError::ProfileUnavailable {
                url: issuer_url.to_string(),
                source,
            })?;

        let revoked_assertions = match revocation_list_url(version, certificate_json) {
            Some(list_url) => self.fetch_revoked_assertions(list_url).await,
            None => HashSet::new(),
        };

        parse_issuer_profile(&issuer_json, revoked_assertions)
    }

    /// Fetch a revocation list; any failure yields an empty set.
    pub async fn fetch_revoked_assertions(&self, list_url: &str) -> HashSet<String> {
        let url = match Url::parse(list_url) {
            Ok(url) => url,
            Err(e) => {
                metrics::record_revocation_list_fetch("invalid_url");
                tracing::warn!(
                    url = %list_url,
                    error = %e,
                    "Invalid revocation list URL, assuming no revocations"
                );
                return HashSet::new();
            }
        };

        match self.http.get_json(&url).await {
            Ok(raw) => {
                metrics::record_revocation_list_fetch("success");
                parse_revoked_assertions(&raw)
            }
            Err(e) => {
                metrics::record_revocation_list_fetch("failure");
                tracing::warn!(
                    url = %list_url,
                    error = %e,
                    "Revocation list unavailable, assuming no revocations"
                );
                HashSet::new()
            }
        }
    }
}

/// Revocation list URL of a V2 certificate, if any.
pub fn revocation_list_url(version: BlockcertVersion, certificate_json: &Value) -> Option<&str> {
    if !version.is_v2ish() {
        return None;
    }
    certificate_json
        .pointer("/badge/issuer/revocationList")
        .and_then(Value::as_str)
}

/// Collect `revokedAssertions[].id`; entries without an id are skipped.
pub fn parse_revoked_assertions(raw: &Value) -> HashSet<String> {
    let Some(entries) = raw.get("revokedAssertions").and_then(Value::as_array) else {
        return HashSet::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id").and_then(Value::as_str);
            if id.is_none() {
                tracing::warn!(entry = %entry, "Skipping revoked assertion without id");
            }
            id.map(str::to_string)
        })
        .collect()
}

/// Normalize an issuer profile document.
///
/// `revoked_assertions` comes from the certificate's revocation list; for a V1
/// profile a non-empty set means a V2 certificate, so no revocation keys are read.
pub fn parse_issuer_profile(
    issuer_json: &Value,
    revoked_assertions: HashSet<String>,
) -> IssuerResult<IssuerInfo> {
    if issuer_json.get("@context").is_some() {
        let keys = if let Some(entries) = issuer_json.get("publicKey") {
            parse_key_entries(entries, KeyField::Id)?
        } else if let Some(entries) = issuer_json.get("publicKeys") {
            parse_key_entries(entries, KeyField::PublicKey)?
        } else {
            Vec::new()
        };
        return IssuerInfo::new(keys, Vec::new(), revoked_assertions);
    }

    let issuer_key = first_legacy_key(issuer_json, "issuerKeys", "issuerKeys[0].key")?;
    if !revoked_assertions.is_empty() {
        return IssuerInfo::new(vec![issuer_key], Vec::new(), revoked_assertions);
    }

    let revocation_key = first_legacy_key(issuer_json, "revocationKeys", "revocationKeys[0].key")?;
    IssuerInfo::new(vec![issuer_key], vec![revocation_key], HashSet::new())
}

#[derive(Debug, Clone, Copy)]
enum KeyField {
    /// `publicKey[].id`
    Id,
    /// `publicKeys[].publicKey`
    PublicKey,
}

fn parse_key_entries(entries: &Value, field: KeyField) -> IssuerResult<Vec<IssuerKey>> {
    let entries: Vec<KeyEntry> = serde_json::from_value(entries.clone())
        .map_err(|e| IssuerError::MalformedProfile(format!("public key list: {e}")))?;

    entries
        .into_iter()
        .map(|entry| -> IssuerResult<IssuerKey> {
            let raw_key = match field {
                KeyField::Id => entry.id.ok_or(IssuerError::MissingField("publicKey[].id"))?,
                KeyField::PublicKey => entry
                    .public_key
                    .ok_or(IssuerError::MissingField("publicKeys[].publicKey"))?,
            };
            Ok(IssuerKey {
                public_key: strip_key_prefix(&raw_key).to_string(),
                created: checked_timestamp("created", entry.created),
                expires: checked_timestamp("expires", entry.expires),
                revoked: checked_timestamp("revoked", entry.revoked),
            })
        })
        .collect()
}

fn first_legacy_key(
    issuer_json: &Value,
    list: &str,
    field: &'static str,
) -> IssuerResult<IssuerKey> {
    let entry = issuer_json
        .get(list)
        .and_then(|keys| keys.get(0))
        .ok_or(IssuerError::MissingField(field))?;
    let key: LegacyKey =
        serde_json::from_value(entry.clone()).map_err(|_| IssuerError::MissingField(field))?;
    Ok(IssuerKey::bare(key.key))
}

/// Remove [`PUBKEY_PREFIX`] once; values without it are kept as-is.
pub fn strip_key_prefix(raw: &str) -> &str {
    raw.strip_prefix(PUBKEY_PREFIX).unwrap_or(raw)
}

/// Keep a key timestamp verbatim, warning when it cannot be interpreted.
fn checked_timestamp(field: &'static str, value: Option<String>) -> Option<String> {
    if let Some(raw) = value.as_deref() {
        if parse_key_timestamp(raw).is_none() {
            tracing::warn!(field, value = %raw, "Unrecognized key timestamp, keeping raw value");
        }
    }
    value
}
