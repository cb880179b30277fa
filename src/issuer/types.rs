//! Issuer authority model and resolution errors.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connectors::http::FetchError;

/// Blockcerts document schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockcertVersion {
    #[serde(rename = "1.1")]
    V1_1,
    #[serde(rename = "1.2")]
    V1_2,
    #[serde(rename = "2.0-alpha")]
    V2Alpha,
    #[serde(rename = "2.0")]
    V2,
}

impl BlockcertVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockcertVersion::V1_1 => "1.1",
            BlockcertVersion::V1_2 => "1.2",
            BlockcertVersion::V2Alpha => "2.0-alpha",
            BlockcertVersion::V2 => "2.0",
        }
    }

    /// V2 and V2-alpha certificates may point at a revocation list.
    pub fn is_v2ish(self) -> bool {
        matches!(self, BlockcertVersion::V2 | BlockcertVersion::V2Alpha)
    }
}

impl fmt::Display for BlockcertVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown blockcerts version '{0}'")]
pub struct UnknownVersion(pub String);

impl FromStr for BlockcertVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.1" => Ok(BlockcertVersion::V1_1),
            "1.2" => Ok(BlockcertVersion::V1_2),
            "2.0-alpha" | "2.0a" => Ok(BlockcertVersion::V2Alpha),
            "2.0" | "2" => Ok(BlockcertVersion::V2),
            other => Err(UnknownVersion(other.to_string())),
        }
    }
}

/// One issuer public key with its validity window.
///
/// Validity timestamps are kept exactly as the profile published them; the
/// `*_at` accessors interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuerKey {
    pub public_key: String,
    pub created: Option<String>,
    pub expires: Option<String>,
    pub revoked: Option<String>,
}

impl IssuerKey {
    /// Key without any validity bounds (V1 profiles).
    pub fn bare(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            created: None,
            expires: None,
            revoked: None,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(parse_key_timestamp)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires.as_deref().and_then(parse_key_timestamp)
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked.as_deref().and_then(parse_key_timestamp)
    }
}

/// Interpret a profile timestamp.
///
/// Accepts RFC 3339, offset-less date-times (read as UTC) and bare dates
/// (midnight UTC). Anything else is `None`.
pub fn parse_key_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Keys and revocation state of an issuer.
///
/// Always holds at least one issuer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuerInfo {
    issuer_keys: Vec<IssuerKey>,
    revocation_keys: Vec<IssuerKey>,
    revoked_assertions: HashSet<String>,
}

impl IssuerInfo {
    pub fn new(
        issuer_keys: Vec<IssuerKey>,
        revocation_keys: Vec<IssuerKey>,
        revoked_assertions: HashSet<String>,
    ) -> IssuerResult<Self> {
        if issuer_keys.is_empty() {
            return Err(IssuerError::NoKeys);
        }
        Ok(Self {
            issuer_keys,
            revocation_keys,
            revoked_assertions,
        })
    }

    pub fn issuer_keys(&self) -> &[IssuerKey] {
        &self.issuer_keys
    }

    /// Separate revocation keys; only pure V1 profiles carry them.
    pub fn revocation_keys(&self) -> &[IssuerKey] {
        &self.revocation_keys
    }

    /// Assertion ids listed in the issuer's revocation list.
    pub fn revoked_assertions(&self) -> &HashSet<String> {
        &self.revoked_assertions
    }
}

/// Errors that make issuer resolution impossible.
#[derive(Debug, Error)]
pub enum IssuerError {
    /// Issuer reference is not a URL.
    #[error("invalid issuer URL '{url}': {reason}")]
    InvalidIssuerUrl { url: String, reason: String },

    /// Profile document could not be fetched.
    #[error("issuer URL returned no results {url}: {source}")]
    ProfileUnavailable {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Profile document has an unexpected structure.
    #[error("malformed issuer profile: {0}")]
    MalformedProfile(String),

    /// A field the profile shape requires is absent.
    #[error("issuer profile is missing {0}")]
    MissingField(&'static str),

    /// Profile yielded no usable key.
    #[error("issuer profile contains no public keys")]
    NoKeys,
}

impl IssuerError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            IssuerError::InvalidIssuerUrl { .. } => "invalid_url",
            IssuerError::ProfileUnavailable { .. } => "unavailable",
            IssuerError::MalformedProfile(_) => "malformed",
            IssuerError::MissingField(_) => "missing_field",
            IssuerError::NoKeys => "no_keys",
        }
    }
}

/// Result type for issuer resolution.
pub type IssuerResult<T> = Result<T, IssuerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("2.0".parse::<BlockcertVersion>().unwrap(), BlockcertVersion::V2);
        assert_eq!(
            "2.0-alpha".parse::<BlockcertVersion>().unwrap(),
            BlockcertVersion::V2Alpha
        );
        assert_eq!("1.2".parse::<BlockcertVersion>().unwrap(), BlockcertVersion::V1_2);
        assert!("3.0".parse::<BlockcertVersion>().is_err());
    }

    #[test]
    fn test_v2ish() {
        assert!(BlockcertVersion::V2.is_v2ish());
        assert!(BlockcertVersion::V2Alpha.is_v2ish());
        assert!(!BlockcertVersion::V1_2.is_v2ish());
    }

    #[test]
    fn test_key_timestamp_formats() {
        let midnight = Utc.with_ymd_and_hms(2017, 6, 29, 0, 0, 0).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2017, 6, 29, 14, 48, 3).unwrap();

        assert_eq!(parse_key_timestamp("2017-06-29"), Some(midnight));
        assert_eq!(parse_key_timestamp("2017-06-29 14:48:03"), Some(afternoon));
        assert_eq!(parse_key_timestamp("2017-06-29T14:48:03"), Some(afternoon));
        assert_eq!(parse_key_timestamp("2017-06-29T16:48:03+02:00"), Some(afternoon));
        assert_eq!(
            parse_key_timestamp("2017-06-29T14:48:03.814")
                .map(|dt| dt.timestamp_millis() % 1000),
            Some(814)
        );
        assert_eq!(parse_key_timestamp("next tuesday"), None);
    }

    #[test]
    fn test_key_accessors_keep_raw_text() {
        let key = IssuerKey {
            expires: Some("someday".to_string()),
            ..IssuerKey::bare("1Key")
        };
        assert_eq!(key.expires.as_deref(), Some("someday"));
        assert_eq!(key.expires_at(), None);
        assert_eq!(key.created_at(), None);
    }

    #[test]
    fn test_issuer_info_requires_a_key() {
        let err = IssuerInfo::new(Vec::new(), vec![IssuerKey::bare("r")], HashSet::new());
        assert!(matches!(err, Err(IssuerError::NoKeys)));
    }
}
