//! Issuer information resolution.
//!
//! # Data Flow
//! ```text
//! certificate (issuer URL, version, document)
//!     → resolver.rs fetches issuer profile        (failure is fatal)
//!     → resolver.rs fetches revocation list (V2)  (failure degrades to empty)
//!     → profile shape detection
//!     → IssuerInfo (keys, revocation keys, revoked assertions)
//! ```

pub mod resolver;
pub mod types;

pub use resolver::{parse_issuer_profile, IssuerResolver, PUBKEY_PREFIX};
pub use types::{BlockcertVersion, IssuerError, IssuerInfo, IssuerKey, IssuerResult, UnknownVersion};
