//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ConnectorConfig (validated, immutable)
//!     → passed explicitly to HttpClient / LookupOptions
//! ```
//!
//! # Design Decisions
//! - Connectors never read configuration themselves; values arrive as arguments
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ConnectorConfig, HttpConfig, LookupConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
