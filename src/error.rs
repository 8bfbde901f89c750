//! Error types for duplicate detection and record registration.

use crate::record::Attribute;
use thiserror::Error;

/// Result type alias for fuzzydup operations.
pub type Result<T> = std::result::Result<T, DedupError>;

/// Errors surfaced by the detector, its configuration sources and the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DedupError {
    /// A value needed for a comparison is absent
    #[error("invalid input: missing value for {0}")]
    InvalidInput(String),

    /// No similarity configuration is available
    #[error("similarity configuration is missing")]
    ConfigurationMissing,

    /// Configuration is present but malformed
    #[error("invalid similarity configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The configuration source could not be read
    #[error("configuration source error: {0}")]
    ConfigSource(String),

    /// The record store failed
    #[error("record store error: {0}")]
    Store(String),
}

/// Validation failures for [`SimilarityWeights`](crate::config::SimilarityWeights).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No attribute weights declared
    #[error("at least one attribute weight must be configured")]
    NoAttributes,

    /// Attribute declared twice
    #[error("duplicate attribute: {0}")]
    DuplicateAttribute(Attribute),

    /// Weight is negative, NaN or infinite
    #[error("weight for '{attribute}' must be a finite non-negative number, got {weight}")]
    InvalidWeight { attribute: Attribute, weight: f64 },

    /// Threshold outside [0, 100]
    #[error("threshold must be in range [0, 100], got {0}")]
    InvalidThreshold(f64),

    /// Attribute name not in the closed attribute set
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
}
