//! fuzzydup - Fuzzy duplicate detection for person records
//!
//! Screens a candidate record against a pool of stored records and reports
//! the likely duplicates, ranked by weighted similarity.
//!
//! # Features
//! - Case-insensitive Levenshtein distance and percentage similarity
//! - Soundex phonetic gate, pluggable through [`PhoneticEncoder`]
//! - Per-attribute weights and a threshold, reloaded on every call
//! - Registration workflow over a pluggable [`RecordStore`]
//! - Parallel batch detection
//!
//! # Example
//!
//! ```rust
//! use fuzzydup::{find_duplicates, Attribute, AttributeValues, CandidateInput, SimilarityWeights};
//!
//! let weights = SimilarityWeights::builder()
//!     .add_weight(Attribute::FirstName, 1.0)
//!     .with_threshold(90.0)
//!     .build()
//!     .unwrap();
//!
//! let candidate = CandidateInput::new(AttributeValues::new().with(Attribute::FirstName, "Jon"));
//! let outcome = find_duplicates(&candidate, &[], &weights);
//! assert!(!outcome.has_duplicates());
//! ```

pub mod algorithms;
pub mod config;
pub mod detector;
pub mod error;
pub mod record;
pub mod record_code;
pub mod registration;
pub mod scoring;
pub mod store;

pub use algorithms::{PhoneticEncoder, Soundex};
pub use config::{
    AttributeWeight, JsonFileWeights, SharedWeights, SimilarityWeights, StaticWeights,
    WeightsSource,
};
pub use detector::{
    DetectionOutcome, DetectionReport, DetectionStatus, DuplicateDetector, DuplicateFinding,
};
pub use error::{ConfigError, DedupError, Result};
pub use record::{Attribute, AttributeSource, AttributeValues, CandidateInput, PersonRecord};
pub use record_code::RecordCodeGenerator;
pub use registration::{PersistPolicy, Registration, RegistrationService};
pub use scoring::{AttributeScore, SimilarityScore};
pub use store::{InMemoryStore, RecordStore};

/// Classify `candidate` against `pool` with the default detector.
///
/// Shorthand for `DuplicateDetector::new().find_duplicates(..)`.
pub fn find_duplicates(
    candidate: &CandidateInput,
    pool: &[PersonRecord],
    weights: &SimilarityWeights,
) -> DetectionOutcome {
    DuplicateDetector::new().find_duplicates(candidate, pool, weights)
}
