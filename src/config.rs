//! Similarity configuration: per-attribute weights, threshold and on/off flag
//!
//! The configuration is plain data. Where it comes from is abstracted by
//! [`WeightsSource`], which is consulted afresh on every call so that
//! changes take effect immediately.
//!
//! # Example
//!
//! ```rust
//! use fuzzydup::config::SimilarityWeights;
//! use fuzzydup::record::Attribute;
//!
//! let weights = SimilarityWeights::builder()
//!     .add_weight(Attribute::FirstName, 0.5)
//!     .add_weight(Attribute::ContactNumber, 0.2)
//!     .add_weight(Attribute::SsnNumber, 1.0)
//!     .with_threshold(80.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(weights.weight_of(Attribute::SsnNumber), Some(1.0));
//! ```

use crate::error::{ConfigError, DedupError, Result};
use crate::record::Attribute;
use ahash::AHashSet;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Relative importance of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeWeight {
    pub attribute: Attribute,
    pub weight: f64,
}

impl AttributeWeight {
    pub fn new(attribute: Attribute, weight: f64) -> Self {
        Self { attribute, weight }
    }
}

/// Active similarity configuration.
///
/// Immutable once built; use [`SimilarityWeights::builder`] or
/// [`SimilarityWeights::from_json_str`]. Attribute order is the declaration
/// order and drives breakdown ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct SimilarityWeights {
    enabled: bool,
    threshold: f64,
    weights: Vec<AttributeWeight>,
}

#[derive(Deserialize)]
struct RawWeights {
    #[serde(default = "default_enabled")]
    enabled: bool,
    threshold: f64,
    weights: Vec<AttributeWeight>,
}

fn default_enabled() -> bool {
    true
}

impl TryFrom<RawWeights> for SimilarityWeights {
    type Error = ConfigError;

    fn try_from(raw: RawWeights) -> std::result::Result<Self, Self::Error> {
        let weights = Self {
            enabled: raw.enabled,
            threshold: raw.threshold,
            weights: raw.weights,
        };
        weights.validate()?;
        Ok(weights)
    }
}

impl SimilarityWeights {
    /// Create a new configuration builder
    pub fn builder() -> SimilarityWeightsBuilder {
        SimilarityWeightsBuilder::new()
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawWeights =
            serde_json::from_str(json).map_err(|e| DedupError::ConfigSource(e.to_string()))?;
        Ok(Self::try_from(raw)?)
    }

    /// Whether weighting is active at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Minimum overall percentage (0-100) to classify as duplicate
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Declared attribute weights, in declaration order
    pub fn entries(&self) -> &[AttributeWeight] {
        &self.weights
    }

    /// Configured attributes, in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.weights.iter().map(|w| w.attribute)
    }

    /// Weight of `attribute`, if configured
    pub fn weight_of(&self, attribute: Attribute) -> Option<f64> {
        self.weights
            .iter()
            .find(|w| w.attribute == attribute)
            .map(|w| w.weight)
    }

    /// Copy of this configuration with the enabled flag replaced.
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.weights.is_empty() {
            return Err(ConfigError::NoAttributes);
        }

        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }

        let mut seen = AHashSet::with_capacity(self.weights.len());
        for entry in &self.weights {
            if !seen.insert(entry.attribute) {
                return Err(ConfigError::DuplicateAttribute(entry.attribute));
            }
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    attribute: entry.attribute,
                    weight: entry.weight,
                });
            }
        }

        Ok(())
    }
}

/// Builder for [`SimilarityWeights`].
///
/// Weighting is enabled by default; the threshold defaults to 100.
pub struct SimilarityWeightsBuilder {
    enabled: bool,
    threshold: f64,
    weights: Vec<AttributeWeight>,
}

impl SimilarityWeightsBuilder {
    pub fn new() -> Self {
        Self {
            enabled: true,
            threshold: 100.0,
            weights: Vec::new(),
        }
    }

    /// Declare an attribute and its weight
    pub fn add_weight(mut self, attribute: Attribute, weight: f64) -> Self {
        self.weights.push(AttributeWeight::new(attribute, weight));
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Validate and build.
    pub fn build(self) -> std::result::Result<SimilarityWeights, ConfigError> {
        let weights = SimilarityWeights {
            enabled: self.enabled,
            threshold: self.threshold,
            weights: self.weights,
        };
        weights.validate()?;
        Ok(weights)
    }
}

impl Default for SimilarityWeightsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Supplies the latest similarity configuration.
///
/// Implementations must not cache across calls.
pub trait WeightsSource: Send + Sync {
    /// Current configuration, or [`DedupError::ConfigurationMissing`].
    fn current_weights(&self) -> Result<SimilarityWeights>;
}

impl<T: WeightsSource + ?Sized> WeightsSource for Arc<T> {
    fn current_weights(&self) -> Result<SimilarityWeights> {
        (**self).current_weights()
    }
}

/// Fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticWeights {
    weights: Option<SimilarityWeights>,
}

impl StaticWeights {
    pub fn new(weights: SimilarityWeights) -> Self {
        Self {
            weights: Some(weights),
        }
    }

    /// A source that never has a configuration.
    pub fn missing() -> Self {
        Self { weights: None }
    }
}

impl WeightsSource for StaticWeights {
    fn current_weights(&self) -> Result<SimilarityWeights> {
        self.weights.clone().ok_or(DedupError::ConfigurationMissing)
    }
}

/// Configuration that can be replaced at runtime and shared across threads.
#[derive(Debug, Clone, Default)]
pub struct SharedWeights {
    inner: Arc<RwLock<Option<SimilarityWeights>>>,
}

impl SharedWeights {
    /// Create an empty source (reports `ConfigurationMissing` until set).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: SimilarityWeights) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(weights))),
        }
    }

    /// Replace the active configuration.
    ///
    /// Acquires an exclusive write lock.
    pub fn replace(&self, weights: SimilarityWeights) {
        *self.inner.write() = Some(weights);
    }

    /// Remove the active configuration.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

impl WeightsSource for SharedWeights {
    fn current_weights(&self) -> Result<SimilarityWeights> {
        self.inner
            .read()
            .clone()
            .ok_or(DedupError::ConfigurationMissing)
    }
}

/// Configuration read from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct JsonFileWeights {
    path: PathBuf,
}

impl JsonFileWeights {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WeightsSource for JsonFileWeights {
    fn current_weights(&self) -> Result<SimilarityWeights> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DedupError::ConfigurationMissing)
            }
            Err(e) => {
                return Err(DedupError::ConfigSource(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        SimilarityWeights::from_json_str(&contents)
    }
}
