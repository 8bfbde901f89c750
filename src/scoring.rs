//! Weighted aggregation of per-attribute similarity percentages
//!
//! Computes: Σ(percentage_i × weight_i) / Σ(weight_i) over the attributes
//! actually compared. Attributes with zero weight are left out of both
//! sums. When nothing is left the overall score is undefined, never 0 or
//! 100.

use crate::record::Attribute;
use serde::{Deserialize, Serialize};

/// Similarity of one attribute for one (candidate, pool record) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeScore {
    pub attribute: Attribute,

    /// Similarity percentage (0 - 100)
    pub percentage: f64,

    /// Configured weight
    pub weight: f64,
}

impl AttributeScore {
    pub fn new(attribute: Attribute, percentage: f64, weight: f64) -> Self {
        Self {
            attribute,
            percentage: percentage.clamp(0.0, 100.0),
            weight: weight.max(0.0),
        }
    }

    /// percentage × weight
    pub fn weighted(&self) -> f64 {
        self.percentage * self.weight
    }
}

/// Per-attribute percentages plus the weighted overall percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityScore {
    /// In configuration declaration order
    pub per_attribute: Vec<AttributeScore>,

    pub overall_percentage: f64,
}

impl SimilarityScore {
    /// Aggregate `per_attribute`; `None` when no weight applies.
    pub fn from_attributes(per_attribute: Vec<AttributeScore>) -> Option<Self> {
        let overall_percentage = weighted_overall(&per_attribute)?;
        Some(Self {
            per_attribute,
            overall_percentage,
        })
    }

    /// Percentage for `attribute`, if it was compared
    pub fn percentage_of(&self, attribute: Attribute) -> Option<f64> {
        self.per_attribute
            .iter()
            .find(|s| s.attribute == attribute)
            .map(|s| s.percentage)
    }

    /// Human-readable breakdown, e.g.
    /// `"First Name Similarity: 75.00%, SSN Number Similarity: 100.00%"`.
    pub fn breakdown_text(&self) -> String {
        self.per_attribute
            .iter()
            .map(|s| format!("{} Similarity: {:.2}%", s.attribute.label(), s.percentage))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Weighted average of attribute percentages.
///
/// Returns `None` if the applied weights sum to zero.
pub fn weighted_overall(scores: &[AttributeScore]) -> Option<f64> {
    let mut total_weighted = 0.0;
    let mut total_weight = 0.0;

    for score in scores {
        if score.weight > 0.0 {
            total_weighted += score.weighted();
            total_weight += score.weight;
        }
    }

    (total_weight > 0.0).then(|| (total_weighted / total_weight).clamp(0.0, 100.0))
}
