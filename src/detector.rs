//! Duplicate detection of a candidate record against a pool of records
//!
//! Every pool record goes through two cheap gates before it is scored:
//!
//! - fuzzy gate: ALL compared attributes within the edit-distance bound
//! - phonetic gate: ANY compared attribute sharing a phonetic code
//!
//! Records passing both are scored with weighted percentage similarity and
//! classified against the configured threshold. The whole pool is scanned;
//! there is no blocking or indexing.

use crate::algorithms::levenshtein::{edit_distance_bounded, similarity_percentage};
use crate::algorithms::phonetic::{PhoneticEncoder, Soundex};
use crate::config::SimilarityWeights;
use crate::record::{Attribute, AttributeSource, AttributeValues, CandidateInput, PersonRecord};
use crate::scoring::{AttributeScore, SimilarityScore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Maximum per-attribute edit distance accepted by the fuzzy gate.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;

/// Below this many candidates batch detection runs sequentially.
const PARALLEL_THRESHOLD: usize = 16;

/// An attribute present on both sides of a comparison.
type ComparedValues<'a> = SmallVec<[(Attribute, &'a str, &'a str); 4]>;

/// Outcome status of one detection call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionStatus {
    /// Weighting is disabled; nothing was classified
    ThresholdInactive,
    /// No pool record passed the gates
    Clean,
    /// Some records passed the gates but none reached the threshold
    NoMatch,
    /// At least one record reached the threshold
    Duplicates,
}

/// A pool record classified as a likely duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateFinding {
    pub record_id: Uuid,
    pub record_code: String,
    pub attributes: AttributeValues,
    #[serde(flatten)]
    pub score: SimilarityScore,
    pub breakdown_text: String,
}

impl DuplicateFinding {
    fn new(record: &PersonRecord, score: SimilarityScore) -> Self {
        let breakdown_text = score.breakdown_text();
        Self {
            record_id: record.id,
            record_code: record.record_code.clone(),
            attributes: record.attributes.clone(),
            score,
            breakdown_text,
        }
    }

    pub fn overall_percentage(&self) -> f64 {
        self.score.overall_percentage
    }
}

/// Result of [`DuplicateDetector::find_duplicates`].
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    ThresholdInactive,
    Clean,
    NoMatch,
    /// Ranked by overall percentage, highest first
    Duplicates(Vec<DuplicateFinding>),
}

impl DetectionOutcome {
    pub fn status(&self) -> DetectionStatus {
        match self {
            DetectionOutcome::ThresholdInactive => DetectionStatus::ThresholdInactive,
            DetectionOutcome::Clean => DetectionStatus::Clean,
            DetectionOutcome::NoMatch => DetectionStatus::NoMatch,
            DetectionOutcome::Duplicates(_) => DetectionStatus::Duplicates,
        }
    }

    /// Findings; empty unless the status is `Duplicates`
    pub fn findings(&self) -> &[DuplicateFinding] {
        match self {
            DetectionOutcome::Duplicates(findings) => findings,
            _ => &[],
        }
    }

    pub fn has_duplicates(&self) -> bool {
        matches!(self, DetectionOutcome::Duplicates(_))
    }

    /// Serializable `{ status, findings }` view.
    pub fn report(&self) -> DetectionReport {
        DetectionReport {
            status: self.status(),
            findings: self.findings().to_vec(),
        }
    }
}

/// Transport-agnostic shape of a detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub status: DetectionStatus,
    pub findings: Vec<DuplicateFinding>,
}

/// Classifies a candidate record against a pool of existing records.
///
/// Stateless apart from its settings; a single detector can be shared by
/// any number of threads.
///
/// # Example
///
/// ```rust
/// use fuzzydup::config::SimilarityWeights;
/// use fuzzydup::detector::{DetectionStatus, DuplicateDetector};
/// use fuzzydup::record::{Attribute, AttributeValues, CandidateInput, PersonRecord};
/// use uuid::Uuid;
///
/// let weights = SimilarityWeights::builder()
///     .add_weight(Attribute::FirstName, 0.5)
///     .add_weight(Attribute::SsnNumber, 1.0)
///     .with_threshold(80.0)
///     .build()
///     .unwrap();
///
/// let existing = PersonRecord::new(
///     Uuid::new_v4(),
///     "1001AB",
///     AttributeValues::new()
///         .with(Attribute::FirstName, "John")
///         .with(Attribute::SsnNumber, "111-22-3333"),
///     None,
/// );
/// let candidate = CandidateInput::new(
///     AttributeValues::new()
///         .with(Attribute::FirstName, "Jon")
///         .with(Attribute::SsnNumber, "111-22-3333"),
/// );
///
/// let outcome = DuplicateDetector::new().find_duplicates(&candidate, &[existing], &weights);
/// assert_eq!(outcome.status(), DetectionStatus::Duplicates);
/// ```
#[derive(Debug, Clone)]
pub struct DuplicateDetector<P: PhoneticEncoder = Soundex> {
    encoder: P,
    max_edit_distance: usize,
}

impl DuplicateDetector<Soundex> {
    /// Soundex gate with the default edit-distance bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_encoder(Soundex)
    }
}

impl Default for DuplicateDetector<Soundex> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PhoneticEncoder> DuplicateDetector<P> {
    #[must_use]
    pub fn with_encoder(encoder: P) -> Self {
        Self {
            encoder,
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
        }
    }

    /// Builder: override the fuzzy-gate bound
    #[must_use]
    pub fn with_max_edit_distance(mut self, max_edit_distance: usize) -> Self {
        self.max_edit_distance = max_edit_distance;
        self
    }

    pub fn max_edit_distance(&self) -> usize {
        self.max_edit_distance
    }

    pub fn encoder(&self) -> &P {
        &self.encoder
    }

    /// Fuzzy gate: every attribute present on both sides is within
    /// `max_edit_distance`. False when no attribute can be compared.
    pub fn is_fuzzy_match<C, R>(&self, candidate: &C, record: &R, attributes: &[Attribute]) -> bool
    where
        C: AttributeSource + ?Sized,
        R: AttributeSource + ?Sized,
    {
        let compared = compared_values(candidate, record, attributes.iter().copied());
        self.fuzzy_gate(&compared)
    }

    /// Phonetic gate: at least one attribute present on both sides has the
    /// same phonetic code. False when no attribute can be compared.
    pub fn phonetic_match<C, R>(&self, candidate: &C, record: &R, attributes: &[Attribute]) -> bool
    where
        C: AttributeSource + ?Sized,
        R: AttributeSource + ?Sized,
    {
        let compared = compared_values(candidate, record, attributes.iter().copied());
        self.phonetic_gate(&compared)
    }

    /// Weighted similarity over the configured attributes present on both
    /// sides. `None` when no weight applies. Gates are not consulted.
    pub fn score<C, R>(&self, candidate: &C, record: &R, weights: &SimilarityWeights) -> Option<SimilarityScore>
    where
        C: AttributeSource + ?Sized,
        R: AttributeSource + ?Sized,
    {
        let compared = compared_values(candidate, record, weights.attributes());
        score_compared(&compared, weights)
    }

    /// Classify `candidate` against every record in `pool`.
    pub fn find_duplicates(
        &self,
        candidate: &CandidateInput,
        pool: &[PersonRecord],
        weights: &SimilarityWeights,
    ) -> DetectionOutcome {
        if !weights.is_enabled() {
            warn!("similarity weighting is disabled; skipping duplicate detection");
            return DetectionOutcome::ThresholdInactive;
        }

        let mut eligible = 0usize;
        let mut findings = Vec::new();

        for record in pool {
            let compared = compared_values(candidate, record, weights.attributes());

            if compared.is_empty() {
                debug!(record_id = %record.id, "no comparable attributes");
                continue;
            }
            if !self.fuzzy_gate(&compared) {
                debug!(record_id = %record.id, "rejected by fuzzy gate");
                continue;
            }
            if !self.phonetic_gate(&compared) {
                debug!(
                    record_id = %record.id,
                    encoder = self.encoder.name(),
                    "rejected by phonetic gate"
                );
                continue;
            }

            eligible += 1;

            let Some(score) = score_compared(&compared, weights) else {
                debug!(record_id = %record.id, "no applicable weight; overall score undefined");
                continue;
            };

            debug!(
                record_id = %record.id,
                overall = score.overall_percentage,
                threshold = weights.threshold(),
                "scored"
            );

            if score.overall_percentage >= weights.threshold() {
                findings.push(DuplicateFinding::new(record, score));
            }
        }

        findings.sort_by(|a, b| b.overall_percentage().total_cmp(&a.overall_percentage()));

        let outcome = if !findings.is_empty() {
            DetectionOutcome::Duplicates(findings)
        } else if eligible > 0 {
            DetectionOutcome::NoMatch
        } else {
            DetectionOutcome::Clean
        };

        info!(
            status = ?outcome.status(),
            pool_size = pool.len(),
            eligible,
            findings = outcome.findings().len(),
            "duplicate detection finished"
        );

        outcome
    }

    /// Run [`find_duplicates`](Self::find_duplicates) for many candidates
    /// against the same pool, in parallel for larger batches.
    ///
    /// Results are in candidate order.
    pub fn find_duplicates_batch(
        &self,
        candidates: &[CandidateInput],
        pool: &[PersonRecord],
        weights: &SimilarityWeights,
    ) -> Vec<DetectionOutcome> {
        if candidates.len() < PARALLEL_THRESHOLD {
            candidates
                .iter()
                .map(|c| self.find_duplicates(c, pool, weights))
                .collect()
        } else {
            candidates
                .par_iter()
                .map(|c| self.find_duplicates(c, pool, weights))
                .collect()
        }
    }

    fn fuzzy_gate(&self, compared: &ComparedValues<'_>) -> bool {
        !compared.is_empty()
            && compared
                .iter()
                .all(|(_, a, b)| edit_distance_bounded(a, b, self.max_edit_distance).is_some())
    }

    fn phonetic_gate(&self, compared: &ComparedValues<'_>) -> bool {
        compared.iter().any(|(_, a, b)| self.encoder.same_code(a, b))
    }
}

/// Attributes from `attributes` that have a value on both sides.
fn compared_values<'a, C, R>(
    candidate: &'a C,
    record: &'a R,
    attributes: impl Iterator<Item = Attribute>,
) -> ComparedValues<'a>
where
    C: AttributeSource + ?Sized,
    R: AttributeSource + ?Sized,
{
    attributes
        .filter_map(|attribute| {
            let a = candidate.attribute(attribute)?;
            let b = record.attribute(attribute)?;
            Some((attribute, a, b))
        })
        .collect()
}

fn score_compared(compared: &ComparedValues<'_>, weights: &SimilarityWeights) -> Option<SimilarityScore> {
    let per_attribute = compared
        .iter()
        .filter_map(|&(attribute, a, b)| {
            let weight = weights.weight_of(attribute)?;
            Some(AttributeScore::new(attribute, similarity_percentage(a, b), weight))
        })
        .collect();
    SimilarityScore::from_attributes(per_attribute)
}
