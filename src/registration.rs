//! Registration workflow: detect duplicates, then decide whether to persist
//!
//! Glues together a [`WeightsSource`], a [`RecordStore`], the
//! [`DuplicateDetector`] and a [`RecordCodeGenerator`]. Configuration and the
//! pool are fetched fresh on every registration.
//!
//! Registrations through one service are serialized: the pool read, the
//! detection and the insert happen under a single lock, so two concurrent
//! registrations of the same person cannot both see a clean pool. Writers
//! that bypass the service are not covered.

use crate::algorithms::phonetic::{PhoneticEncoder, Soundex};
use crate::config::WeightsSource;
use crate::detector::{DetectionOutcome, DuplicateDetector};
use crate::error::Result;
use crate::record::{CandidateInput, PersonRecord};
use crate::record_code::RecordCodeGenerator;
use crate::store::RecordStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What to do with a candidate that has likely duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersistPolicy {
    /// Report the findings and store nothing
    #[default]
    RejectDuplicates,
    /// Store the candidate and still report the findings
    AlwaysPersist,
}

/// Result of one registration attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub outcome: DetectionOutcome,
    /// The stored record, when the candidate was persisted
    pub persisted: Option<PersonRecord>,
}

impl Registration {
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_some()
    }
}

/// Registers new person records, screening each against the stored pool.
pub struct RegistrationService<S, W, P = Soundex>
where
    S: RecordStore,
    W: WeightsSource,
    P: PhoneticEncoder,
{
    store: S,
    weights: W,
    detector: DuplicateDetector<P>,
    codes: RecordCodeGenerator,
    policy: PersistPolicy,
    /// Held from pool fetch to insert
    admission: Mutex<()>,
}

impl<S: RecordStore, W: WeightsSource> RegistrationService<S, W, Soundex> {
    /// Default detector, default record codes, duplicates rejected.
    pub fn new(store: S, weights: W) -> Self {
        Self::with_detector(store, weights, DuplicateDetector::new())
    }
}

impl<S, W, P> RegistrationService<S, W, P>
where
    S: RecordStore,
    W: WeightsSource,
    P: PhoneticEncoder,
{
    pub fn with_detector(store: S, weights: W, detector: DuplicateDetector<P>) -> Self {
        Self {
            store,
            weights,
            detector,
            codes: RecordCodeGenerator::new(),
            policy: PersistPolicy::default(),
            admission: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PersistPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_code_generator(mut self, codes: RecordCodeGenerator) -> Self {
        self.codes = codes;
        self
    }

    pub fn policy(&self) -> PersistPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Screen `candidate` against the stored pool and persist it when the
    /// policy allows.
    ///
    /// A disabled configuration never persists. Errors from the weights
    /// source or the store are returned unchanged.
    pub fn register(&self, candidate: CandidateInput) -> Result<Registration> {
        let weights = self.weights.current_weights()?;

        let _admission = self.admission.lock();
        let pool = self.store.list_all()?;

        let outcome = self.detector.find_duplicates(&candidate, &pool, &weights);

        let persist = match &outcome {
            DetectionOutcome::ThresholdInactive => {
                warn!("similarity weighting is disabled; record not registered");
                false
            }
            DetectionOutcome::Clean | DetectionOutcome::NoMatch => true,
            DetectionOutcome::Duplicates(findings) => match self.policy {
                PersistPolicy::RejectDuplicates => {
                    warn!(
                        findings = findings.len(),
                        "likely duplicates found; record not registered"
                    );
                    false
                }
                PersistPolicy::AlwaysPersist => true,
            },
        };

        if !persist {
            return Ok(Registration {
                outcome,
                persisted: None,
            });
        }

        let record = self.store.insert(candidate, self.codes.next_code())?;
        info!(
            record_id = %record.id,
            record_code = %record.record_code,
            status = ?outcome.status(),
            "record registered"
        );

        Ok(Registration {
            outcome,
            persisted: Some(record),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SharedWeights, SimilarityWeights, StaticWeights};
    use crate::detector::DetectionStatus;
    use crate::error::DedupError;
    use crate::record::{Attribute, AttributeValues};
    use crate::store::InMemoryStore;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    /// Store whose reads are slow enough for registrations to overlap.
    struct SlowReadStore {
        inner: InMemoryStore,
    }

    impl RecordStore for SlowReadStore {
        fn list_all(&self) -> Result<Vec<PersonRecord>> {
            let records = self.inner.list_all();
            thread::sleep(Duration::from_millis(50));
            records
        }

        fn insert(&self, candidate: CandidateInput, record_code: String) -> Result<PersonRecord> {
            self.inner.insert(candidate, record_code)
        }
    }

    fn weights() -> SimilarityWeights {
        SimilarityWeights::builder()
            .add_weight(Attribute::FirstName, 0.5)
            .add_weight(Attribute::ContactNumber, 0.2)
            .add_weight(Attribute::SsnNumber, 1.0)
            .with_threshold(80.0)
            .build()
            .unwrap()
    }

    fn candidate(first: &str, ssn: &str) -> CandidateInput {
        CandidateInput::new(
            AttributeValues::new()
                .with(Attribute::FirstName, first)
                .with(Attribute::ContactNumber, "5551234")
                .with(Attribute::SsnNumber, ssn),
        )
    }

    #[test]
    fn test_clean_candidate_is_persisted() {
        let store = InMemoryStore::new();
        let service = RegistrationService::new(store.clone(), StaticWeights::new(weights()))
            .with_code_generator(RecordCodeGenerator::with_settings("100", 1, 0));

        let registration = service.register(candidate("John", "111-22-3333")).unwrap();

        assert_eq!(registration.outcome, DetectionOutcome::Clean);
        let record = registration.persisted.unwrap();
        assert_eq!(record.record_code, "1001");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let store = InMemoryStore::new();
        let service = RegistrationService::new(store.clone(), StaticWeights::new(weights()));

        service.register(candidate("John", "111-22-3333")).unwrap();
        let second = service.register(candidate("Jon", "111-22-3333")).unwrap();

        assert_eq!(second.outcome.status(), DetectionStatus::Duplicates);
        assert!(!second.is_persisted());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_always_persist_keeps_findings() {
        let store = InMemoryStore::new();
        let service = RegistrationService::new(store.clone(), StaticWeights::new(weights()))
            .with_policy(PersistPolicy::AlwaysPersist);

        service.register(candidate("John", "111-22-3333")).unwrap();
        let second = service.register(candidate("Jon", "111-22-3333")).unwrap();

        assert_eq!(second.outcome.findings().len(), 1);
        assert!(second.is_persisted());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_disabled_configuration_never_persists() {
        let store = InMemoryStore::new();
        let source = SharedWeights::with_weights(weights().with_enabled(false));
        let service = RegistrationService::new(store.clone(), source.clone())
            .with_policy(PersistPolicy::AlwaysPersist);

        let registration = service.register(candidate("John", "111-22-3333")).unwrap();
        assert_eq!(registration.outcome, DetectionOutcome::ThresholdInactive);
        assert!(store.is_empty());

        source.replace(weights());
        assert!(service.register(candidate("John", "111-22-3333")).unwrap().is_persisted());
    }

    #[test]
    fn test_missing_configuration_propagates() {
        let store = InMemoryStore::new();
        let service = RegistrationService::new(store.clone(), StaticWeights::missing());

        assert_eq!(
            service.register(candidate("John", "111-22-3333")),
            Err(DedupError::ConfigurationMissing)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_registrations_of_same_person_store_one_record() {
        let inner = InMemoryStore::new();
        let service = Arc::new(RegistrationService::new(
            SlowReadStore {
                inner: inner.clone(),
            },
            StaticWeights::new(weights()),
        ));
        let start = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let service = Arc::clone(&service);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    service.register(candidate("John", "111-22-3333")).unwrap()
                })
            })
            .collect();

        let registrations: Vec<Registration> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(inner.len(), 1);
        assert_eq!(registrations.iter().filter(|r| r.is_persisted()).count(), 1);
        assert!(registrations
            .iter()
            .any(|r| r.outcome.status() == DetectionStatus::Duplicates));
    }
}
