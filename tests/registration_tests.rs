use fuzzydup::{
    Attribute, AttributeValues, CandidateInput, DedupError, DetectionStatus, InMemoryStore,
    JsonFileWeights, PersistPolicy, PersonRecord, RecordCodeGenerator, RecordStore,
    RegistrationService, Result, SharedWeights, SimilarityWeights,
};
use std::sync::Arc;
use std::thread;

const WEIGHTS_JSON: &str = r#"{
    "threshold": 80,
    "weights": [
        { "attribute": "firstName", "weight": 0.5 },
        { "attribute": "contactNumber", "weight": 0.2 },
        { "attribute": "ssnNumber", "weight": 1.0 }
    ]
}"#;

fn candidate(first: &str, contact: &str, ssn: &str) -> CandidateInput {
    CandidateInput::new(
        AttributeValues::new()
            .with(Attribute::FirstName, first)
            .with(Attribute::ContactNumber, contact)
            .with(Attribute::SsnNumber, ssn),
    )
}

/// Store whose backend is unavailable.
struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn list_all(&self) -> Result<Vec<PersonRecord>> {
        Err(DedupError::Store("connection refused".to_string()))
    }

    fn insert(&self, _candidate: CandidateInput, _record_code: String) -> Result<PersonRecord> {
        Err(DedupError::Store("connection refused".to_string()))
    }
}

#[test]
fn test_register_then_detect_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.json");
    std::fs::write(&path, WEIGHTS_JSON).unwrap();

    let store = InMemoryStore::new();
    let service = RegistrationService::new(store.clone(), JsonFileWeights::new(&path));

    let first = service.register(candidate("John", "5551234", "111-22-3333")).unwrap();
    assert_eq!(first.outcome.status(), DetectionStatus::Clean);
    let stored = first.persisted.unwrap();
    assert!(stored.record_code.starts_with("1001"));

    let second = service.register(candidate("Jon", "5551234", "111-22-3333")).unwrap();
    assert_eq!(second.outcome.status(), DetectionStatus::Duplicates);
    assert_eq!(second.outcome.findings()[0].record_id, stored.id);
    assert!(second.persisted.is_none());

    // Different person entirely: passes straight through
    let third = service.register(candidate("Mary", "5559876", "222-33-4444")).unwrap();
    assert!(third.is_persisted());
    assert!(third.persisted.unwrap().record_code.starts_with("1002"));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_configuration_change_applies_to_next_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.json");
    std::fs::write(&path, WEIGHTS_JSON).unwrap();

    let store = InMemoryStore::new();
    let service = RegistrationService::new(store.clone(), JsonFileWeights::new(&path));
    service.register(candidate("John", "5551234", "111-22-3333")).unwrap();

    // Threshold above the Jon/John score: eligible but not a duplicate
    std::fs::write(&path, WEIGHTS_JSON.replace("\"threshold\": 80", "\"threshold\": 95")).unwrap();
    let registration = service.register(candidate("Jon", "5551234", "111-22-3333")).unwrap();
    assert_eq!(registration.outcome.status(), DetectionStatus::NoMatch);
    assert!(registration.is_persisted());

    std::fs::remove_file(&path).unwrap();
    assert_eq!(
        service.register(candidate("Jon", "5551234", "111-22-3333")),
        Err(DedupError::ConfigurationMissing)
    );
}

#[test]
fn test_store_failure_propagates() {
    let weights = SimilarityWeights::from_json_str(WEIGHTS_JSON).unwrap();
    let service = RegistrationService::new(UnavailableStore, SharedWeights::with_weights(weights));

    let result = service.register(candidate("John", "5551234", "111-22-3333"));
    assert!(matches!(result, Err(DedupError::Store(_))));
}

#[test]
fn test_concurrent_registrations_get_distinct_codes() {
    let weights = SimilarityWeights::from_json_str(WEIGHTS_JSON).unwrap();
    let store = InMemoryStore::new();
    let service = Arc::new(
        RegistrationService::new(store.clone(), SharedWeights::with_weights(weights))
            .with_policy(PersistPolicy::AlwaysPersist)
            .with_code_generator(RecordCodeGenerator::with_settings("100", 1, 2)),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for j in 0..10 {
                    let ssn = format!("{}{:02}-00-0000", i, j);
                    service
                        .register(candidate("Someone", "0000000", &ssn))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let records = store.list_all().unwrap();
    assert_eq!(records.len(), 40);

    let mut sequences: Vec<u64> = records
        .iter()
        .map(|r| {
            let code = &r.record_code;
            code[3..code.len() - 2].parse().unwrap()
        })
        .collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=40).collect::<Vec<u64>>());
}
