//! Prediction service tests

use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::time::Duration;

use serde_json::json;

use super::testing::{stub_service, CountingLoader};
use super::{Label, PredictionError, PredictionService};
use crate::logic::features::{FeatureVector, ModelKind};

fn cholera(sanitation: f64) -> FeatureVector {
    FeatureVector::new(ModelKind::Cholera, [sanitation, 100.0]).unwrap()
}

#[test]
fn test_score_returns_label_and_probability() {
    let (service, _) = stub_service(Some(0.35));
    let result = service.score(&cholera(0.8)).unwrap();

    assert_eq!(result.label, Label::Outbreak);
    assert_eq!(result.probability, Some(0.35));
    assert_eq!(result.outbreak_flag(), 1);
}

#[test]
fn test_flag_follows_probability_not_label() {
    let (service, _) = stub_service(Some(0.1));
    let result = service.score(&cholera(0.9)).unwrap();

    assert_eq!(result.label, Label::Outbreak);
    assert_eq!(result.outbreak_flag(), 0);
}

#[test]
fn test_probability_unsupported_still_returns_label() {
    let (service, _) = stub_service(None);
    let result = service.score(&cholera(0.9)).unwrap();

    assert_eq!(result.label, Label::Outbreak);
    assert_eq!(result.probability, None);
    assert_eq!(result.outbreak_flag(), 0);
}

#[test]
fn test_models_load_lazily_once() {
    let (service, loader) = stub_service(Some(0.5));
    assert!(!service.is_loaded(ModelKind::Cholera));

    for _ in 0..5 {
        service.score(&cholera(0.2)).unwrap();
    }
    assert_eq!(loader.load_count(), 1);
    assert!(service.is_loaded(ModelKind::Cholera));
    assert!(!service.is_loaded(ModelKind::Malaria));
}

#[test]
fn test_concurrent_first_access_loads_once() {
    let mut loader = CountingLoader::new(Some(0.5));
    loader.delay = Duration::from_millis(50);
    let loader = Arc::new(loader);
    let service = PredictionService::new(loader.clone());

    let callers = 16;
    let barrier = Barrier::new(callers);
    std::thread::scope(|scope| {
        for _ in 0..callers {
            scope.spawn(|| {
                barrier.wait();
                service.score(&cholera(0.7)).unwrap();
            });
        }
    });

    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_load_is_reported() {
    let mut loader = CountingLoader::new(Some(0.5));
    loader.fail = true;
    let service = PredictionService::new(Arc::new(loader));

    let err = service.score(&cholera(0.7)).unwrap_err();
    assert!(matches!(err, PredictionError::ModelLoad { .. }));
    assert!(!err.is_client_error());
    assert!(!service.is_loaded(ModelKind::Cholera));
}

#[test]
fn test_score_input_rejects_unknown_disease() {
    let (service, _) = stub_service(Some(0.5));
    let input = serde_json::from_value(json!([0.1, 0.2, 0.3, 0.4])).unwrap();
    let err = service.score_input("dengue", &input).unwrap_err();
    assert!(matches!(err, PredictionError::UnknownDisease(ref d) if d == "dengue"));
    assert!(err.is_client_error());
}

#[test]
fn test_batch_isolates_failures() {
    let (service, _) = stub_service(Some(0.4));
    let items = vec![
        json!({ "disease": "cholera", "features": { "unimproved_sanitation_rate": 0.8, "avg_rainfall": 120.0 } }),
        json!({ "disease": "unknown", "features": { "unimproved_sanitation_rate": 0.8, "avg_rainfall": 120.0 } }),
    ];

    let results = service.score_batch(&items);
    assert_eq!(results.len(), 2);

    let first = results[0].as_ref().unwrap();
    assert_eq!(first.probability, Some(0.4));
    assert!(matches!(results[1], Err(PredictionError::UnknownDisease(_))));
}

#[test]
fn test_batch_keeps_order_with_malformed_items() {
    let (service, _) = stub_service(Some(0.4));
    let items = vec![
        json!("not an object"),
        json!({ "disease": "malaria", "features": [0.1, 10.0, 0.9, 30.0] }),
        json!({ "disease": "malaria" }),
        json!({ "disease": "malaria", "features": { "mean_ndvi": 0.2 } }),
    ];

    let results = service.score_batch(&items);
    assert_eq!(results.len(), 4);
    assert!(matches!(results[0], Err(PredictionError::InvalidRequest(_))));
    assert_eq!(results[1].as_ref().unwrap().label, Label::Outbreak);
    assert!(matches!(results[2], Err(PredictionError::InvalidRequest(ref m)) if m == "Missing features"));
    assert!(matches!(results[3], Err(PredictionError::Feature(_))));
}
