//! Saving and loading artifact bundles.

mod common;

use std::fs;

use churn_model::bundle::{self, ArtifactBundle, BUNDLE_FORMAT_VERSION};
use churn_model::inference::predict;
use churn_model::{train, PipelineError};

use common::{fast_config, likely_churner, likely_loyal, synthetic_rows};

fn trained_bundle() -> ArtifactBundle {
    train(&synthetic_rows(60), &fast_config()).unwrap().bundle
}

#[test]
fn round_trip_reproduces_predictions_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("churn_model.json");

    let original = trained_bundle();
    original.save(&path).unwrap();
    let restored = bundle::load(&path).unwrap();

    assert_eq!(restored.header(), original.header());
    for record in [likely_churner(), likely_loyal()] {
        let before = predict(&record, &original).unwrap();
        let after = predict(&record, &restored).unwrap();
        assert_eq!(before.probability.to_bits(), after.probability.to_bits());
        assert_eq!(before, after);
    }
}

#[test]
fn save_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("v1").join("bundle.json");
    trained_bundle().save(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn free_save_assembles_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");

    let trained = trained_bundle();
    let bytes = trained.to_bytes().unwrap();
    let copy = ArtifactBundle::from_bytes(&bytes, &path).unwrap();
    let classifier_json = serde_json::to_string(copy.classifier()).unwrap();
    let classifier = serde_json::from_str(&classifier_json).unwrap();

    let saved = bundle::save(
        classifier,
        copy.registry().clone(),
        copy.normalizer().clone(),
        &path,
    )
    .unwrap();
    let loaded = bundle::load(&path).unwrap();
    assert_eq!(
        predict(&likely_churner(), &saved).unwrap(),
        predict(&likely_churner(), &loaded).unwrap()
    );
}

#[test]
fn overwrite_replaces_bundle_and_leaves_no_temporaries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");

    let first = trained_bundle();
    first.save(&path).unwrap();
    let second = trained_bundle();
    second.save(&path).unwrap();

    let loaded = bundle::load(&path).unwrap();
    assert_eq!(loaded.header().created_at, second.header().created_at);

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "only the bundle remains in the directory");
}

#[test]
fn missing_file_is_an_artifact_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = bundle::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, PipelineError::ArtifactLoad { .. }), "{}", err);
}

#[test]
fn truncated_file_is_an_artifact_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    let bytes = trained_bundle().to_bytes().unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let err = bundle::load(&path).unwrap_err();
    assert!(matches!(err, PipelineError::ArtifactLoad { .. }), "{}", err);
    assert!(err.to_string().contains("corrupt or truncated"), "{}", err);
}

fn write_edited(edit: impl FnOnce(&mut serde_json::Value)) -> PipelineError {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    let mut value: serde_json::Value = serde_json::from_slice(&trained_bundle().to_bytes().unwrap()).unwrap();
    edit(&mut value);
    fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();
    bundle::load(&path).unwrap_err()
}

#[test]
fn unsupported_format_version_is_rejected() {
    let err = write_edited(|v| v["header"]["format_version"] = (BUNDLE_FORMAT_VERSION + 1).into());
    assert!(matches!(err, PipelineError::ArtifactLoad { .. }));
    assert!(err.to_string().contains("incompatible"), "{}", err);
}

#[test]
fn feature_list_drift_is_rejected() {
    let err = write_edited(|v| {
        v["header"]["features"].as_array_mut().unwrap().pop();
    });
    assert!(matches!(err, PipelineError::ArtifactLoad { .. }), "{}", err);
}

#[test]
fn normalizer_width_drift_is_rejected() {
    let err = write_edited(|v| {
        v["normalizer"]["mean"].as_array_mut().unwrap().pop();
        v["normalizer"]["std"].as_array_mut().unwrap().pop();
    });
    assert!(matches!(err, PipelineError::ArtifactLoad { .. }), "{}", err);
}
