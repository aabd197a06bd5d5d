//! Integration test: model family contracts

use kestrel_ml::dataset::{SeriesCollection, TrainingSeries, TrainingSet};
use kestrel_ml::models::classification::ClassificationModel;
use kestrel_ml::models::dtw::{alignment_cost, DistanceMetric};
use kestrel_ml::models::regression::RegressionModel;
use kestrel_ml::models::series::SeriesClassifier;
use kestrel_ml::models::{Model, ModelKind};
use kestrel_ml::KestrelError;

fn regression_set() -> TrainingSet {
    // y = 2*x1 - x2
    let mut set = TrainingSet::new();
    for i in 0..25 {
        let x1 = i as f64 * 0.4;
        let x2 = (i % 7) as f64;
        set.add(&[x1, x2], &[2.0 * x1 - x2]);
    }
    set
}

fn one_hot_set() -> TrainingSet {
    let mut set = TrainingSet::new();
    for i in 0..6 {
        set.add(&[0.0 + i as f64 * 0.05, 0.1], &[1.0, 0.0, 0.0]);
        set.add(&[5.0 + i as f64 * 0.05, 5.1], &[0.0, 1.0, 0.0]);
        set.add(&[9.0 + i as f64 * 0.05, 9.1], &[0.0, 0.0, 1.0]);
    }
    set
}

fn labeled_series(label: &str, values: &[f64]) -> TrainingSeries {
    let mut series = TrainingSeries::new();
    series.set_label(label);
    for &v in values {
        series.add_frame(&[v]);
    }
    series
}

fn frames(values: &[f64]) -> Vec<Vec<f64>> {
    values.iter().map(|&v| vec![v]).collect()
}

#[test]
fn test_regression_round_trip_preserves_behavior() {
    let mut model = RegressionModel::default();
    model.train(&regression_set()).unwrap();

    let wrapped = Model::Regression(model);
    let json = wrapped.to_json().unwrap();

    let mut restored = Model::Regression(RegressionModel::default());
    restored.restore_json(&json).unwrap();

    for input in [[0.5, 1.0], [3.0, 2.0], [7.5, 0.0]] {
        let original = wrapped.run(&input).unwrap();
        let replayed = restored.run(&input).unwrap();
        assert!(
            (original[0] - replayed[0]).abs() < 1e-12,
            "restored model diverged on {:?}",
            input
        );
    }
}

#[test]
fn test_classification_round_trip_preserves_behavior() {
    let mut model = ClassificationModel::default();
    model.train(&one_hot_set()).unwrap();

    let wrapped = Model::Classification(model);
    let json = wrapped.to_json().unwrap();

    let mut restored = Model::Classification(ClassificationModel::default());
    restored.restore_json(&json).unwrap();

    let input = [5.1, 5.0];
    assert_eq!(wrapped.run(&input).unwrap(), restored.run(&input).unwrap());
}

#[test]
fn test_series_round_trip_preserves_behavior() {
    let mut collection = SeriesCollection::new();
    collection.add(&labeled_series("up", &[0.0, 1.0, 2.0, 3.0]));
    collection.add(&labeled_series("down", &[3.0, 2.0, 1.0, 0.0]));

    let mut model = SeriesClassifier::default();
    model.train(&collection).unwrap();

    let json = Model::SeriesClassification(model.clone()).to_json().unwrap();
    let mut restored = Model::SeriesClassification(SeriesClassifier::default());
    restored.restore_json(&json).unwrap();

    let query = frames(&[0.1, 0.9, 2.1, 2.9]);
    let original = model.run(&query).unwrap();
    let replayed = match &mut restored {
        Model::SeriesClassification(m) => m.run(&query).unwrap(),
        _ => unreachable!(),
    };
    assert_eq!(original, replayed);
    assert_eq!(original, "up");
}

#[test]
fn test_restore_kind_mismatch_rejected() {
    let mut regression = RegressionModel::default();
    regression.train(&regression_set()).unwrap();
    let json = Model::Regression(regression).to_json().unwrap();

    let mut series = Model::SeriesClassification(SeriesClassifier::default());
    assert!(matches!(
        series.restore_json(&json),
        Err(KestrelError::ValidationError(_))
    ));
    assert_eq!(series.kind(), ModelKind::SeriesClassification);
}

#[test]
fn test_alignment_cost_symmetry() {
    let a = frames(&[0.2, 1.4, 0.6, 2.8, 1.0]);
    let b = frames(&[0.0, 1.0, 3.0]);

    for metric in [DistanceMetric::Euclidean, DistanceMetric::Manhattan] {
        let ab = alignment_cost(&a, &b, metric);
        let ba = alignment_cost(&b, &a, metric);
        assert!((ab - ba).abs() < 1e-12, "asymmetric for {:?}", metric);
    }
}

#[test]
fn test_sequence_classifier_small_case() {
    // Two single-feature templates, one per class
    let mut collection = SeriesCollection::new();
    collection.add(&labeled_series("A", &[0.0, 0.0, 0.0]));
    collection.add(&labeled_series("B", &[5.0, 5.0, 5.0]));

    let mut model = SeriesClassifier::default();
    model.train(&collection).unwrap();

    let label = model.run(&frames(&[0.0, 0.0, 1.0])).unwrap();
    assert_eq!(label, "A");

    let costs = model.costs();
    assert_eq!(costs.len(), 2, "exactly one entry per distinct class");
    assert!(costs[0] < costs[1]);
}

#[test]
fn test_sequence_classifier_unequal_lengths() {
    let mut collection = SeriesCollection::new();
    collection.add(&labeled_series("short", &[1.0, 1.0]));
    collection.add(&labeled_series("tall", &[9.0, 9.0, 9.0, 9.0, 9.0, 9.0]));

    let mut model = SeriesClassifier::default();
    model.train(&collection).unwrap();

    // A stretched-out version of the short template still matches it
    let label = model.run(&frames(&[1.0, 1.0, 1.0, 1.0, 1.0])).unwrap();
    assert_eq!(label, "short");
}

#[test]
fn test_untrained_models_fail_to_run() {
    let regression = Model::Regression(RegressionModel::default());
    assert!(matches!(
        regression.run(&[1.0]),
        Err(KestrelError::ModelNotFitted)
    ));

    let classification = Model::Classification(ClassificationModel::default());
    assert!(matches!(
        classification.run(&[1.0]),
        Err(KestrelError::ModelNotFitted)
    ));

    let mut series = SeriesClassifier::default();
    assert!(matches!(
        series.run(&frames(&[1.0])),
        Err(KestrelError::ModelNotFitted)
    ));
}

#[test]
fn test_training_failure_leaves_model_untrained() {
    let mut ragged = TrainingSet::new();
    ragged.add(&[1.0, 2.0], &[1.0]);
    ragged.add(&[1.0], &[1.0]);

    let mut model = RegressionModel::default();
    assert!(model.train(&ragged).is_err());
    assert!(!model.is_fitted());
    assert!(matches!(
        model.run(&[1.0, 2.0]),
        Err(KestrelError::ModelNotFitted)
    ));
}
