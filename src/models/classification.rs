//! Nearest-neighbor classification
//!
//! Exemplar-memorizing classifier: training stores the examples, running
//! scores a query by its k nearest stored inputs and blends their output
//! encodings into a per-class score vector. The class label lives in the
//! output vector (one-hot or class-index encoding), so the container type is
//! shared with regression.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::TrainingSet;
use crate::error::{KestrelError, Result};
use crate::models::dtw::DistanceMetric;
use crate::models::ModelMetrics;

/// Weighting scheme for neighbor votes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightScheme {
    /// All neighbors have equal weight
    Uniform,
    /// Closer neighbors have more weight (inverse distance)
    Distance,
}

impl Default for WeightScheme {
    fn default() -> Self {
        Self::Uniform
    }
}

/// Classification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Number of neighbors (1 = nearest exemplar)
    pub n_neighbors: usize,
    /// Distance metric over input vectors
    pub metric: DistanceMetric,
    /// Weighting scheme
    pub weights: WeightScheme,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 1,
            metric: DistanceMetric::default(),
            weights: WeightScheme::default(),
        }
    }
}

impl ClassificationConfig {
    pub fn with_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_weights(mut self, weights: WeightScheme) -> Self {
        self.weights = weights;
        self
    }
}

/// K-nearest-neighbor classification model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationModel {
    config: ClassificationConfig,
    x_train: Option<Array2<f64>>,
    /// Stored output encodings, one row per example
    y_train: Option<Array2<f64>>,
    n_features: usize,
    n_outputs: usize,
    metrics: Option<ModelMetrics>,
    is_fitted: bool,
}

impl Default for ClassificationModel {
    fn default() -> Self {
        Self::new(ClassificationConfig::default())
    }
}

impl ClassificationModel {
    pub fn new(config: ClassificationConfig) -> Self {
        Self {
            config,
            x_train: None,
            y_train: None,
            n_features: 0,
            n_outputs: 0,
            metrics: None,
            is_fitted: false,
        }
    }

    /// Fit the classifier (stores the training data).
    ///
    /// Fails on an empty set or inconsistent example arities; the model stays
    /// untrained in that case.
    pub fn train(&mut self, set: &TrainingSet) -> Result<()> {
        let start = Instant::now();
        let (x, y) = set.to_arrays()?;
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_outputs = y.ncols();

        self.x_train = Some(x);
        self.y_train = Some(y);
        self.n_features = n_features;
        self.n_outputs = n_outputs;
        self.is_fitted = true;

        // Training-set accuracy from self-scoring
        let mut correct = 0usize;
        {
            let x = self.x_train.as_ref().ok_or(KestrelError::ModelNotFitted)?;
            let y = self.y_train.as_ref().ok_or(KestrelError::ModelNotFitted)?;
            for i in 0..n_samples {
                let scores = self.score(x.row(i));
                if prediction_matches(&scores, y.row(i)) {
                    correct += 1;
                }
            }
        }

        let mut metrics = ModelMetrics::new();
        metrics.accuracy = Some(correct as f64 / n_samples as f64);
        metrics.training_time_secs = start.elapsed().as_secs_f64();
        metrics.n_features = n_features;
        metrics.n_samples = n_samples;
        self.metrics = Some(metrics);

        debug!(n_samples, n_features, n_outputs, "stored classification exemplars");
        Ok(())
    }

    /// Run the classifier on one input vector, returning a normalized
    /// per-class score vector of the learned output arity.
    pub fn run(&self, input: &[f64]) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(KestrelError::ModelNotFitted);
        }
        if input.len() != self.n_features {
            return Err(KestrelError::ShapeError {
                expected: format!("{} inputs", self.n_features),
                actual: format!("{} inputs", input.len()),
            });
        }
        Ok(self.score(ndarray::aview1(input)))
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Learned output arity (0 before training)
    pub fn output_arity(&self) -> usize {
        self.n_outputs
    }

    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    fn score(&self, input: ArrayView1<'_, f64>) -> Vec<f64> {
        // Callers check is_fitted first; empty training data cannot occur
        // past to_arrays().
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x), Some(y)) => (x, y),
            _ => return vec![0.0; self.n_outputs],
        };

        let neighbors = find_k_nearest(input, x_train, self.config.n_neighbors, self.config.metric);

        let mut scores = vec![0.0; self.n_outputs];
        let mut total = 0.0;
        for &(dist, index) in &neighbors {
            let weight = match self.config.weights {
                WeightScheme::Uniform => 1.0,
                WeightScheme::Distance => 1.0 / (dist + 1e-10),
            };
            for (score, value) in scores.iter_mut().zip(y_train.row(index).iter()) {
                *score += weight * value;
            }
            total += weight;
        }
        if total > 0.0 {
            for score in &mut scores {
                *score /= total;
            }
        }
        scores
    }
}

// ============================================================================
// Neighbor search helpers
// ============================================================================

/// Max-heap entry for partial sort (keeps the k smallest distances)
#[derive(PartialEq)]
struct DistEntry(f64, usize);

impl Eq for DistEntry {}
impl PartialOrd for DistEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
impl Ord for DistEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Find the k nearest training rows — O(n log k) instead of O(n log n)
fn find_k_nearest(
    point: ArrayView1<'_, f64>,
    x_train: &Array2<f64>,
    k: usize,
    metric: DistanceMetric,
) -> Vec<(f64, usize)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist = view_distance(point, row, metric);
        if heap.len() < k {
            heap.push(DistEntry(dist, i));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistEntry(dist, i));
            }
        }
    }

    heap.into_iter().map(|entry| (entry.0, entry.1)).collect()
}

fn view_distance(
    a: ArrayView1<'_, f64>,
    b: ArrayView1<'_, f64>,
    metric: DistanceMetric,
) -> f64 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b.iter())
            .map(|(ai, bi)| {
                let d = ai - bi;
                d * d
            })
            .sum::<f64>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).abs()).sum(),
    }
}

/// Argmax agreement between a score vector and a stored output encoding;
/// scalar encodings compare within half a class index.
fn prediction_matches(scores: &[f64], truth: ArrayView1<'_, f64>) -> bool {
    if scores.len() == 1 {
        return (scores[0] - truth[0]).abs() < 0.5;
    }
    argmax(scores) == argmax(truth.as_slice().unwrap_or(&[]))
}

fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hot_set() -> TrainingSet {
        // Two well-separated clusters, one-hot outputs
        let mut set = TrainingSet::new();
        for i in 0..5 {
            set.add(&[1.0 + i as f64 * 0.1, 1.0], &[1.0, 0.0]);
            set.add(&[8.0 + i as f64 * 0.1, 8.0], &[0.0, 1.0]);
        }
        set
    }

    #[test]
    fn test_nearest_exemplar_scores() {
        let mut model = ClassificationModel::default();
        model.train(&one_hot_set()).unwrap();

        let scores = model.run(&[1.2, 1.0]).unwrap();
        assert_eq!(scores, vec![1.0, 0.0]);

        let scores = model.run(&[8.3, 8.1]).unwrap();
        assert_eq!(scores, vec![0.0, 1.0]);
    }

    #[test]
    fn test_k3_blends_votes() {
        let config = ClassificationConfig::default().with_neighbors(3);
        let mut model = ClassificationModel::new(config);
        model.train(&one_hot_set()).unwrap();

        let scores = model.run(&[1.1, 1.0]).unwrap();
        assert_eq!(scores.len(), 2);
        assert!((scores[0] + scores[1] - 1.0).abs() < 1e-12);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_distance_weighted_votes() {
        let config = ClassificationConfig::default()
            .with_neighbors(3)
            .with_weights(WeightScheme::Distance);
        let mut model = ClassificationModel::new(config);
        model.train(&one_hot_set()).unwrap();

        let scores = model.run(&[1.0, 1.0]).unwrap();
        assert!(scores[0] > 0.9);
    }

    #[test]
    fn test_run_before_training_fails() {
        let model = ClassificationModel::default();
        assert!(matches!(
            model.run(&[1.0, 2.0]),
            Err(KestrelError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_run_rejects_wrong_arity() {
        let mut model = ClassificationModel::default();
        model.train(&one_hot_set()).unwrap();
        assert!(matches!(
            model.run(&[1.0]),
            Err(KestrelError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_training_accuracy_perfect_for_k1() {
        let mut model = ClassificationModel::default();
        model.train(&one_hot_set()).unwrap();
        // Every training point is its own nearest neighbor
        assert_eq!(model.metrics().unwrap().accuracy, Some(1.0));
    }
}
