//! Model implementations and the polymorphic model family
//!
//! Three trainable variants — regression, classification, and series
//! classification — share one narrow capability set: run, serialize to a
//! configuration document, restore from one. The boundary layer handles all
//! variants uniformly through [`Model`].

pub mod classification;
pub mod dtw;
pub mod regression;
pub mod series;

pub use classification::{ClassificationConfig, ClassificationModel, WeightScheme};
pub use dtw::{alignment_cost, distance, DistanceMetric};
pub use regression::{RegressionConfig, RegressionModel};
pub use series::{CostAggregation, SeriesClassifier, SeriesConfig};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{KestrelError, Result};

/// Model variant discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    Regression,
    Classification,
    SeriesClassification,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Regression => "regression",
            ModelKind::Classification => "classification",
            ModelKind::SeriesClassification => "series_classification",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics recorded at training time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Accuracy (classification)
    pub accuracy: Option<f64>,
    /// Mean squared error (regression)
    pub mse: Option<f64>,
    /// Root mean squared error (regression)
    pub rmse: Option<f64>,
    /// Mean absolute error (regression)
    pub mae: Option<f64>,
    /// Training time in seconds
    pub training_time_secs: f64,
    /// Number of features
    pub n_features: usize,
    /// Number of training samples
    pub n_samples: usize,
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self {
            accuracy: None,
            mse: None,
            rmse: None,
            mae: None,
            training_time_secs: 0.0,
            n_features: 0,
            n_samples: 0,
        }
    }

    /// Compute regression metrics over matching output matrices
    pub fn compute_regression(y_true: &Array2<f64>, y_pred: &Array2<f64>) -> Self {
        let mut metrics = Self::new();
        metrics.n_samples = y_true.nrows();

        let n = (y_true.nrows() * y_true.ncols()) as f64;
        if n == 0.0 {
            return metrics;
        }

        let mut squared = 0.0;
        let mut absolute = 0.0;
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            let e = t - p;
            squared += e * e;
            absolute += e.abs();
        }

        let mse = squared / n;
        metrics.mse = Some(mse);
        metrics.rmse = Some(mse.sqrt());
        metrics.mae = Some(absolute / n);
        metrics
    }
}

impl Default for ModelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Trained model variants behind one run/serialize contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Model {
    Regression(RegressionModel),
    Classification(ClassificationModel),
    SeriesClassification(SeriesClassifier),
}

impl Model {
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Regression(_) => ModelKind::Regression,
            Model::Classification(_) => ModelKind::Classification,
            Model::SeriesClassification(_) => ModelKind::SeriesClassification,
        }
    }

    /// Vector run for the regression/classification variants.
    ///
    /// The series variant has a sequence→label contract instead and reports
    /// a kind mismatch here.
    pub fn run(&self, input: &[f64]) -> Result<Vec<f64>> {
        match self {
            Model::Regression(model) => model.run(input),
            Model::Classification(model) => model.run(input),
            Model::SeriesClassification(_) => Err(KestrelError::WrongModelKind {
                expected: "regression or classification",
                actual: ModelKind::SeriesClassification.as_str(),
            }),
        }
    }

    pub fn metrics(&self) -> Option<&ModelMetrics> {
        match self {
            Model::Regression(model) => model.metrics(),
            Model::Classification(model) => model.metrics(),
            Model::SeriesClassification(_) => None,
        }
    }

    /// Serialize learned parameters and hyperparameters to a configuration
    /// document sufficient to reconstruct run-time behavior without
    /// retraining
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore this model from a configuration document.
    ///
    /// The document must hold the same model kind; restoring a regression
    /// document into a classification handle is rejected.
    pub fn restore_json(&mut self, json: &str) -> Result<()> {
        let restored: Model = serde_json::from_str(json)?;
        if restored.kind() != self.kind() {
            return Err(KestrelError::ValidationError(format!(
                "configuration document holds a {} model, handle refers to a {} model",
                restored.kind(),
                self.kind()
            )));
        }
        *self = restored;
        Ok(())
    }
}
